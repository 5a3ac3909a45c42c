//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::billing::NewBill;
use crate::documents::DocumentUpload;
use crate::types::*;

/// Record storage for bills
///
/// Every write replaces a whole record atomically, so concurrent readers
/// never observe a bill whose amount and paid come from different updates.
#[async_trait]
pub trait BillStorage: Send + Sync {
    /// Insert a new bill; fails with `DuplicateKey` if its bill number is taken
    async fn insert_bill(&self, bill: &Bill) -> BackOfficeResult<()>;

    /// Get a bill by ID
    async fn get_bill(&self, bill_id: Uuid) -> BackOfficeResult<Option<Bill>>;

    /// Get a bill by its bill number
    async fn find_bill_by_number(&self, bill_number: &str) -> BackOfficeResult<Option<Bill>>;

    /// Replace a stored bill; fails with `NotFound` if it does not exist and
    /// with `DuplicateKey` if its bill number belongs to another bill
    async fn replace_bill(&self, bill: &Bill) -> BackOfficeResult<()>;

    /// All bills, in no particular order
    async fn list_bills(&self) -> BackOfficeResult<Vec<Bill>>;
}

/// Record storage for closing entries
#[async_trait]
pub trait ClosingEntryStorage: Send + Sync {
    /// Insert a new closing entry.
    ///
    /// With `unique_per_branch_day`, fails with `DuplicateKey` if the branch
    /// already has an entry for that date.
    async fn insert_closing_entry(
        &self,
        entry: &ClosingEntry,
        unique_per_branch_day: bool,
    ) -> BackOfficeResult<()>;

    /// Get a closing entry by ID
    async fn get_closing_entry(&self, entry_id: Uuid) -> BackOfficeResult<Option<ClosingEntry>>;

    /// Closing entries, optionally for one branch and an inclusive date range
    async fn list_closing_entries(
        &self,
        branch: Option<&str>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> BackOfficeResult<Vec<ClosingEntry>>;
}

/// Display names for dealer and branch references
#[async_trait]
pub trait Directory: Send + Sync {
    async fn dealer_name(&self, dealer_id: &str) -> BackOfficeResult<Option<String>>;

    async fn branch_name(&self, branch_id: &str) -> BackOfficeResult<Option<String>>;
}

/// Binary storage for bill documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store an upload under the given reference
    async fn put(&self, reference: &DocumentRef, upload: &DocumentUpload) -> BackOfficeResult<()>;

    /// Delete a document; deleting an absent reference succeeds
    async fn delete(&self, reference: &DocumentRef) -> BackOfficeResult<()>;

    /// Whether a document is stored under the reference
    async fn exists(&self, reference: &DocumentRef) -> BackOfficeResult<bool>;
}

/// Trait for implementing custom bill validation rules
pub trait BillValidator: Send + Sync {
    /// Validate bill input before anything is written
    fn validate_new_bill(&self, bill: &NewBill) -> BackOfficeResult<()>;

    /// Validate a bill after an update has been applied to it
    fn validate_bill(&self, bill: &Bill) -> BackOfficeResult<()>;
}

/// Default bill validator: required fields and a non-negative amount
pub struct DefaultBillValidator;

impl BillValidator for DefaultBillValidator {
    fn validate_new_bill(&self, bill: &NewBill) -> BackOfficeResult<()> {
        require_references(&bill.dealer, &bill.branch, &bill.bill_number)?;
        crate::utils::validate_non_negative_amount(&bill.amount)
    }

    fn validate_bill(&self, bill: &Bill) -> BackOfficeResult<()> {
        require_references(&bill.dealer, &bill.branch, &bill.bill_number)
    }
}

/// Fails with every blank one of dealer, branch and bill number, in that order
fn require_references(dealer: &str, branch: &str, bill_number: &str) -> BackOfficeResult<()> {
    let missing: Vec<&'static str> = [
        ("dealer", dealer),
        ("branch", branch),
        ("billNumber", bill_number),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(BackOfficeError::MissingFields(missing))
    }
}
