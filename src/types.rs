//! Core types and data structures for the back office

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reconciliation::{
    compute_cash, compute_totals, DenominationCounts, PaymentFigures, ReconciliationOutcome,
    ReconciliationTotals, SalesFigures,
};

/// Payment status of a dealer bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillStatus {
    /// Some amount is still owed to the dealer
    Pending,
    /// The bill has been paid in full
    Completed,
}

impl BillStatus {
    /// Display label, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "Pending",
            BillStatus::Completed => "Completed",
        }
    }
}

/// Stable reference to a document held by a [`crate::traits::DocumentStore`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRef(String);

impl DocumentRef {
    /// Wrap a storage path
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The storage path
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A dealer invoice tracking amount owed, amount paid and the remaining balance.
///
/// `amount` and `paid` can only change together through [`Bill::set_terms`],
/// so `0 <= paid <= amount` always holds. `pending` and `status` are derived
/// on read and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BillRecord", into = "BillRecord")]
pub struct Bill {
    /// Generated identifier
    pub id: Uuid,
    /// Dealer the bill was issued by
    pub dealer: String,
    /// Branch that received the goods
    pub branch: String,
    /// Dealer's invoice number, unique across all bills
    pub bill_number: String,
    amount: BigDecimal,
    paid: BigDecimal,
    /// Scanned bill or PDF, if one was attached
    pub bill_image: Option<DocumentRef>,
    /// When the bill was entered
    pub created_at: NaiveDateTime,
    /// When the bill was last changed
    pub updated_at: NaiveDateTime,
}

impl Bill {
    /// Create a new, fully unpaid bill
    pub fn new(
        dealer: String,
        branch: String,
        bill_number: String,
        amount: BigDecimal,
    ) -> BackOfficeResult<Self> {
        if amount < BigDecimal::from(0) {
            return Err(BackOfficeError::InvalidAmount(format!(
                "Amount must not be negative, got {}",
                amount
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        Ok(Self {
            id: Uuid::new_v4(),
            dealer,
            branch,
            bill_number,
            amount,
            paid: BigDecimal::from(0),
            bill_image: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Total billed amount
    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    /// Amount paid so far
    pub fn paid(&self) -> &BigDecimal {
        &self.paid
    }

    /// Remaining balance, always `amount - paid`
    pub fn pending(&self) -> BigDecimal {
        &self.amount - &self.paid
    }

    /// `Completed` exactly when nothing is pending
    pub fn status(&self) -> BillStatus {
        if self.pending() == BigDecimal::from(0) {
            BillStatus::Completed
        } else {
            BillStatus::Pending
        }
    }

    /// Replace amount and paid together.
    ///
    /// Leaves the bill untouched on error.
    pub fn set_terms(&mut self, amount: BigDecimal, paid: BigDecimal) -> BackOfficeResult<()> {
        check_terms(&amount, &paid)?;

        self.amount = amount;
        self.paid = paid;
        self.touch();
        Ok(())
    }

    /// Record a new paid total against the current amount
    pub fn record_payment(&mut self, paid: BigDecimal) -> BackOfficeResult<()> {
        self.set_terms(self.amount.clone(), paid)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// `amount >= 0` and `0 <= paid <= amount`
fn check_terms(amount: &BigDecimal, paid: &BigDecimal) -> BackOfficeResult<()> {
    let zero = BigDecimal::from(0);
    if *amount < zero {
        return Err(BackOfficeError::InvalidAmount(format!(
            "Amount must not be negative, got {}",
            amount
        )));
    }
    if *paid < zero || paid > amount {
        return Err(BackOfficeError::OutOfRange {
            paid: paid.clone(),
            amount: amount.clone(),
        });
    }
    Ok(())
}

/// Wire shape of a bill; carries the derived fields for readers
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BillRecord {
    id: Uuid,
    dealer: String,
    branch: String,
    bill_number: String,
    amount: BigDecimal,
    paid: BigDecimal,
    #[serde(default)]
    pending: Option<BigDecimal>,
    #[serde(default)]
    status: Option<BillStatus>,
    bill_image: Option<DocumentRef>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<BillRecord> for Bill {
    type Error = BackOfficeError;

    fn try_from(record: BillRecord) -> Result<Self, Self::Error> {
        check_terms(&record.amount, &record.paid)?;

        // pending and status are recomputed from amount and paid
        Ok(Self {
            id: record.id,
            dealer: record.dealer,
            branch: record.branch,
            bill_number: record.bill_number,
            amount: record.amount,
            paid: record.paid,
            bill_image: record.bill_image,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl From<Bill> for BillRecord {
    fn from(bill: Bill) -> Self {
        let pending = bill.pending();
        let status = bill.status();
        Self {
            id: bill.id,
            dealer: bill.dealer,
            branch: bill.branch,
            bill_number: bill.bill_number,
            amount: bill.amount,
            paid: bill.paid,
            pending: Some(pending),
            status: Some(status),
            bill_image: bill.bill_image,
            created_at: bill.created_at,
            updated_at: bill.updated_at,
        }
    }
}

/// A bill with its dealer and branch references expanded to display names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillListing {
    pub bill: Bill,
    pub dealer_name: Option<String>,
    pub branch_name: Option<String>,
}

/// Per-branch, per-day cash reconciliation snapshot.
///
/// Cash and the totals are derived from the reported figures and the note
/// counts when the entry is built, and again when it is deserialized, so a
/// stored snapshot cannot disagree with its own inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClosingEntryRecord", into = "ClosingEntryRecord")]
pub struct ClosingEntry {
    /// Generated identifier
    pub id: Uuid,
    /// Branch being closed
    pub branch: String,
    /// Business day being closed
    pub date: NaiveDate,
    system_sales: BigDecimal,
    manual_sales: BigDecimal,
    online_sales: BigDecimal,
    expenses: BigDecimal,
    credit_card_payment: BigDecimal,
    upi_payment: BigDecimal,
    cash_payment: BigDecimal,
    denominations: DenominationCounts,
    total_sales: BigDecimal,
    total_payments: BigDecimal,
    discrepancy: BigDecimal,
    /// When the entry was submitted
    pub created_at: NaiveDateTime,
}

impl ClosingEntry {
    /// Reconcile reported figures against the counted notes.
    ///
    /// Any cash in `payments` is ignored; cash comes from `denominations`.
    pub fn new(
        branch: String,
        date: NaiveDate,
        sales: &SalesFigures,
        payments: &PaymentFigures,
        denominations: DenominationCounts,
    ) -> Self {
        Self::reconcile(
            Uuid::new_v4(),
            branch,
            date,
            sales,
            payments,
            denominations,
            chrono::Utc::now().naive_utc(),
        )
    }

    fn reconcile(
        id: Uuid,
        branch: String,
        date: NaiveDate,
        sales: &SalesFigures,
        payments: &PaymentFigures,
        denominations: DenominationCounts,
        created_at: NaiveDateTime,
    ) -> Self {
        let cash_payment = compute_cash(&denominations);
        let payments = PaymentFigures {
            cash: Some(cash_payment.clone()),
            ..payments.clone()
        };
        let totals = compute_totals(sales, &payments);

        let figure = |value: &Option<BigDecimal>| value.clone().unwrap_or_default();
        Self {
            id,
            branch,
            date,
            system_sales: figure(&sales.system),
            manual_sales: figure(&sales.manual),
            online_sales: figure(&sales.online),
            expenses: figure(&payments.expenses),
            credit_card_payment: figure(&payments.credit_card),
            upi_payment: figure(&payments.upi),
            cash_payment,
            denominations,
            total_sales: totals.total_sales,
            total_payments: totals.total_payments,
            discrepancy: totals.discrepancy,
            created_at,
        }
    }

    pub fn system_sales(&self) -> &BigDecimal {
        &self.system_sales
    }

    pub fn manual_sales(&self) -> &BigDecimal {
        &self.manual_sales
    }

    pub fn online_sales(&self) -> &BigDecimal {
        &self.online_sales
    }

    /// Paid out of the drawer during the day
    pub fn expenses(&self) -> &BigDecimal {
        &self.expenses
    }

    pub fn credit_card_payment(&self) -> &BigDecimal {
        &self.credit_card_payment
    }

    pub fn upi_payment(&self) -> &BigDecimal {
        &self.upi_payment
    }

    /// Cash counted in the drawer, derived from the note counts
    pub fn cash_payment(&self) -> &BigDecimal {
        &self.cash_payment
    }

    /// Notes counted at closing
    pub fn denominations(&self) -> &DenominationCounts {
        &self.denominations
    }

    pub fn total_sales(&self) -> &BigDecimal {
        &self.total_sales
    }

    pub fn total_payments(&self) -> &BigDecimal {
        &self.total_payments
    }

    /// `total_payments - total_sales`; zero means reconciled
    pub fn discrepancy(&self) -> &BigDecimal {
        &self.discrepancy
    }

    /// The derived totals of this entry
    pub fn totals(&self) -> ReconciliationTotals {
        ReconciliationTotals {
            total_sales: self.total_sales.clone(),
            total_payments: self.total_payments.clone(),
            discrepancy: self.discrepancy.clone(),
        }
    }

    /// Whether reported payments match reported sales
    pub fn is_balanced(&self) -> bool {
        self.discrepancy == BigDecimal::from(0)
    }

    /// Direction of the discrepancy
    pub fn outcome(&self) -> ReconciliationOutcome {
        ReconciliationOutcome::of(&self.discrepancy)
    }
}

/// Wire shape of a closing entry; derived fields are written but never trusted on read
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClosingEntryRecord {
    id: Uuid,
    branch: String,
    date: NaiveDate,
    system_sales: BigDecimal,
    manual_sales: BigDecimal,
    online_sales: BigDecimal,
    expenses: BigDecimal,
    credit_card_payment: BigDecimal,
    upi_payment: BigDecimal,
    #[serde(default)]
    cash_payment: Option<BigDecimal>,
    denominations: DenominationCounts,
    #[serde(default)]
    total_sales: Option<BigDecimal>,
    #[serde(default)]
    total_payments: Option<BigDecimal>,
    #[serde(default)]
    discrepancy: Option<BigDecimal>,
    created_at: NaiveDateTime,
}

impl TryFrom<ClosingEntryRecord> for ClosingEntry {
    type Error = BackOfficeError;

    fn try_from(record: ClosingEntryRecord) -> Result<Self, Self::Error> {
        let zero = BigDecimal::from(0);
        for (name, value) in [
            ("systemSales", &record.system_sales),
            ("manualSales", &record.manual_sales),
            ("onlineSales", &record.online_sales),
            ("expenses", &record.expenses),
            ("creditCardPayment", &record.credit_card_payment),
            ("upiPayment", &record.upi_payment),
        ] {
            if *value < zero {
                return Err(BackOfficeError::InvalidAmount(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        let sales = SalesFigures {
            system: Some(record.system_sales),
            manual: Some(record.manual_sales),
            online: Some(record.online_sales),
        };
        let payments = PaymentFigures {
            credit_card: Some(record.credit_card_payment),
            upi: Some(record.upi_payment),
            cash: None,
            expenses: Some(record.expenses),
        };
        Ok(Self::reconcile(
            record.id,
            record.branch,
            record.date,
            &sales,
            &payments,
            record.denominations,
            record.created_at,
        ))
    }
}

impl From<ClosingEntry> for ClosingEntryRecord {
    fn from(entry: ClosingEntry) -> Self {
        Self {
            id: entry.id,
            branch: entry.branch,
            date: entry.date,
            system_sales: entry.system_sales,
            manual_sales: entry.manual_sales,
            online_sales: entry.online_sales,
            expenses: entry.expenses,
            credit_card_payment: entry.credit_card_payment,
            upi_payment: entry.upi_payment,
            cash_payment: Some(entry.cash_payment),
            denominations: entry.denominations,
            total_sales: Some(entry.total_sales),
            total_payments: Some(entry.total_payments),
            discrepancy: Some(entry.discrepancy),
            created_at: entry.created_at,
        }
    }
}

/// Errors that can occur in the back office
#[derive(Debug, thiserror::Error)]
pub enum BackOfficeError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid bill number: {0}")]
    InvalidBillNumber(String),
    #[error("Invalid count {count} for denomination {denomination}")]
    InvalidCount { denomination: u32, count: i64 },
    #[error("Unknown denomination: {0}")]
    InvalidDenomination(u32),
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Paid amount {paid} must be between 0 and the bill amount {amount}")]
    OutOfRange { paid: BigDecimal, amount: BigDecimal },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Document type not allowed: {0}")]
    InvalidDocumentType(String),
    #[error("Document too large: {size} bytes exceeds maximum {max} bytes")]
    DocumentTooLarge { size: u64, max: u64 },
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl BackOfficeError {
    /// True for errors caused by the caller's input rather than by storage
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            BackOfficeError::StorageUnavailable(_) | BackOfficeError::NotFound(_)
        )
    }
}

/// Result type for back-office operations
pub type BackOfficeResult<T> = Result<T, BackOfficeError>;
