//! Bill creation and updates

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::documents::{self, DocumentChange, DocumentPolicy, DocumentUpload};
use crate::traits::*;
use crate::types::*;

use super::filter::BillFilter;

/// Input for entering a new bill
#[derive(Debug, Clone, PartialEq)]
pub struct NewBill {
    pub dealer: String,
    pub branch: String,
    pub bill_number: String,
    pub amount: BigDecimal,
    pub document: Option<DocumentUpload>,
}

impl NewBill {
    pub fn new(
        dealer: impl Into<String>,
        branch: impl Into<String>,
        bill_number: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            dealer: dealer.into(),
            branch: branch.into(),
            bill_number: bill_number.into(),
            amount,
            document: None,
        }
    }

    /// Attach a scanned bill
    pub fn with_document(mut self, upload: DocumentUpload) -> Self {
        self.document = Some(upload);
        self
    }
}

/// Partial update of a bill.
///
/// `None` leaves a field as it is; `Some` applies the value even when it is
/// zero, so paying a bill down to nothing or zeroing its amount works.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillPatch {
    pub bill_number: Option<String>,
    pub amount: Option<BigDecimal>,
    pub dealer: Option<String>,
    pub branch: Option<String>,
    pub paid: Option<BigDecimal>,
    pub document: DocumentChange,
}

impl BillPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paid(mut self, paid: BigDecimal) -> Self {
        self.paid = Some(paid);
        self
    }

    pub fn amount(mut self, amount: BigDecimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn bill_number(mut self, bill_number: impl Into<String>) -> Self {
        self.bill_number = Some(bill_number.into());
        self
    }

    pub fn dealer(mut self, dealer: impl Into<String>) -> Self {
        self.dealer = Some(dealer.into());
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn replace_document(mut self, upload: DocumentUpload) -> Self {
        self.document = DocumentChange::Replace(upload);
        self
    }

    pub fn remove_document(mut self) -> Self {
        self.document = DocumentChange::Remove;
        self
    }

    /// Apply the field changes to a copy of `bill`; documents are not touched
    pub fn apply_to(&self, bill: &Bill) -> BackOfficeResult<Bill> {
        let mut updated = bill.clone();

        if let Some(ref bill_number) = self.bill_number {
            updated.bill_number = bill_number.clone();
        }
        if let Some(ref dealer) = self.dealer {
            updated.dealer = dealer.clone();
        }
        if let Some(ref branch) = self.branch {
            updated.branch = branch.clone();
        }

        if self.amount.is_some() || self.paid.is_some() {
            let amount = self.amount.clone().unwrap_or_else(|| bill.amount().clone());
            let paid = self.paid.clone().unwrap_or_else(|| bill.paid().clone());
            updated.set_terms(amount, paid)?;
        }

        Ok(updated)
    }
}

/// Bill manager enforcing the bill lifecycle over a storage backend
pub struct BillManager<S, D>
where
    S: BillStorage + Directory,
    D: DocumentStore,
{
    pub(crate) storage: S,
    documents: D,
    policy: DocumentPolicy,
    validator: Box<dyn BillValidator>,
}

impl<S, D> BillManager<S, D>
where
    S: BillStorage + Directory,
    D: DocumentStore,
{
    /// Create a new bill manager
    pub fn new(storage: S, documents: D, policy: DocumentPolicy) -> Self {
        Self {
            storage,
            documents,
            policy,
            validator: Box::new(DefaultBillValidator),
        }
    }

    /// Create a new bill manager with custom validator
    pub fn with_validator(
        storage: S,
        documents: D,
        policy: DocumentPolicy,
        validator: Box<dyn BillValidator>,
    ) -> Self {
        Self {
            storage,
            documents,
            policy,
            validator,
        }
    }

    /// Enter a new bill: Pending, nothing paid, everything pending
    pub async fn create_bill(&self, new_bill: NewBill) -> BackOfficeResult<Bill> {
        // Validate everything before the first write
        self.validator.validate_new_bill(&new_bill)?;
        if let Some(ref upload) = new_bill.document {
            self.policy.validate(upload)?;
        }
        self.ensure_bill_number_free(&new_bill.bill_number, None).await?;

        let NewBill {
            dealer,
            branch,
            bill_number,
            amount,
            document,
        } = new_bill;
        let mut bill = Bill::new(dealer, branch, bill_number, amount)?;

        if let Some(upload) = document {
            bill.bill_image = Some(self.store_document(&upload).await?);
        }

        if let Err(err) = self.storage.insert_bill(&bill).await {
            if let Some(ref staged) = bill.bill_image {
                documents::release(&self.documents, staged).await;
            }
            return Err(err);
        }

        tracing::info!(
            bill_id = %bill.id,
            bill_number = %bill.bill_number,
            amount = %bill.amount(),
            "bill created"
        );
        Ok(bill)
    }

    /// Apply a partial update.
    ///
    /// A replacement document is written before the bill is committed and the
    /// old document is released only after the commit succeeded. On any
    /// failure the stored bill is left as it was.
    pub async fn update_bill(&self, bill_id: Uuid, patch: BillPatch) -> BackOfficeResult<Bill> {
        let current = self.get_bill_required(bill_id).await?;

        let mut updated = patch.apply_to(&current)?;
        self.validator.validate_bill(&updated)?;
        if let DocumentChange::Replace(ref upload) = patch.document {
            self.policy.validate(upload)?;
        }
        if updated.bill_number != current.bill_number {
            self.ensure_bill_number_free(&updated.bill_number, Some(bill_id)).await?;
        }

        let staged = match patch.document {
            DocumentChange::Keep => None,
            DocumentChange::Replace(ref upload) => {
                let reference = self.store_document(upload).await?;
                updated.bill_image = Some(reference.clone());
                Some(reference)
            }
            DocumentChange::Remove => {
                updated.bill_image = None;
                None
            }
        };
        updated.touch();

        if let Err(err) = self.storage.replace_bill(&updated).await {
            if let Some(ref reference) = staged {
                documents::release(&self.documents, reference).await;
            }
            return Err(err);
        }

        if current.bill_image != updated.bill_image {
            if let Some(ref old) = current.bill_image {
                documents::release(&self.documents, old).await;
            }
        }

        tracing::info!(
            bill_id = %updated.id,
            paid = %updated.paid(),
            pending = %updated.pending(),
            status = updated.status().as_str(),
            "bill updated"
        );
        Ok(updated)
    }

    /// Get a bill by ID, returning an error if not found
    pub async fn get_bill_required(&self, bill_id: Uuid) -> BackOfficeResult<Bill> {
        self.storage
            .get_bill(bill_id)
            .await?
            .ok_or_else(|| BackOfficeError::NotFound(format!("bill {}", bill_id)))
    }

    /// Get a bill with dealer and branch names
    pub async fn get_bill(&self, bill_id: Uuid) -> BackOfficeResult<BillListing> {
        let bill = self.get_bill_required(bill_id).await?;
        self.expand(bill).await
    }

    /// Bills matching the filter, oldest first
    pub async fn list_bills(&self, filter: &BillFilter) -> BackOfficeResult<Vec<BillListing>> {
        let mut bills = self.storage.list_bills().await?;
        bills.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.bill_number.cmp(&b.bill_number))
        });

        let mut listings = Vec::with_capacity(bills.len());
        for bill in bills {
            let listing = self.expand(bill).await?;
            if filter.matches(&listing) {
                listings.push(listing);
            }
        }
        Ok(listings)
    }

    async fn expand(&self, bill: Bill) -> BackOfficeResult<BillListing> {
        let dealer_name = self.storage.dealer_name(&bill.dealer).await?;
        let branch_name = self.storage.branch_name(&bill.branch).await?;
        Ok(BillListing {
            bill,
            dealer_name,
            branch_name,
        })
    }

    async fn ensure_bill_number_free(
        &self,
        bill_number: &str,
        own_id: Option<Uuid>,
    ) -> BackOfficeResult<()> {
        match self.storage.find_bill_by_number(bill_number).await? {
            Some(existing) if Some(existing.id) != own_id => Err(BackOfficeError::DuplicateKey(
                format!("Bill number '{}' already exists", bill_number),
            )),
            _ => Ok(()),
        }
    }

    async fn store_document(&self, upload: &DocumentUpload) -> BackOfficeResult<DocumentRef> {
        let reference = self.policy.storage_key(upload);
        self.documents.put(&reference, upload).await?;
        tracing::debug!(document = %reference, size = upload.size(), "stored document");
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{MemoryDocumentStore, MemoryStorage};
    use proptest::prelude::*;

    fn manager() -> BillManager<MemoryStorage, MemoryDocumentStore> {
        BillManager::new(
            MemoryStorage::new(),
            MemoryDocumentStore::new(),
            DocumentPolicy::default(),
        )
    }

    fn bill(amount: i64) -> Bill {
        Bill::new(
            "dealer-1".to_string(),
            "branch-1".to_string(),
            "INV-1".to_string(),
            BigDecimal::from(amount),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_payment_lifecycle() {
        let bills = manager();
        let created = bills
            .create_bill(NewBill::new("dealer-1", "branch-1", "INV-1", BigDecimal::from(1000)))
            .await
            .unwrap();
        assert_eq!(created.paid(), &BigDecimal::from(0));
        assert_eq!(created.pending(), BigDecimal::from(1000));
        assert_eq!(created.status(), BillStatus::Pending);

        let paid = bills
            .update_bill(created.id, BillPatch::new().paid(BigDecimal::from(1000)))
            .await
            .unwrap();
        assert_eq!(paid.pending(), BigDecimal::from(0));
        assert_eq!(paid.status(), BillStatus::Completed);

        let reopened = bills
            .update_bill(created.id, BillPatch::new().paid(BigDecimal::from(400)))
            .await
            .unwrap();
        assert_eq!(reopened.pending(), BigDecimal::from(600));
        assert_eq!(reopened.status(), BillStatus::Pending);
    }

    #[tokio::test]
    async fn test_zero_paid_is_applied() {
        let bills = manager();
        let created = bills
            .create_bill(NewBill::new("dealer-1", "branch-1", "INV-2", BigDecimal::from(500)))
            .await
            .unwrap();
        bills
            .update_bill(created.id, BillPatch::new().paid(BigDecimal::from(500)))
            .await
            .unwrap();

        let reset = bills
            .update_bill(created.id, BillPatch::new().paid(BigDecimal::from(0)))
            .await
            .unwrap();
        assert_eq!(reset.paid(), &BigDecimal::from(0));
        assert_eq!(reset.status(), BillStatus::Pending);
    }

    #[tokio::test]
    async fn test_zero_amount_is_applied() {
        let bills = manager();
        let created = bills
            .create_bill(NewBill::new("dealer-1", "branch-1", "INV-3", BigDecimal::from(500)))
            .await
            .unwrap();

        let zeroed = bills
            .update_bill(created.id, BillPatch::new().amount(BigDecimal::from(0)))
            .await
            .unwrap();
        assert_eq!(zeroed.amount(), &BigDecimal::from(0));
        assert_eq!(zeroed.status(), BillStatus::Completed);
    }

    #[tokio::test]
    async fn test_empty_patch_keeps_fields() {
        let bills = manager();
        let created = bills
            .create_bill(NewBill::new("dealer-1", "branch-1", "INV-4", BigDecimal::from(750)))
            .await
            .unwrap();

        let same = bills.update_bill(created.id, BillPatch::new()).await.unwrap();
        assert_eq!(same.bill_number, "INV-4");
        assert_eq!(same.dealer, "dealer-1");
        assert_eq!(same.amount(), &BigDecimal::from(750));
    }

    #[tokio::test]
    async fn test_update_missing_bill() {
        let bills = manager();
        let result = bills.update_bill(Uuid::new_v4(), BillPatch::new()).await;
        assert!(matches!(result, Err(BackOfficeError::NotFound(_))));
    }

    #[test]
    fn test_patch_checks_paid_against_new_amount() {
        let original = bill(1000);
        let patch = BillPatch::new()
            .amount(BigDecimal::from(300))
            .paid(BigDecimal::from(300));
        let updated = patch.apply_to(&original).unwrap();
        assert_eq!(updated.status(), BillStatus::Completed);

        let patch = BillPatch::new()
            .amount(BigDecimal::from(300))
            .paid(BigDecimal::from(301));
        assert!(matches!(
            patch.apply_to(&original),
            Err(BackOfficeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_patch_blank_bill_number_is_caught_by_validator() {
        let updated = BillPatch::new().bill_number("").apply_to(&bill(10)).unwrap();
        assert!(matches!(
            DefaultBillValidator.validate_bill(&updated),
            Err(BackOfficeError::MissingFields(ref fields)) if fields == &vec!["billNumber"]
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any paid within range, pending is amount - paid and status
        /// follows pending.
        #[test]
        fn prop_payment_keeps_invariants(
            (amount, paid) in (0i64..1_000_000).prop_flat_map(|a| (Just(a), 0..=a))
        ) {
            let patched = BillPatch::new()
                .paid(BigDecimal::from(paid))
                .apply_to(&bill(amount))
                .unwrap();

            prop_assert_eq!(patched.pending(), BigDecimal::from(amount - paid));
            prop_assert_eq!(
                patched.status() == BillStatus::Completed,
                amount == paid
            );
        }

        /// Paid outside [0, amount] is rejected and the bill is unchanged.
        #[test]
        fn prop_out_of_range_payment_rejected(
            amount in 0i64..1_000_000,
            excess in 1i64..1_000,
        ) {
            let original = bill(amount);

            let over = BillPatch::new()
                .paid(BigDecimal::from(amount + excess))
                .apply_to(&original);
            prop_assert!(
                matches!(over, Err(BackOfficeError::OutOfRange { .. })),
                "overpayment accepted"
            );

            let under = BillPatch::new()
                .paid(BigDecimal::from(-excess))
                .apply_to(&original);
            prop_assert!(
                matches!(under, Err(BackOfficeError::OutOfRange { .. })),
                "negative payment accepted"
            );

            prop_assert_eq!(original.paid(), &BigDecimal::from(0));
        }
    }
}
