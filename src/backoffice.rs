//! Main back-office facade that coordinates bills and closing entries

use chrono::NaiveDate;
use uuid::Uuid;

use crate::billing::{BillFilter, BillManager, BillPatch, BillSummary, NewBill};
use crate::closing::{ClosingEntryInput, ClosingEntryRecorder};
use crate::settings::BackOfficeConfig;
use crate::traits::*;
use crate::types::*;

/// Back office over one record store and one document store
pub struct BackOffice<S, D>
where
    S: BillStorage + ClosingEntryStorage + Directory,
    D: DocumentStore,
{
    bill_manager: BillManager<S, D>,
    closing_recorder: ClosingEntryRecorder<S>,
}

impl<S, D> BackOffice<S, D>
where
    S: BillStorage + ClosingEntryStorage + Directory + Clone,
    D: DocumentStore,
{
    /// Create a back office with default configuration
    pub fn new(storage: S, documents: D) -> Self {
        Self::with_config(storage, documents, BackOfficeConfig::default())
    }

    /// Create a back office with the given configuration
    pub fn with_config(storage: S, documents: D, config: BackOfficeConfig) -> Self {
        Self {
            bill_manager: BillManager::new(storage.clone(), documents, config.documents),
            closing_recorder: ClosingEntryRecorder::with_config(storage, config.closing),
        }
    }

    /// Create a back office with a custom bill validator
    pub fn with_validator(
        storage: S,
        documents: D,
        config: BackOfficeConfig,
        validator: Box<dyn BillValidator>,
    ) -> Self {
        Self {
            bill_manager: BillManager::with_validator(
                storage.clone(),
                documents,
                config.documents,
                validator,
            ),
            closing_recorder: ClosingEntryRecorder::with_config(storage, config.closing),
        }
    }

    // Bill operations
    /// Enter a new bill
    pub async fn create_bill(&self, new_bill: NewBill) -> BackOfficeResult<Bill> {
        self.bill_manager.create_bill(new_bill).await
    }

    /// Partially update a bill
    pub async fn update_bill(&self, bill_id: Uuid, patch: BillPatch) -> BackOfficeResult<Bill> {
        self.bill_manager.update_bill(bill_id, patch).await
    }

    /// Get a bill with dealer and branch names
    pub async fn get_bill(&self, bill_id: Uuid) -> BackOfficeResult<BillListing> {
        self.bill_manager.get_bill(bill_id).await
    }

    /// List bills matching a filter, oldest first
    pub async fn list_bills(&self, filter: &BillFilter) -> BackOfficeResult<Vec<BillListing>> {
        self.bill_manager.list_bills(filter).await
    }

    /// Totals over the bills matching a filter
    pub async fn bill_summary(&self, filter: &BillFilter) -> BackOfficeResult<BillSummary> {
        let listings = self.list_bills(filter).await?;
        Ok(BillSummary::from_listings(&listings))
    }

    // Closing entry operations
    /// Submit a day's closing for a branch
    pub async fn submit_closing_entry(
        &self,
        input: ClosingEntryInput,
    ) -> BackOfficeResult<ClosingEntry> {
        self.closing_recorder.submit(input).await
    }

    /// Get a closing entry by ID
    pub async fn get_closing_entry(&self, entry_id: Uuid) -> BackOfficeResult<ClosingEntry> {
        self.closing_recorder.get(entry_id).await
    }

    /// Closing entries, optionally for one branch and an inclusive date range
    pub async fn list_closing_entries(
        &self,
        branch: Option<&str>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> BackOfficeResult<Vec<ClosingEntry>> {
        self.closing_recorder
            .list(branch, start_date, end_date)
            .await
    }
}
