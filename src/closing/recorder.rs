//! Recording closing entries

use chrono::NaiveDate;
use uuid::Uuid;

use crate::settings::ClosingConfig;
use crate::traits::*;
use crate::types::*;

use super::input::ClosingEntryInput;

/// Validates, reconciles and stores closing entries
pub struct ClosingEntryRecorder<S: ClosingEntryStorage> {
    storage: S,
    config: ClosingConfig,
}

impl<S: ClosingEntryStorage> ClosingEntryRecorder<S> {
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, ClosingConfig::default())
    }

    pub fn with_config(storage: S, config: ClosingConfig) -> Self {
        Self { storage, config }
    }

    /// Validate a submission, derive cash and totals, and store the snapshot
    pub async fn submit(&self, input: ClosingEntryInput) -> BackOfficeResult<ClosingEntry> {
        let validated = input.validate()?;

        let entry = ClosingEntry::new(
            validated.branch,
            validated.date,
            &validated.sales,
            &validated.payments,
            validated.counts,
        );

        self.storage
            .insert_closing_entry(&entry, self.config.unique_per_branch_day)
            .await?;

        if entry.is_balanced() {
            tracing::info!(
                entry_id = %entry.id,
                branch = %entry.branch,
                date = %entry.date,
                "closing entry recorded"
            );
        } else {
            tracing::warn!(
                entry_id = %entry.id,
                branch = %entry.branch,
                date = %entry.date,
                discrepancy = %entry.discrepancy(),
                outcome = ?entry.outcome(),
                "closing entry recorded with discrepancy"
            );
        }

        Ok(entry)
    }

    /// Get a closing entry by ID, returning an error if not found
    pub async fn get(&self, entry_id: Uuid) -> BackOfficeResult<ClosingEntry> {
        self.storage
            .get_closing_entry(entry_id)
            .await?
            .ok_or_else(|| BackOfficeError::NotFound(format!("closing entry {}", entry_id)))
    }

    /// Closing entries ordered by date, then submission time
    pub async fn list(
        &self,
        branch: Option<&str>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> BackOfficeResult<Vec<ClosingEntry>> {
        let mut entries = self
            .storage
            .list_closing_entries(branch, start_date, end_date)
            .await?;
        entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.created_at.cmp(&b.created_at)));
        Ok(entries)
    }
}
