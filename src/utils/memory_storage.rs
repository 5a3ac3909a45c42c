//! In-memory storage implementation for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share the same tables, so one instance can back several managers
/// and concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    bills: Arc<RwLock<HashMap<Uuid, Bill>>>,
    closing_entries: Arc<RwLock<HashMap<Uuid, ClosingEntry>>>,
    dealers: Arc<RwLock<HashMap<String, String>>>,
    branches: Arc<RwLock<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dealer's display name
    pub fn register_dealer(
        &self,
        dealer_id: impl Into<String>,
        name: impl Into<String>,
    ) -> BackOfficeResult<()> {
        write(&self.dealers)?.insert(dealer_id.into(), name.into());
        Ok(())
    }

    /// Register a branch's display name
    pub fn register_branch(
        &self,
        branch_id: impl Into<String>,
        name: impl Into<String>,
    ) -> BackOfficeResult<()> {
        write(&self.branches)?.insert(branch_id.into(), name.into());
        Ok(())
    }

    /// Make every write fail with `StorageUnavailable` (useful for testing)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> BackOfficeResult<()> {
        write(&self.bills)?.clear();
        write(&self.closing_entries)?.clear();
        Ok(())
    }

    fn check_available(&self) -> BackOfficeResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(BackOfficeError::StorageUnavailable(
                "memory storage is offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

fn read<T>(lock: &RwLock<T>) -> BackOfficeResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| BackOfficeError::StorageUnavailable("storage lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> BackOfficeResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| BackOfficeError::StorageUnavailable("storage lock poisoned".to_string()))
}

fn duplicate_bill_number(bill_number: &str) -> BackOfficeError {
    BackOfficeError::DuplicateKey(format!("Bill number '{}' already exists", bill_number))
}

#[async_trait]
impl BillStorage for MemoryStorage {
    async fn insert_bill(&self, bill: &Bill) -> BackOfficeResult<()> {
        self.check_available()?;
        let mut bills = write(&self.bills)?;

        // Uniqueness is checked under the same lock as the insert
        if bills.values().any(|b| b.bill_number == bill.bill_number) {
            return Err(duplicate_bill_number(&bill.bill_number));
        }
        if bills.contains_key(&bill.id) {
            return Err(BackOfficeError::DuplicateKey(format!("bill {}", bill.id)));
        }

        bills.insert(bill.id, bill.clone());
        Ok(())
    }

    async fn get_bill(&self, bill_id: Uuid) -> BackOfficeResult<Option<Bill>> {
        Ok(read(&self.bills)?.get(&bill_id).cloned())
    }

    async fn find_bill_by_number(&self, bill_number: &str) -> BackOfficeResult<Option<Bill>> {
        Ok(read(&self.bills)?
            .values()
            .find(|b| b.bill_number == bill_number)
            .cloned())
    }

    async fn replace_bill(&self, bill: &Bill) -> BackOfficeResult<()> {
        self.check_available()?;
        let mut bills = write(&self.bills)?;

        if !bills.contains_key(&bill.id) {
            return Err(BackOfficeError::NotFound(format!("bill {}", bill.id)));
        }
        if bills
            .values()
            .any(|b| b.id != bill.id && b.bill_number == bill.bill_number)
        {
            return Err(duplicate_bill_number(&bill.bill_number));
        }

        bills.insert(bill.id, bill.clone());
        Ok(())
    }

    async fn list_bills(&self) -> BackOfficeResult<Vec<Bill>> {
        Ok(read(&self.bills)?.values().cloned().collect())
    }
}

#[async_trait]
impl ClosingEntryStorage for MemoryStorage {
    async fn insert_closing_entry(
        &self,
        entry: &ClosingEntry,
        unique_per_branch_day: bool,
    ) -> BackOfficeResult<()> {
        self.check_available()?;
        let mut entries = write(&self.closing_entries)?;

        if unique_per_branch_day
            && entries
                .values()
                .any(|e| e.branch == entry.branch && e.date == entry.date)
        {
            return Err(BackOfficeError::DuplicateKey(format!(
                "Closing entry for branch '{}' on {} already exists",
                entry.branch, entry.date
            )));
        }

        entries.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn get_closing_entry(&self, entry_id: Uuid) -> BackOfficeResult<Option<ClosingEntry>> {
        Ok(read(&self.closing_entries)?.get(&entry_id).cloned())
    }

    async fn list_closing_entries(
        &self,
        branch: Option<&str>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> BackOfficeResult<Vec<ClosingEntry>> {
        let entries = read(&self.closing_entries)?;
        let filtered: Vec<ClosingEntry> = entries
            .values()
            .filter(|entry| {
                if let Some(branch) = branch {
                    if entry.branch != branch {
                        return false;
                    }
                }

                // Check date range
                if let Some(start) = start_date {
                    if entry.date < start {
                        return false;
                    }
                }
                if let Some(end) = end_date {
                    if entry.date > end {
                        return false;
                    }
                }

                true
            })
            .cloned()
            .collect();
        Ok(filtered)
    }
}

#[async_trait]
impl Directory for MemoryStorage {
    async fn dealer_name(&self, dealer_id: &str) -> BackOfficeResult<Option<String>> {
        Ok(read(&self.dealers)?.get(dealer_id).cloned())
    }

    async fn branch_name(&self, branch_id: &str) -> BackOfficeResult<Option<String>> {
        Ok(read(&self.branches)?.get(branch_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn bill(bill_number: &str) -> Bill {
        Bill::new(
            "dealer-1".to_string(),
            "branch-1".to_string(),
            bill_number.to_string(),
            BigDecimal::from(100),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_rejects_taken_bill_number() {
        let storage = MemoryStorage::new();
        storage.insert_bill(&bill("INV-1")).await.unwrap();

        let result = storage.insert_bill(&bill("INV-1")).await;
        assert!(matches!(result, Err(BackOfficeError::DuplicateKey(_))));
        assert_eq!(storage.list_bills().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_checks_existence_and_uniqueness() {
        let storage = MemoryStorage::new();
        let first = bill("INV-1");
        let mut second = bill("INV-2");
        storage.insert_bill(&first).await.unwrap();

        let missing = storage.replace_bill(&second).await;
        assert!(matches!(missing, Err(BackOfficeError::NotFound(_))));

        storage.insert_bill(&second).await.unwrap();
        second.bill_number = "INV-1".to_string();
        let clash = storage.replace_bill(&second).await;
        assert!(matches!(clash, Err(BackOfficeError::DuplicateKey(_))));

        let stored = storage.get_bill(second.id).await.unwrap().unwrap();
        assert_eq!(stored.bill_number, "INV-2");
    }

    #[tokio::test]
    async fn test_unavailable_blocks_writes() {
        let storage = MemoryStorage::new();
        storage.set_unavailable(true);

        let result = storage.insert_bill(&bill("INV-1")).await;
        assert!(matches!(result, Err(BackOfficeError::StorageUnavailable(_))));

        storage.set_unavailable(false);
        storage.insert_bill(&bill("INV-1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_directory_names() {
        let storage = MemoryStorage::new();
        storage.register_dealer("dealer-1", "Acme Traders").unwrap();
        storage.register_branch("branch-1", "North").unwrap();

        assert_eq!(
            storage.dealer_name("dealer-1").await.unwrap().as_deref(),
            Some("Acme Traders")
        );
        assert_eq!(storage.branch_name("branch-9").await.unwrap(), None);
    }
}
