//! In-memory document store for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::documents::DocumentUpload;
use crate::traits::*;
use crate::types::*;

/// A stored document
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub content_type: String,
    pub content: Vec<u8>,
}

/// In-memory document store; clones share the same contents
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<HashMap<String, StoredDocument>>>,
    unavailable: Arc<AtomicBool>,
    failing_deletes: Arc<AtomicBool>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `StorageUnavailable` (useful for testing)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only deletes fail, while writes and reads keep working (useful for testing)
    pub fn set_failing_deletes(&self, failing: bool) {
        self.failing_deletes.store(failing, Ordering::SeqCst);
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A stored document, if present
    pub fn get(&self, reference: &DocumentRef) -> Option<StoredDocument> {
        self.documents
            .read()
            .ok()
            .and_then(|docs| docs.get(reference.as_str()).cloned())
    }

    fn check_available(&self) -> BackOfficeResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(BackOfficeError::StorageUnavailable(
                "document store is offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

fn poisoned() -> BackOfficeError {
    BackOfficeError::StorageUnavailable("document store lock poisoned".to_string())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn put(&self, reference: &DocumentRef, upload: &DocumentUpload) -> BackOfficeResult<()> {
        self.check_available()?;
        self.documents.write().map_err(|_| poisoned())?.insert(
            reference.as_str().to_string(),
            StoredDocument {
                content_type: upload.content_type.clone(),
                content: upload.content.clone(),
            },
        );
        Ok(())
    }

    async fn delete(&self, reference: &DocumentRef) -> BackOfficeResult<()> {
        self.check_available()?;
        if self.failing_deletes.load(Ordering::SeqCst) {
            return Err(BackOfficeError::StorageUnavailable(format!(
                "cannot delete {}",
                reference
            )));
        }
        self.documents
            .write()
            .map_err(|_| poisoned())?
            .remove(reference.as_str());
        Ok(())
    }

    async fn exists(&self, reference: &DocumentRef) -> BackOfficeResult<bool> {
        self.check_available()?;
        Ok(self
            .documents
            .read()
            .map_err(|_| poisoned())?
            .contains_key(reference.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_delete() {
        let store = MemoryDocumentStore::new();
        let reference = DocumentRef::new("dealerbills/bill_1.pdf");
        let upload = DocumentUpload::new("bill.pdf", "application/pdf", vec![1, 2, 3]);

        store.put(&reference, &upload).await.unwrap();
        assert!(store.exists(&reference).await.unwrap());
        assert_eq!(store.get(&reference).unwrap().content, vec![1, 2, 3]);

        store.delete(&reference).await.unwrap();
        assert!(!store.exists(&reference).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryDocumentStore::new();
        let reference = DocumentRef::new("dealerbills/never-stored.png");
        store.delete(&reference).await.unwrap();
        store.delete(&reference).await.unwrap();
    }

    #[tokio::test]
    async fn test_failing_deletes_keep_document() {
        let store = MemoryDocumentStore::new();
        let reference = DocumentRef::new("dealerbills/bill_2.png");
        let upload = DocumentUpload::new("bill.png", "image/png", vec![7]);
        store.set_failing_deletes(true);

        store.put(&reference, &upload).await.unwrap();
        let result = store.delete(&reference).await;
        assert!(matches!(result, Err(BackOfficeError::StorageUnavailable(_))));
        assert!(store.exists(&reference).await.unwrap());

        store.set_failing_deletes(false);
        store.delete(&reference).await.unwrap();
        assert!(store.is_empty());
    }
}
