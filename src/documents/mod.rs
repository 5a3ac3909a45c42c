//! Bill attachments: upload policy and store housekeeping
//!
//! A bill may carry one scanned image or PDF. Uploads are checked against a
//! [`DocumentPolicy`] before anything is written, and replaced documents are
//! released only after the bill that stops referencing them is committed.

pub mod policy;

pub use policy::*;

use crate::traits::DocumentStore;
use crate::types::*;

/// A file handed in by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpload {
    /// Original file name, used for its extension
    pub filename: String,
    /// Declared MIME type
    pub content_type: String,
    pub content: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content,
        }
    }

    /// Payload size in bytes
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Lower-cased file extension, if any
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// What an update does to a bill's attached document
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DocumentChange {
    /// Leave the current document as is
    #[default]
    Keep,
    /// Store a new document and release the old one
    Replace(DocumentUpload),
    /// Drop the reference and release the old document
    Remove,
}

/// Delete a document that is no longer referenced.
///
/// Best effort: the record change that orphaned it is already settled, so a
/// failure is logged and swallowed.
pub(crate) async fn release<D: DocumentStore + ?Sized>(store: &D, reference: &DocumentRef) {
    match store.delete(reference).await {
        Ok(()) => tracing::debug!(document = %reference, "released document"),
        Err(err) => tracing::warn!(
            document = %reference,
            error = %err,
            "failed to release document; it is now orphaned"
        ),
    }
}
