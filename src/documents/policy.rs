//! Which uploads are accepted and where they are stored

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DocumentUpload;
use crate::types::*;

/// Upload constraints for bill documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPolicy {
    /// Largest accepted payload in bytes
    #[serde(default = "default_max_size")]
    pub max_size: u64,
    /// Accepted MIME types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
    /// Path prefix for stored documents
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl DocumentPolicy {
    /// 5 MiB
    pub const DEFAULT_MAX_SIZE: u64 = 5 * 1024 * 1024;

    /// Check an upload before anything is written.
    ///
    /// The declared type must be allowed and the file extension must agree
    /// with it.
    pub fn validate(&self, upload: &DocumentUpload) -> BackOfficeResult<()> {
        let content_type = upload.content_type.to_ascii_lowercase();
        if !self.allowed_types.iter().any(|t| *t == content_type) {
            return Err(BackOfficeError::InvalidDocumentType(format!(
                "'{}' is not an accepted type",
                upload.content_type
            )));
        }

        let extension_type = upload.extension().as_deref().and_then(content_type_for_extension);
        if extension_type != Some(content_type.as_str()) {
            return Err(BackOfficeError::InvalidDocumentType(format!(
                "extension of '{}' does not match '{}'",
                upload.filename, upload.content_type
            )));
        }

        if upload.size() > self.max_size {
            return Err(BackOfficeError::DocumentTooLarge {
                size: upload.size(),
                max: self.max_size,
            });
        }

        Ok(())
    }

    /// Fresh storage path for an upload, e.g. `dealerbills/bill_<uuid>.pdf`
    pub fn storage_key(&self, upload: &DocumentUpload) -> DocumentRef {
        let name = format!("bill_{}", Uuid::new_v4().simple());
        let file = match upload.extension() {
            Some(ext) => format!("{name}.{ext}"),
            None => name,
        };
        let prefix = self.key_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            DocumentRef::new(file)
        } else {
            DocumentRef::new(format!("{prefix}/{file}"))
        }
    }
}

impl Default for DocumentPolicy {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            allowed_types: default_allowed_types(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// MIME type implied by a file extension, for the types bills may use
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

fn default_max_size() -> u64 {
    DocumentPolicy::DEFAULT_MAX_SIZE
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "application/pdf".to_string(),
    ]
}

fn default_key_prefix() -> String {
    "dealerbills".to_string()
}
