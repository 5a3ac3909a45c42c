//! Utility modules

pub mod memory_documents;
pub mod memory_storage;
pub mod validation;

pub use memory_documents::*;
pub use memory_storage::*;
pub use validation::*;
