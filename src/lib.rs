//! # Dealer Desk
//!
//! Back-office core for a retail dealer network: dealer bill entry with
//! payment tracking, and the daily closing-cash reconciliation of each
//! branch.
//!
//! ## Features
//!
//! - **Bill lifecycle**: amount, paid and pending kept consistent, with the
//!   Pending/Completed status derived from what is still owed
//! - **Partial updates**: absent fields are kept, explicit zeros are applied
//! - **Bill documents**: image/PDF attachments with write-then-release replacement
//! - **Closing reconciliation**: cash from note counts, sales and payment
//!   totals, and the signed discrepancy between them
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use dealer_desk::utils::{MemoryDocumentStore, MemoryStorage};
//! use dealer_desk::{BackOffice, BillPatch, BillStatus, NewBill};
//! use bigdecimal::BigDecimal;
//!
//! # async fn run() -> dealer_desk::BackOfficeResult<()> {
//! let office = BackOffice::new(MemoryStorage::new(), MemoryDocumentStore::new());
//!
//! let bill = office
//!     .create_bill(NewBill::new("dealer-1", "branch-1", "INV-1", BigDecimal::from(1000)))
//!     .await?;
//! let bill = office
//!     .update_bill(bill.id, BillPatch::new().paid(BigDecimal::from(1000)))
//!     .await?;
//! assert_eq!(bill.status(), BillStatus::Completed);
//! # Ok(())
//! # }
//! ```

pub mod backoffice;
pub mod billing;
pub mod closing;
pub mod documents;
pub mod reconciliation;
pub mod settings;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use backoffice::*;
pub use billing::*;
pub use closing::*;
pub use documents::*;
pub use reconciliation::*;
pub use settings::*;
pub use traits::*;
pub use types::*;
