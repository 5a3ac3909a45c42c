//! Dealer bill entry and payment tracking

pub mod filter;
pub mod lifecycle;

pub use filter::*;
pub use lifecycle::*;
