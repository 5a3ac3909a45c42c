//! Closing-cash reconciliation arithmetic
//!
//! Pure functions only: turning denomination counts into a cash total and
//! sales/payment figures into totals and a signed discrepancy. Nothing here
//! touches storage or fails on a missing figure; presence is checked one
//! layer up by the closing entry recorder.

pub mod denomination;
pub mod totals;

pub use denomination::*;
pub use totals::*;
