//! Daily closing entries per branch

pub mod input;
pub mod recorder;

pub use input::*;
pub use recorder::*;
