//! Input/output helpers.
//!
//! - model artifact + VERSION read/write (`artifact`)
//! - training data export (CSV) (`export`)
//! - all-or-nothing commit of a run's output files (`staging`)

pub mod artifact;
pub mod export;
pub mod staging;

pub use artifact::*;
pub use export::*;
pub use staging::*;
