//! Model fitting.
//!
//! Responsibilities:
//!
//! - standardize features and fit the penalized logistic classifier
//! - compute in-sample diagnostics for the fitted pipeline

pub mod diagnostics;
pub mod fitter;

pub use diagnostics::*;
pub use fitter::*;
