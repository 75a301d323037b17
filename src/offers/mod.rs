//! Rule-based vehicle loan evaluation.
//!
//! - request validation, derived ratios and the approval gate (`evaluate`)
//! - APR tiers and the lender panel (`lenders`)
//!
//! Independent of the fitted model: evaluation works with no artifact loaded.

pub mod evaluate;
pub mod lenders;

pub use evaluate::*;
pub use lenders::*;
