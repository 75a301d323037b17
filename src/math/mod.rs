//! Mathematical utilities: logistic link, linear solves, loan arithmetic.

pub mod finance;
pub mod linalg;
pub mod logistic;

pub use finance::*;
pub use linalg::*;
pub use logistic::*;
