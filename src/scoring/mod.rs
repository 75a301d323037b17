//! The feature/decision contract.
//!
//! - record validation and feature-vector construction (`features`)
//! - probability-to-APR mapping and rounding (`pricing`)
//! - the loaded scorer and its health report (`service`)

pub mod features;
pub mod pricing;
pub mod service;

pub use features::*;
pub use pricing::*;
pub use service::*;
