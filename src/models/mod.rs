//! Fitted pipeline types.
//!
//! Models are plain serializable data with pure evaluation methods so that the
//! fitter, the artifact writer and the scorer can share them.

pub mod model;

pub use model::*;
