//! Domain types used throughout the trainer and the scorer.
//!
//! This module defines:
//!
//! - the scoring contract (`ApplicationRecord`, `FeatureVector`, `ScoredResult`)
//! - training inputs/outputs (`LabeledApplicant`, `TrainingMetrics`)
//! - run configuration (`TrainConfig`, `ServeConfig`)

pub mod types;

pub use types::*;
