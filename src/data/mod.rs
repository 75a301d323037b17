//! Training data sources.

pub mod sample;

pub use sample::{DatasetStats, SyntheticDataset, TERM_CHOICES, generate_dataset};
