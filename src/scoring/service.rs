//! The scorer: a loaded artifact plus the pure `score` operation.
//!
//! A [`Scorer`] is built once at startup and shared read-only (behind an `Arc`)
//! by every request. If the artifact could not be loaded the scorer still
//! exists, reports itself unhealthy, and fails each `score` call fast with
//! [`ScoreError::ModelUnavailable`].

use std::path::Path;

use tracing::{info, warn};

use crate::domain::{ApplicationRecord, HealthStatus, ScoredResult};
use crate::error::ScoreError;
use crate::io::artifact::{ModelArtifact, UNKNOWN_VERSION, load_artifact, read_version};
use crate::models::Pipeline;
use crate::scoring::features::checked_feature_vector;
use crate::scoring::pricing::{recommended_apr, round_response};

#[derive(Debug, Clone)]
enum ModelState {
    Ready(Pipeline),
    Unavailable { reason: String },
}

#[derive(Debug, Clone)]
pub struct Scorer {
    state: ModelState,
    version: String,
}

impl Scorer {
    /// Load the artifact in `dir`. Never fails: a load error yields an
    /// unavailable scorer that carries the reason.
    pub fn load(dir: &Path) -> Self {
        match load_artifact(dir) {
            Ok(artifact) => {
                info!(
                    dir = %dir.display(),
                    version = %artifact.version,
                    trained_at = %artifact.training.trained_at,
                    "model loaded"
                );
                Self::from_artifact(artifact)
            }
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "model unavailable");
                let version = read_version(dir).unwrap_or_else(|_| UNKNOWN_VERSION.to_string());
                Self::unavailable(err.to_string(), version)
            }
        }
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self {
            state: ModelState::Ready(artifact.pipeline),
            version: artifact.version,
        }
    }

    pub fn unavailable(reason: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            state: ModelState::Unavailable {
                reason: reason.into(),
            },
            version: version.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            ok: self.is_ready(),
            version: self.version.clone(),
        }
    }

    /// Score one application.
    ///
    /// Availability is checked before validation so an unloaded service fails
    /// fast regardless of input.
    pub fn score(&self, record: &ApplicationRecord) -> Result<ScoredResult, ScoreError> {
        let pipeline = match &self.state {
            ModelState::Ready(pipeline) => pipeline,
            ModelState::Unavailable { reason } => {
                return Err(ScoreError::ModelUnavailable(reason.clone()));
            }
        };

        let features = checked_feature_vector(record)?;
        let pd = pipeline
            .predict_default(&features)
            .ok_or_else(|| ScoreError::ModelUnavailable("model has no default class".into()))?;
        if !(pd.is_finite() && (0.0..=1.0).contains(&pd)) {
            return Err(ScoreError::Prediction(format!(
                "default probability {pd} is outside [0, 1]"
            )));
        }

        Ok(ScoredResult {
            pd: round_response(pd),
            recommended_apr: round_response(recommended_apr(pd)),
            model_version: self.version.clone(),
        })
    }
}
