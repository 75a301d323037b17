//! Error types.
//!
//! - [`ScoreError`]: failures of a single scoring or evaluation call (surfaced to HTTP clients)
//! - [`TrainError`]: failures of an offline training run (always fatal)
//! - [`ArtifactError`]: reading/writing the persisted pipeline
//! - [`AppError`]: the binary's top-level error, carrying a process exit code

use std::path::PathBuf;

use thiserror::Error;

/// Usage, configuration and IO problems.
pub const EXIT_USAGE: u8 = 2;
/// A record failed validation.
pub const EXIT_VALIDATION: u8 = 3;
/// Data generation or model fitting failed.
pub const EXIT_TRAINING: u8 = 4;
/// No usable model, a prediction that could not be computed, or the server
/// could not run.
pub const EXIT_UNAVAILABLE: u8 = 5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// A request field is malformed or out of range.
    #[error("invalid field `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },
    /// The artifact failed to load at startup; nothing can be scored.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    /// Valid inputs that still push the linear score out of floating point range.
    #[error("prediction failed: {0}")]
    Prediction(String),
    /// A valid loan request whose derived figures are not finite.
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

impl ScoreError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("invalid training configuration: {0}")]
    Config(String),
    #[error("synthetic data generation failed: {0}")]
    Sample(String),
    #[error("model fit failed: {0}")]
    Fit(String),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid model JSON '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode model JSON: {0}")]
    Encode(serde_json::Error),
    #[error("incompatible model artifact: {0}")]
    Incompatible(String),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        let code = match err {
            ScoreError::Validation { .. } => EXIT_VALIDATION,
            ScoreError::ModelUnavailable(_)
            | ScoreError::Prediction(_)
            | ScoreError::Evaluation(_) => EXIT_UNAVAILABLE,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<TrainError> for AppError {
    fn from(err: TrainError) -> Self {
        let code = match err {
            TrainError::Config(_) => EXIT_USAGE,
            TrainError::Sample(_) | TrainError::Fit(_) | TrainError::Artifact(_) => EXIT_TRAINING,
        };
        AppError::new(code, format!("Training failed: {err}"))
    }
}

impl From<ArtifactError> for AppError {
    fn from(err: ArtifactError) -> Self {
        AppError::new(EXIT_USAGE, err.to_string())
    }
}
