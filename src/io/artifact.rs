//! Read/write the persisted model artifact.
//!
//! The artifact is two files in one directory:
//! - `model.json`: the fitted pipeline plus training metadata (schema: [`ModelFile`])
//! - `VERSION`: a single line naming the model version
//!
//! Writes go through [`StagedFiles`], so a failed run leaves the previous
//! artifact (or nothing) in place, never a mix of old and new files.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_COUNT, FEATURE_NAMES, TrainingMetrics};
use crate::error::ArtifactError;
use crate::io::staging::StagedFiles;
use crate::models::{LogisticClassifier, NEGATIVE_CLASS, POSITIVE_CLASS, Pipeline, StandardScaler};
use crate::scoring::features::feature_names;

pub const MODEL_FILE: &str = "model.json";
pub const VERSION_FILE: &str = "VERSION";
/// Version reported when no version file exists.
pub const UNKNOWN_VERSION: &str = "unknown";

const FORMAT: &str = "loan-score/pipeline";
const FORMAT_VERSION: u32 = 1;

/// On-disk schema of `model.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub format: String,
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub classifier: LogisticClassifier,
    pub training: TrainingInfo,
}

/// Provenance of a fitted pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingInfo {
    pub seed: u64,
    pub n_samples: usize,
    pub trained_at: DateTime<Utc>,
    pub metrics: TrainingMetrics,
}

/// A validated pipeline with its version string.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    pub pipeline: Pipeline,
    pub version: String,
    pub training: TrainingInfo,
}

/// Where a training run put its outputs.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub version: PathBuf,
}

impl ModelFile {
    pub fn new(pipeline: &Pipeline, training: TrainingInfo) -> Self {
        Self {
            format: FORMAT.to_string(),
            format_version: FORMAT_VERSION,
            feature_names: feature_names(),
            scaler: pipeline.scaler.clone(),
            classifier: pipeline.classifier.clone(),
            training,
        }
    }

    /// Check that the file describes a pipeline this build can evaluate.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.format != FORMAT || self.format_version != FORMAT_VERSION {
            return Err(ArtifactError::Incompatible(format!(
                "unsupported format '{}' v{} (expected '{FORMAT}' v{FORMAT_VERSION})",
                self.format, self.format_version
            )));
        }

        let names: Vec<&str> = self.feature_names.iter().map(String::as_str).collect();
        if names != FEATURE_NAMES {
            return Err(ArtifactError::Incompatible(format!(
                "feature order {names:?} does not match {FEATURE_NAMES:?}"
            )));
        }

        check_len("scaler.mean", &self.scaler.mean)?;
        check_len("scaler.scale", &self.scaler.scale)?;
        check_len("classifier.coefficients", &self.classifier.coefficients)?;
        if self.scaler.scale.iter().any(|s| *s == 0.0) {
            return Err(ArtifactError::Incompatible("scaler.scale contains zero".into()));
        }
        if !self.classifier.intercept.is_finite() {
            return Err(ArtifactError::Incompatible("classifier.intercept is not finite".into()));
        }

        let mut classes = self.classifier.classes.clone();
        classes.sort_unstable();
        if classes != [NEGATIVE_CLASS, POSITIVE_CLASS] {
            return Err(ArtifactError::Incompatible(format!(
                "expected classes {{{NEGATIVE_CLASS}, {POSITIVE_CLASS}}}, got {:?}",
                self.classifier.classes
            )));
        }

        Ok(())
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline {
            scaler: self.scaler.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

fn check_len(field: &str, values: &[f64]) -> Result<(), ArtifactError> {
    if values.len() != FEATURE_COUNT {
        return Err(ArtifactError::Incompatible(format!(
            "{field} has {} entries, expected {FEATURE_COUNT}",
            values.len()
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ArtifactError::Incompatible(format!("{field} contains non-finite values")));
    }
    Ok(())
}

/// Write `model.json` and `VERSION` into `dir`, all or nothing.
pub fn write_artifact(dir: &Path, model: &ModelFile, version: &str) -> Result<ArtifactPaths, ArtifactError> {
    let mut staged = StagedFiles::new();
    let paths = stage_artifact(&mut staged, dir, model, version)?;
    staged.commit()?;
    Ok(paths)
}

/// Stage `model.json` and `VERSION` for `dir` into a batch.
///
/// Nothing is visible under the final names until the batch is committed.
pub fn stage_artifact(
    staged: &mut StagedFiles,
    dir: &Path,
    model: &ModelFile,
    version: &str,
) -> Result<ArtifactPaths, ArtifactError> {
    fs::create_dir_all(dir).map_err(|source| ArtifactError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let paths = ArtifactPaths {
        model: dir.join(MODEL_FILE),
        version: dir.join(VERSION_FILE),
    };

    staged.stage(&paths.model, |w| {
        serde_json::to_writer_pretty(&mut *w, model).map_err(ArtifactError::Encode)?;
        w.write_all(b"\n").map_err(|source| ArtifactError::Write {
            path: paths.model.clone(),
            source,
        })
    })?;
    staged.stage(&paths.version, |w| {
        writeln!(w, "{}", version.trim()).map_err(|source| ArtifactError::Write {
            path: paths.version.clone(),
            source,
        })
    })?;

    Ok(paths)
}

/// Read and validate an artifact directory.
pub fn load_artifact(dir: &Path) -> Result<ModelArtifact, ArtifactError> {
    let model = read_model_json(&dir.join(MODEL_FILE))?;
    model.validate()?;
    let version = read_version(dir)?;
    Ok(ModelArtifact {
        pipeline: model.pipeline(),
        version,
        training: model.training,
    })
}

/// Read `model.json` without validating it.
pub fn read_model_json(path: &Path) -> Result<ModelFile, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the trimmed version line; [`UNKNOWN_VERSION`] if the file is absent.
pub fn read_version(dir: &Path) -> Result<String, ArtifactError> {
    let path = dir.join(VERSION_FILE);
    match fs::read_to_string(&path) {
        Ok(text) => {
            let line = text.lines().next().unwrap_or("").trim();
            let version = if line.is_empty() { UNKNOWN_VERSION } else { line };
            Ok(version.to_string())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(UNKNOWN_VERSION.to_string()),
        Err(source) => Err(ArtifactError::Read { path, source }),
    }
}
