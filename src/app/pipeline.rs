//! Shared "training run" logic used by the CLI and the integration tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! synthetic sample -> fit -> diagnostics -> staged artifact (+ optional export) -> commit
//!
//! The CLI can then focus on presentation (printing the summary).

use chrono::Utc;
use tracing::info;

use crate::data::{SyntheticDataset, generate_dataset};
use crate::domain::{TrainConfig, TrainingMetrics};
use crate::error::TrainError;
use crate::fit::{FitOptions, FitReport, compute_metrics, fit_pipeline};
use crate::io::{ArtifactPaths, ModelFile, StagedFiles, TrainingInfo, stage_artifact, stage_dataset_csv};
use crate::models::Pipeline;

/// All computed outputs of a single `loan-score train` run.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub dataset: SyntheticDataset,
    pub pipeline: Pipeline,
    pub fit: FitReport,
    pub metrics: TrainingMetrics,
    pub artifact: ArtifactPaths,
    pub version: String,
}

/// Execute the full training pipeline and persist the artifact.
pub fn run_training(config: &TrainConfig) -> Result<TrainingRun, TrainError> {
    let version = config.model_version.trim().to_string();
    if version.is_empty() || version.contains(['\n', '\r']) {
        return Err(TrainError::Config(format!(
            "model version must be a non-empty single line (got {:?})",
            config.model_version
        )));
    }

    info!(seed = config.seed, n = config.sample_count, "generating synthetic applicants");
    let dataset = generate_dataset(config)?;

    let (pipeline, fit) = fit_pipeline(&dataset.applicants, &FitOptions::from_config(config))?;
    info!(
        iterations = fit.iterations,
        converged = fit.converged,
        grad_norm = fit.grad_norm,
        "logistic fit finished"
    );

    let metrics = compute_metrics(&pipeline, &dataset.applicants);

    let model = ModelFile::new(
        &pipeline,
        TrainingInfo {
            seed: config.seed,
            n_samples: dataset.applicants.len(),
            trained_at: Utc::now(),
            metrics: metrics.clone(),
        },
    );
    // Every output is staged first; nothing replaces a previous artifact
    // unless all of them were written.
    let mut staged = StagedFiles::new();
    let artifact = stage_artifact(&mut staged, &config.out_dir, &model, &version)?;
    if let Some(path) = &config.export_data {
        stage_dataset_csv(&mut staged, path, &dataset)?;
    }
    staged.commit()?;

    info!(
        model = %artifact.model.display(),
        version = %artifact.version.display(),
        "artifact written"
    );
    if let Some(path) = &config.export_data {
        info!(path = %path.display(), rows = dataset.applicants.len(), "training data exported");
    }

    Ok(TrainingRun {
        dataset,
        pipeline,
        fit,
        metrics,
        artifact,
        version,
    })
}
