//! Train -> persist -> load -> score, through the public library API.

use std::fs;
use std::path::Path;

use chrono::Utc;
use loan_score::app::pipeline::run_training;
use loan_score::domain::{ApplicationRecord, TrainConfig, TrainingMetrics};
use loan_score::error::ScoreError;
use loan_score::io::{MODEL_FILE, ModelFile, TrainingInfo, VERSION_FILE, load_artifact, write_artifact};
use loan_score::models::{LogisticClassifier, Pipeline, StandardScaler};
use loan_score::scoring::Scorer;

fn record() -> ApplicationRecord {
    ApplicationRecord {
        income_monthly: 5200.0,
        other_debt_monthly: 600.0,
        housing_cost: 1400.0,
        principal: 30000.0,
        term_months: 72,
        ltv: 1.05,
        dti: 0.52,
        state: "CA".to_string(),
    }
}

fn train_into(dir: &Path) -> loan_score::app::pipeline::TrainingRun {
    let config = TrainConfig {
        out_dir: dir.to_path_buf(),
        ..TrainConfig::default()
    };
    run_training(&config).unwrap()
}

/// Hand-built pipeline with round numbers; scores below were computed by hand.
fn fixture_pipeline() -> Pipeline {
    Pipeline {
        scaler: StandardScaler {
            mean: vec![5000.0, 400.0, 1500.0, 25000.0, 60.0, 0.9, 0.35],
            scale: vec![1500.0, 300.0, 600.0, 8000.0, 17.0, 0.15, 0.12],
        },
        classifier: LogisticClassifier {
            classes: vec![0, 1],
            coefficients: vec![-0.2, 0.1, 0.05, 0.1, 0.05, 0.5, 0.8],
            intercept: -3.0,
            l2_c: 1.0,
            iterations: 0,
            converged: true,
        },
    }
}

fn write_fixture(dir: &Path, version: &str) {
    let model = ModelFile::new(
        &fixture_pipeline(),
        TrainingInfo {
            seed: 0,
            n_samples: 0,
            trained_at: Utc::now(),
            metrics: TrainingMetrics {
                log_loss: 0.0,
                accuracy: 0.0,
                auc: None,
                default_rate: 0.0,
            },
        },
    );
    write_artifact(dir, &model, version).unwrap();
}

#[test]
fn training_writes_model_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let run = train_into(dir.path());

    assert_eq!(run.artifact.model, dir.path().join(MODEL_FILE));
    assert!(run.artifact.model.is_file());
    assert_eq!(fs::read_to_string(dir.path().join(VERSION_FILE)).unwrap(), "1.0.0\n");
    assert_eq!(run.version, "1.0.0");
    assert_eq!(run.dataset.applicants.len(), 4000);
    assert!(run.fit.converged);

    // No staging files left behind.
    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.iter().all(|n| !n.ends_with(".tmp")), "{names:?}");
}

#[test]
fn seed_42_training_is_reproducible() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    train_into(a.path());
    train_into(b.path());

    let art_a = load_artifact(a.path()).unwrap();
    let art_b = load_artifact(b.path()).unwrap();
    assert_eq!(art_a.pipeline, art_b.pipeline);
    assert_eq!(art_a.training.metrics, art_b.training.metrics);

    let score_a = Scorer::load(a.path()).score(&record()).unwrap();
    let score_b = Scorer::load(b.path()).score(&record()).unwrap();
    assert_eq!(score_a, score_b);
    assert_eq!(score_a.model_version, "1.0.0");
}

#[test]
fn seed_42_training_pins_scores() {
    let dir = tempfile::tempdir().unwrap();
    let run = train_into(dir.path());
    assert_eq!(run.dataset.stats.n_default, 441);

    let scorer = Scorer::load(dir.path());
    let out = scorer.score(&record()).unwrap();
    assert_eq!(out.pd, 0.1065);
    assert_eq!(out.recommended_apr, 0.066);

    let at_mean = ApplicationRecord {
        income_monthly: 5000.0,
        other_debt_monthly: 400.0,
        housing_cost: 1500.0,
        principal: 25000.0,
        term_months: 60,
        ltv: 0.9,
        dti: 0.35,
        state: String::new(),
    };
    let out = scorer.score(&at_mean).unwrap();
    assert_eq!(out.pd, 0.0468);
    assert_eq!(out.recommended_apr, 0.057);
}

#[test]
fn trained_model_ranks_riskier_applicants_higher() {
    let dir = tempfile::tempdir().unwrap();
    train_into(dir.path());
    let scorer = Scorer::load(dir.path());

    let mut safe = record();
    safe.ltv = 0.6;
    safe.dti = 0.2;
    let mut risky = record();
    risky.ltv = 1.25;
    risky.dti = 1.2;

    let safe = scorer.score(&safe).unwrap();
    let risky = scorer.score(&risky).unwrap();
    assert!(risky.pd > safe.pd, "{risky:?} vs {safe:?}");
    assert!(risky.recommended_apr > safe.recommended_apr);
}

#[test]
fn fixture_artifact_pins_scores() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "9.9.9");
    let scorer = Scorer::load(dir.path());
    assert!(scorer.health().ok);

    let out = scorer.score(&record()).unwrap();
    assert_eq!(out.pd, 0.2249);
    assert_eq!(out.recommended_apr, 0.0837);
    assert_eq!(out.model_version, "9.9.9");

    // At the scaler mean only the intercept remains: sigmoid(-3).
    let at_mean = ApplicationRecord {
        income_monthly: 5000.0,
        other_debt_monthly: 400.0,
        housing_cost: 1500.0,
        principal: 25000.0,
        term_months: 60,
        ltv: 0.9,
        dti: 0.35,
        state: String::new(),
    };
    let out = scorer.score(&at_mean).unwrap();
    assert_eq!(out.pd, 0.0474);
    assert_eq!(out.recommended_apr, 0.0571);
}

#[test]
fn export_writes_training_csv() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("train.csv");
    let config = TrainConfig {
        sample_count: 500,
        out_dir: dir.path().join("model"),
        export_data: Some(csv.clone()),
        ..TrainConfig::default()
    };
    let run = run_training(&config).unwrap();

    let text = fs::read_to_string(&csv).unwrap();
    assert_eq!(text.lines().count(), 501);
    let defaults = text.lines().skip(1).filter(|l| l.ends_with(",1")).count();
    assert_eq!(defaults, run.dataset.stats.n_default);
    assert!(dir.path().join("model").join(MODEL_FILE).is_file());
}

#[test]
fn corrupt_artifact_leaves_scorer_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "2.0.0");
    fs::write(dir.path().join(MODEL_FILE), "{ not json").unwrap();

    let scorer = Scorer::load(dir.path());
    let health = scorer.health();
    assert!(!health.ok);
    assert_eq!(health.version, "2.0.0");
    assert!(matches!(
        scorer.score(&record()),
        Err(ScoreError::ModelUnavailable(_))
    ));
}

#[test]
fn invalid_training_config_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
        sample_count: 0,
        out_dir: dir.path().to_path_buf(),
        ..TrainConfig::default()
    };
    assert!(run_training(&config).is_err());
    assert!(!dir.path().join(MODEL_FILE).exists());
    assert!(!dir.path().join(VERSION_FILE).exists());
}

#[test]
fn failed_export_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainConfig {
        sample_count: 500,
        out_dir: dir.path().to_path_buf(),
        export_data: Some(dir.path().join("missing").join("train.csv")),
        ..TrainConfig::default()
    };
    assert!(run_training(&config).is_err());
    assert!(!dir.path().join(MODEL_FILE).exists());
    assert!(!dir.path().join(VERSION_FILE).exists());

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.is_empty(), "{names:?}");
}

#[test]
fn failed_export_keeps_previous_artifact() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "0.9.0");
    let before = fs::read_to_string(dir.path().join(MODEL_FILE)).unwrap();

    let config = TrainConfig {
        sample_count: 500,
        out_dir: dir.path().to_path_buf(),
        export_data: Some(dir.path().join("missing").join("train.csv")),
        ..TrainConfig::default()
    };
    assert!(run_training(&config).is_err());
    assert_eq!(fs::read_to_string(dir.path().join(MODEL_FILE)).unwrap(), before);
    assert_eq!(fs::read_to_string(dir.path().join(VERSION_FILE)).unwrap(), "0.9.0\n");
}
