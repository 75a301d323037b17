//! Command-line parsing for the loan default scorer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "loan-score",
    version,
    about = "Synthetic loan default model: train, serve, score, evaluate"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate synthetic applicants, fit the model, and write the artifact.
    Train(TrainArgs),
    /// Load the artifact once and serve `/health` and `/score` over HTTP.
    Serve(ServeArgs),
    /// Score one application record read from a JSON file.
    Score(ScoreArgs),
    /// Evaluate one vehicle loan request (approval and lender offers).
    Evaluate(EvaluateArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct TrainArgs {
    /// Random seed for synthetic data generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of synthetic applicants to generate.
    #[arg(short = 'n', long = "samples", default_value_t = 4000)]
    pub samples: usize,

    /// Newton iteration cap for the logistic fit.
    #[arg(long, default_value_t = 200)]
    pub max_iter: usize,

    /// Inverse L2 regularization strength.
    #[arg(long = "c", default_value_t = 1.0)]
    pub c: f64,

    /// Directory that receives `model.json` and `VERSION`.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Version string written to `VERSION`.
    #[arg(long, default_value = "1.0.0")]
    pub model_version: String,

    /// Also write the synthetic training set to this CSV file.
    #[arg(long)]
    pub export_data: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// Listen address.
    #[arg(long, env = "LOAN_SCORE_BIND", default_value = "127.0.0.1:8000")]
    pub bind: String,

    /// Directory holding `model.json` and `VERSION`.
    #[arg(long, env = "LOAN_SCORE_MODEL_DIR", default_value = ".")]
    pub model_dir: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct ScoreArgs {
    /// JSON file with one application record.
    #[arg(long, value_name = "JSON")]
    pub input: PathBuf,

    /// Directory holding `model.json` and `VERSION` (local scoring).
    #[arg(long, env = "LOAN_SCORE_MODEL_DIR", default_value = ".")]
    pub model_dir: PathBuf,

    /// Score against a running server instead of the local artifact.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct EvaluateArgs {
    /// JSON file with one loan request.
    #[arg(long, value_name = "JSON")]
    pub input: PathBuf,

    /// Evaluate on a running server instead of locally.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}
