//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - runs training, the HTTP server, a one-off score, or a loan evaluation

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{Command, EvaluateArgs, ScoreArgs, ServeArgs, TrainArgs};
use crate::client::ScoreClient;
use crate::domain::{ServeConfig, TrainConfig};
use crate::error::{AppError, EXIT_UNAVAILABLE, EXIT_USAGE};
use crate::offers::evaluate_loan;
use crate::scoring::Scorer;

pub mod pipeline;

/// Entry point for the `loan-score` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    // `loan-score` with no subcommand trains, like `loan-score train`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Train(args) => handle_train(args),
        Command::Serve(args) => handle_serve(args),
        Command::Score(args) => handle_score(args),
        Command::Evaluate(args) => handle_evaluate(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so stdout stays clean for summaries and JSON.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = train_config_from_args(&args);
    let run = pipeline::run_training(&config)?;

    println!(
        "{}",
        crate::report::format_training_summary(
            &run.dataset.stats,
            &run.pipeline,
            &run.fit,
            &run.metrics,
            &config,
        )
    );
    println!(
        "Trained model -> {} (v{})",
        run.artifact.model.display(),
        run.version
    );
    Ok(())
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    let config = serve_config_from_args(&args);
    let scorer = Arc::new(Scorer::load(&config.model_dir));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| AppError::new(EXIT_UNAVAILABLE, format!("Failed to start async runtime: {e}")))?;

    runtime.block_on(crate::server::serve(&config, scorer))
}

fn handle_score(args: ScoreArgs) -> Result<(), AppError> {
    let record = read_json(&args.input, "application")?;

    let result = match &args.url {
        Some(url) => ScoreClient::new(url.as_str()).score(&record)?,
        None => {
            let scorer = Scorer::load(&args.model_dir);
            scorer.score(&record)?
        }
    };

    print_json(&result)
}

fn handle_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let request = read_json(&args.input, "loan request")?;

    let result = match &args.url {
        Some(url) => ScoreClient::new(url.as_str()).evaluate(&request)?,
        None => evaluate_loan(&request)?,
    };

    print_json(&result)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to encode result: {e}")))?;
    println!("{json}");
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_USAGE,
            format!("Failed to open input '{}': {e}", path.display()),
        )
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        AppError::new(
            EXIT_USAGE,
            format!("Invalid {what} JSON '{}': {e}", path.display()),
        )
    })
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        seed: args.seed,
        sample_count: args.samples,
        max_iter: args.max_iter,
        l2_c: args.c,
        out_dir: args.out_dir.clone(),
        model_version: args.model_version.clone(),
        export_data: args.export_data.clone(),
        ..TrainConfig::default()
    }
}

pub fn serve_config_from_args(args: &ServeArgs) -> ServeConfig {
    ServeConfig {
        bind: args.bind.clone(),
        model_dir: args.model_dir.clone(),
    }
}

/// Rewrite argv so `loan-score` defaults to `loan-score train`.
///
/// Rules:
/// - `loan-score`                      -> `loan-score train`
/// - `loan-score --seed 7 ...`         -> `loan-score train --seed 7 ...`
/// - `loan-score --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("train".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "train" | "serve" | "score" | "evaluate");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "train flags".
    if arg1.starts_with('-') {
        argv.insert(1, "train".to_string());
        return argv;
    }

    argv
}
