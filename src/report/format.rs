//! Formatted terminal output for a training run.
//!
//! Formatting lives in one place so the fitting code stays free of
//! presentation concerns and output changes stay localized.

use crate::data::DatasetStats;
use crate::domain::{FEATURE_NAMES, TrainConfig, TrainingMetrics};
use crate::fit::FitReport;
use crate::models::Pipeline;

/// Format the run summary: dataset stats, optimizer outcome, metrics and the
/// coefficient table.
pub fn format_training_summary(
    stats: &DatasetStats,
    pipeline: &Pipeline,
    fit: &FitReport,
    metrics: &TrainingMetrics,
    config: &TrainConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== loan-score - default model training ===\n");
    out.push_str(&format!(
        "Sample: n={} | seed={} | defaults={} ({:.2}%)\n",
        stats.n,
        config.seed,
        stats.n_default,
        stats.default_rate() * 100.0
    ));
    out.push_str(&format!(
        "Means: ltv={:.4} dti={:.4} true_pd={:.4}\n",
        stats.mean_ltv, stats.mean_dti, stats.mean_true_pd
    ));

    out.push_str("\nFit:\n");
    out.push_str(&format!(
        "- L2 logistic, C={} | iterations={}/{} | converged={}\n",
        config.l2_c, fit.iterations, config.max_iter, fit.converged
    ));
    out.push_str(&format!(
        "- objective={:.6} | grad_norm={:.3e}\n",
        fit.objective, fit.grad_norm
    ));

    out.push_str("\nIn-sample metrics:\n");
    out.push_str(&format!("- log_loss : {:.6}\n", metrics.log_loss));
    out.push_str(&format!("- accuracy : {:.4}\n", metrics.accuracy));
    out.push_str(&format!(
        "- auc      : {}\n",
        metrics.auc.map(|v| format!("{v:.4}")).unwrap_or_else(|| "n/a".to_string())
    ));

    out.push_str("\nCoefficients (standardized):\n");
    out.push_str(&format_coefficients(pipeline));

    out
}

fn format_coefficients(pipeline: &Pipeline) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<20} {:>14} {:>14} {:>12}\n",
        "feature", "mean", "scale", "coef"
    ));
    out.push_str(&format!("{:-<20} {:-<14} {:-<14} {:-<12}\n", "", "", "", ""));

    let scaler = &pipeline.scaler;
    let clf = &pipeline.classifier;
    for (i, name) in FEATURE_NAMES.iter().enumerate() {
        out.push_str(&format!(
            "{:<20} {:>14.4} {:>14.4} {:>12.6}\n",
            name, scaler.mean[i], scaler.scale[i], clf.coefficients[i]
        ));
    }
    out.push_str(&format!(
        "{:<20} {:>14} {:>14} {:>12.6}\n",
        "(intercept)", "", "", clf.intercept
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogisticClassifier, StandardScaler};

    fn pipeline() -> Pipeline {
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
                iterations: 6,
                converged: true,
            },
        }
    }

    #[test]
    fn summary_lists_every_feature_in_order() {
        let stats = DatasetStats {
            n: 4000,
            n_default: 400,
            mean_ltv: 0.89,
            mean_dti: 0.5,
            mean_true_pd: 0.1,
        };
        let fit = FitReport {
            iterations: 6,
            converged: true,
            grad_norm: 1e-12,
            objective: 1234.5,
        };
        let metrics = TrainingMetrics {
            log_loss: 0.3,
            accuracy: 0.9,
            auc: None,
            default_rate: 0.1,
        };

        let text = format_training_summary(&stats, &pipeline(), &fit, &metrics, &TrainConfig::default());

        assert!(text.contains("n=4000"));
        assert!(text.contains("defaults=400 (10.00%)"));
        assert!(text.contains("converged=true"));
        assert!(text.contains("auc      : n/a"));

        let positions: Vec<usize> = FEATURE_NAMES
            .iter()
            .map(|name| text.find(&format!("\n{name} ")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("(intercept)"));
        assert!(text.contains("-3.000000"));
    }
}
