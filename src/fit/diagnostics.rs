//! In-sample diagnostics for a fitted pipeline.
//!
//! These are reported after training and stored alongside the model; they are
//! not used to select or reject a model.

use rayon::prelude::*;

use crate::domain::{LabeledApplicant, TrainingMetrics};
use crate::math::nll;
use crate::models::Pipeline;

/// Log-loss, accuracy at the 0.5 threshold, ROC AUC and observed default rate.
pub fn compute_metrics(pipeline: &Pipeline, applicants: &[LabeledApplicant]) -> TrainingMetrics {
    let n = applicants.len();
    if n == 0 {
        return TrainingMetrics {
            log_loss: 0.0,
            accuracy: 0.0,
            auc: None,
            default_rate: 0.0,
        };
    }

    // Positive-class logit per row, in row order.
    let logits: Vec<f64> = applicants
        .par_iter()
        .map(|a| {
            let z = pipeline.scaler.transform(&a.features);
            pipeline.classifier.decision_function(&z)
        })
        .collect();
    let labels: Vec<bool> = applicants.iter().map(|a| a.default).collect();

    let nf = n as f64;
    let log_loss = logits
        .iter()
        .zip(&labels)
        .map(|(&z, &y)| nll(z, y))
        .sum::<f64>()
        / nf;
    let correct = logits
        .iter()
        .zip(&labels)
        .filter(|(z, y)| (**z > 0.0) == **y)
        .count();
    let n_default = labels.iter().filter(|y| **y).count();

    TrainingMetrics {
        log_loss,
        accuracy: correct as f64 / nf,
        auc: roc_auc(&logits, &labels),
        default_rate: n_default as f64 / nf,
    }
}

/// Area under the ROC curve via the rank-sum statistic.
///
/// Tied scores share their average rank. `None` unless both classes occur.
pub fn roc_auc(scores: &[f64], labels: &[bool]) -> Option<f64> {
    let n_pos = labels.iter().filter(|y| **y).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1 ..= j+1 share their mean.
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            if labels[k] {
                rank_sum_pos += avg_rank;
            }
        }
        i = j + 1;
    }

    let (p, q) = (n_pos as f64, n_neg as f64);
    Some((rank_sum_pos - p * (p + 1.0) / 2.0) / (p * q))
}
