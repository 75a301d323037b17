//! The fitted two-stage pipeline: standardization, then a logistic classifier.
//!
//! Both stages are plain data (serializable) with pure evaluation methods, so a
//! loaded pipeline can be shared across threads behind an `Arc` without locks.

use serde::{Deserialize, Serialize};

use crate::domain::{FEATURE_COUNT, FeatureVector};
use crate::math::sigmoid;

/// Label of the positive ("default") class.
pub const POSITIVE_CLASS: u8 = 1;
/// Label of the negative ("no default") class.
pub const NEGATIVE_CLASS: u8 = 0;

/// Below this standard deviation a column is treated as constant.
const MIN_SCALE: f64 = 1e-12;

/// Zero-mean / unit-variance standardizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    /// Population standard deviation per column (1.0 for constant columns).
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit per-column mean and population standard deviation.
    ///
    /// Returns `None` for an empty input.
    pub fn fit(rows: &[FeatureVector]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let n = rows.len() as f64;

        let mut mean = vec![0.0; FEATURE_COUNT];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row.as_slice()) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = vec![0.0; FEATURE_COUNT];
        for row in rows {
            for ((v, x), m) in var.iter_mut().zip(row.as_slice()).zip(&mean) {
                let d = x - m;
                *v += d * d;
            }
        }
        let scale = var
            .into_iter()
            .map(|v| {
                let sd = (v / n).sqrt();
                if sd < MIN_SCALE { 1.0 } else { sd }
            })
            .collect();

        Some(Self { mean, scale })
    }

    /// Standardize one row.
    pub fn transform(&self, row: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut out = row.to_array();
        for ((x, m), s) in out.iter_mut().zip(&self.mean).zip(&self.scale) {
            *x = (*x - m) / s;
        }
        out
    }
}

/// Binary logistic classifier over standardized inputs.
///
/// `coefficients` and `intercept` give the log-odds of [`POSITIVE_CLASS`].
/// `classes` lists the label of each column of [`predict_proba`](Self::predict_proba).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub classes: Vec<u8>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Inverse L2 strength the model was fitted with.
    pub l2_c: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl LogisticClassifier {
    /// Log-odds of the positive class.
    pub fn decision_function(&self, z: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(z)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    /// Class probabilities, one per entry of `classes`, in the same order.
    pub fn predict_proba(&self, z: &[f64]) -> Vec<f64> {
        let p = sigmoid(self.decision_function(z));
        self.classes
            .iter()
            .map(|&c| if c == POSITIVE_CLASS { p } else { 1.0 - p })
            .collect()
    }

    /// Column of `predict_proba` holding the positive class, if present.
    pub fn positive_class_index(&self) -> Option<usize> {
        self.classes.iter().position(|&c| c == POSITIVE_CLASS)
    }
}

/// Standardizer + classifier, applied in that order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub scaler: StandardScaler,
    pub classifier: LogisticClassifier,
}

impl Pipeline {
    pub fn predict_proba(&self, row: &FeatureVector) -> Vec<f64> {
        let z = self.scaler.transform(row);
        self.classifier.predict_proba(&z)
    }

    /// Probability of the positive class for one row.
    ///
    /// Reads the column whose label is [`POSITIVE_CLASS`] rather than assuming
    /// a column position. `None` if the classifier has no positive class.
    pub fn predict_default(&self, row: &FeatureVector) -> Option<f64> {
        let idx = self.classifier.positive_class_index()?;
        self.predict_proba(row).get(idx).copied()
    }
}
