//! Metrics records produced by a training run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Scalar validation metrics for one run.
///
/// Serializes to `{"loss": ..., "error rate": ...}`, the exact shape of
/// the persisted metrics file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValidationMetrics {
    /// Average cross-entropy loss over the validation set
    pub loss: f64,
    /// Fraction of validation samples misclassified
    #[serde(rename = "error rate")]
    pub error_rate: f64,
}

impl ValidationMetrics {
    pub fn new(loss: f64, error_rate: f64) -> Self {
        Self { loss, error_rate }
    }

    /// Accuracy, the complement of the error rate.
    pub fn accuracy(&self) -> f64 {
        1.0 - self.error_rate
    }
}

/// Square count table where entry `(i, j)` is the number of samples of
/// true class `i` predicted as class `j`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Creates an empty matrix for `num_classes` classes.
    pub fn new(num_classes: usize) -> Self {
        Self {
            counts: vec![vec![0; num_classes]; num_classes],
        }
    }

    /// Builds a matrix from paired prediction and ground-truth labels.
    pub fn from_predictions(
        predictions: &[usize],
        ground_truth: &[usize],
        num_classes: usize,
    ) -> Result<Self> {
        if predictions.len() != ground_truth.len() {
            return Err(Error::InvalidArgument(format!(
                "predictions ({}) and ground truth ({}) differ in length",
                predictions.len(),
                ground_truth.len()
            )));
        }

        let mut matrix = Self::new(num_classes);
        for (&predicted, &actual) in predictions.iter().zip(ground_truth.iter()) {
            matrix.record(actual, predicted)?;
        }
        Ok(matrix)
    }

    /// Builds a matrix from pre-computed counts, checking squareness.
    pub fn from_counts(counts: Vec<Vec<usize>>) -> Result<Self> {
        let dim = counts.len();
        if counts.iter().any(|row| row.len() != dim) {
            return Err(Error::InvalidArgument(
                "confusion matrix must be square".to_string(),
            ));
        }
        Ok(Self { counts })
    }

    /// Records one prediction.
    pub fn record(&mut self, actual: usize, predicted: usize) -> Result<()> {
        let dim = self.dim();
        if actual >= dim || predicted >= dim {
            return Err(Error::InvalidArgument(format!(
                "label out of range: actual={actual}, predicted={predicted}, classes={dim}"
            )));
        }
        self.counts[actual][predicted] += 1;
        Ok(())
    }

    /// Number of classes (matrix dimension).
    pub fn dim(&self) -> usize {
        self.counts.len()
    }

    /// Raw counts, row = true class, column = predicted class.
    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Total number of recorded samples.
    pub fn num_samples(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Fraction of samples on the diagonal.
    pub fn accuracy(&self) -> f64 {
        let total = self.num_samples();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.dim()).map(|i| self.counts[i][i]).sum();
        correct as f64 / total as f64
    }

    /// Fraction of samples off the diagonal.
    pub fn error_rate(&self) -> f64 {
        if self.num_samples() == 0 {
            return 0.0;
        }
        1.0 - self.accuracy()
    }
}
