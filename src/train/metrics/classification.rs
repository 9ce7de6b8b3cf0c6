//! Classification metrics: Accuracy

use crate::Tensor;

use super::Metric;

/// Index of the largest value in each row of a `[N, C]` buffer
pub(crate) fn argmax_rows(values: &[f32], classes: usize) -> Vec<usize> {
    values
        .chunks(classes.max(1))
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
                .0
        })
        .collect()
}

/// Accuracy metric for classification
///
/// - Binary: predictions and targets have the same length; predictions are
///   thresholded and targets are read as labels at 0.5.
/// - Multi-class: predictions are `[N, C]` scores and targets are `N` class
///   indices; the prediction is the argmax of each row.
///
/// # Example
///
/// ```
/// use acgan::train::{Accuracy, Metric};
/// use acgan::Tensor;
///
/// let metric = Accuracy::new(0.5);
/// let pred = Tensor::from_shape(vec![0.1, 0.9, 0.8, 0.2, 0.3, 0.7], &[3, 2], false);
/// let target = Tensor::from_vec(vec![1.0, 0.0, 0.0], false);
///
/// let acc = metric.compute(&pred, &target);
/// assert!((acc - 2.0 / 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Accuracy {
    /// Threshold for binary classification
    pub(crate) threshold: f32,
}

impl Accuracy {
    /// Create new accuracy metric with given threshold for binary classification
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl Metric for Accuracy {
    fn compute(&self, predictions: &Tensor, targets: &Tensor) -> f32 {
        if targets.is_empty() {
            return 0.0;
        }

        let (y_pred, y_true): (Vec<usize>, Vec<usize>) = if predictions.len() == targets.len() {
            (
                predictions.data().iter().map(|&p| usize::from(p >= self.threshold)).collect(),
                targets.data().iter().map(|&t| usize::from(t >= 0.5)).collect(),
            )
        } else {
            assert_eq!(
                predictions.len() % targets.len(),
                0,
                "Predictions must hold the same number of scores for every target"
            );
            (
                argmax_rows(predictions.as_slice(), predictions.len() / targets.len()),
                targets.data().iter().map(|&t| t.round() as usize).collect(),
            )
        };

        let correct = y_pred.iter().zip(&y_true).filter(|(p, t)| p == t).count();
        correct as f32 / targets.len() as f32
    }

    fn name(&self) -> &'static str {
        "Accuracy"
    }
}
