//! Cross Entropy Loss for classification

use crate::Tensor;
use ndarray::Array1;

use super::weighted::{sample_count, weighted_mean};
use super::LossFn;

/// Sparse categorical cross entropy on logits
///
/// Predictions are `[N, C]` logits, targets are `N` class indices stored as
/// `f32`. Per sample: `l_i = logsumexp(x_i) - x_i[t_i]`.
///
/// # Example
///
/// ```
/// use acgan::train::{CrossEntropyLoss, LossFn};
/// use acgan::Tensor;
///
/// let loss_fn = CrossEntropyLoss;
/// let logits = Tensor::from_shape(vec![2.0, 1.0, 0.5, 3.0], &[2, 2], true);
/// let targets = Tensor::from_vec(vec![0.0, 1.0], false);
///
/// let loss = loss_fn.forward(&logits, &targets);
/// assert!(loss.data()[0] > 0.0);
/// ```
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Compute softmax: exp(x_i) / sum(exp(x_j))
    pub(crate) fn softmax(x: &[f32]) -> Array1<f32> {
        let max = x.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let exp_x: Array1<f32> = x.iter().map(|v| (v - max).exp()).collect();
        let sum: f32 = exp_x.sum();
        exp_x / sum
    }
}

impl LossFn for CrossEntropyLoss {
    fn forward_weighted(
        &self,
        predictions: &Tensor,
        targets: &Tensor,
        weights: Option<&[f32]>,
    ) -> Tensor {
        let n = sample_count(predictions);
        assert_eq!(targets.len(), n, "Predictions and targets must have same number of samples");
        let classes = if n == 0 { 1 } else { predictions.len() / n };

        let mut losses = Vec::with_capacity(n);
        let mut grad = Array1::zeros(predictions.len());

        for (i, (row, &target)) in
            predictions.as_slice().chunks(classes).zip(targets.data().iter()).enumerate()
        {
            let class = target as usize;
            assert!(class < classes, "class index {class} out of range for {classes} classes");

            let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            let log_sum_exp = max + row.iter().map(|v| (v - max).exp()).sum::<f32>().ln();
            losses.push(log_sum_exp - row[class]);

            let probs = Self::softmax(row);

            // d(CE)/d(logits) = probs - onehot
            for (c, p) in probs.iter().enumerate() {
                grad[i * classes + c] = p - if c == class { 1.0 } else { 0.0 };
            }
        }

        weighted_mean(predictions, &losses, grad, weights)
    }

    fn name(&self) -> &'static str {
        "CrossEntropy"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::autograd::backward;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_logits() {
        let logits = Tensor::from_shape(vec![0.0; 6], &[2, 3], true);
        let targets = Tensor::from_vec(vec![0.0, 2.0], false);

        let loss = CrossEntropyLoss.forward(&logits, &targets);
        assert_relative_eq!(loss.data()[0], 3.0_f32.ln(), epsilon = 1e-5);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = CrossEntropyLoss::softmax(&[1000.0, 1001.0, 1002.0]);
        assert_relative_eq!(probs.sum(), 1.0, epsilon = 1e-5);
        assert!(probs.iter().all(|p| p.is_finite() && *p >= 0.0));
    }

    #[test]
    fn test_gradient_is_probs_minus_onehot() {
        let logits = Tensor::from_shape(vec![2.0, 1.0, 0.5, 0.0, 0.0, 0.0], &[2, 3], true);
        let targets = Tensor::from_vec(vec![0.0, 1.0], false);

        let mut loss = CrossEntropyLoss.forward(&logits, &targets);
        backward(&mut loss, None);

        let grad = logits.grad().unwrap();
        let probs = CrossEntropyLoss::softmax(&[2.0, 1.0, 0.5]);
        assert_relative_eq!(grad[0], (probs[0] - 1.0) / 2.0, epsilon = 1e-6);
        assert_relative_eq!(grad[1], probs[1] / 2.0, epsilon = 1e-6);
        assert_relative_eq!(grad[4], (1.0 / 3.0 - 1.0) / 2.0, epsilon = 1e-6);
        // Each row of the gradient sums to zero
        assert_relative_eq!(grad.iter().take(3).sum::<f32>(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_confident_mistake_is_not_clamped() {
        let logits = Tensor::from_shape(vec![0.0, 200.0], &[1, 2], true);
        let targets = Tensor::from_vec(vec![0.0], false);

        let mut loss = CrossEntropyLoss.forward(&logits, &targets);
        assert_relative_eq!(loss.data()[0], 200.0, epsilon = 1e-3);

        backward(&mut loss, None);
        let grad = logits.grad().unwrap();
        assert_relative_eq!(grad[0], -1.0, epsilon = 1e-6);
        assert_relative_eq!(grad[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_weight_removes_sample() {
        let logits = Tensor::from_shape(vec![5.0, -5.0, 5.0, -5.0], &[2, 2], true);
        let targets = Tensor::from_vec(vec![0.0, 1.0], false);

        let mut loss = CrossEntropyLoss.forward_weighted(&logits, &targets, Some(&[2.0, 0.0]));
        backward(&mut loss, None);

        let grad = logits.grad().unwrap();
        assert_eq!(grad[2], 0.0);
        assert_eq!(grad[3], 0.0);
        assert!(loss.data()[0] < 0.01);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_invalid_class_panics() {
        let logits = Tensor::from_shape(vec![0.0; 2], &[1, 2], true);
        let targets = Tensor::from_vec(vec![2.0], false);
        CrossEntropyLoss.forward(&logits, &targets);
    }

    #[test]
    fn test_cross_entropy_no_grad() {
        let pred = Tensor::from_shape(vec![2.0, 1.0], &[1, 2], false);
        let target = Tensor::from_vec(vec![1.0], false);
        let loss = CrossEntropyLoss.forward(&pred, &target);
        assert!(loss.data()[0] > 0.0);
        assert!(loss.backward_op().is_none());
    }
}
