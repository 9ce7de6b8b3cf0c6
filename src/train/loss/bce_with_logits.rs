//! Binary Cross-Entropy with Logits Loss
//!
//! Combines a sigmoid activation with binary cross-entropy loss. Used for the
//! real/fake head of the discriminator, whose targets may be smoothed
//! (e.g. 0.95 instead of 1.0).
//!
//! # Formula
//!
//! Numerically stable computation:
//! ```text
//! L_i = max(x_i, 0) - x_i * t_i + log(1 + exp(-|x_i|))
//! ```
//!
//! Gradient: `∂L/∂x_i = σ(x_i) - t_i`

use crate::autograd::sigmoid_scalar;
use crate::Tensor;
use ndarray::Array1;

use super::weighted::{sample_count, weighted_mean};
use super::LossFn;

/// Binary Cross-Entropy with Logits Loss.
///
/// Predictions are `[N]` or `[N, units]` logits and targets hold one value
/// per logit. A sample's loss is the mean over its units.
///
/// # Example
///
/// ```
/// use acgan::train::{BCEWithLogitsLoss, LossFn};
/// use acgan::Tensor;
///
/// let loss_fn = BCEWithLogitsLoss;
/// let logits = Tensor::from_vec(vec![2.0, -1.0, 0.5], true);
/// let targets = Tensor::from_vec(vec![0.95, 0.0, 0.95], false);
///
/// let loss = loss_fn.forward(&logits, &targets);
/// assert!(loss.data()[0] > 0.0);
/// ```
pub struct BCEWithLogitsLoss;

impl BCEWithLogitsLoss {
    /// Numerically stable BCE: max(x, 0) - x*t + log(1 + exp(-|x|))
    fn stable_bce(logit: f32, target: f32) -> f32 {
        let relu = logit.max(0.0);
        let abs_x = logit.abs();
        relu - logit * target + (-abs_x).exp().ln_1p()
    }
}

impl LossFn for BCEWithLogitsLoss {
    fn forward_weighted(
        &self,
        predictions: &Tensor,
        targets: &Tensor,
        weights: Option<&[f32]>,
    ) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );

        let n = sample_count(predictions);
        let units = if n == 0 { 1 } else { predictions.len() / n };

        let losses: Vec<f32> = predictions
            .as_slice()
            .chunks(units)
            .zip(targets.as_slice().chunks(units))
            .map(|(x, t)| {
                x.iter().zip(t).map(|(&x, &t)| Self::stable_bce(x, t)).sum::<f32>() / units as f32
            })
            .collect();

        // ∂l_i/∂x = (σ(x) - t) / units
        let grad: Array1<f32> = predictions
            .data()
            .iter()
            .zip(targets.data().iter())
            .map(|(&x, &t)| (sigmoid_scalar(x) - t) / units as f32)
            .collect();

        weighted_mean(predictions, &losses, grad, weights)
    }

    fn name(&self) -> &'static str {
        "BCEWithLogits"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::autograd::backward;
    use approx::assert_relative_eq;

    #[test]
    fn test_bce_perfect_prediction() {
        let logits = Tensor::from_vec(vec![100.0, -100.0, 100.0, -100.0, 100.0], true);
        let targets = Tensor::from_vec(vec![1.0, 0.0, 1.0, 0.0, 1.0], false);

        let loss = BCEWithLogitsLoss.forward(&logits, &targets);
        assert!(loss.data()[0] < 0.01, "Perfect prediction should have near-zero loss");
    }

    #[test]
    fn test_bce_wrong_prediction() {
        let logits = Tensor::from_vec(vec![-100.0, 100.0, -100.0], true);
        let targets = Tensor::from_vec(vec![1.0, 0.0, 1.0], false);

        let loss = BCEWithLogitsLoss.forward(&logits, &targets);
        assert!(loss.data()[0] > 10.0, "Wrong prediction should have high loss");
    }

    #[test]
    fn test_bce_at_zero_logit_is_ln2() {
        let logits = Tensor::from_vec(vec![0.0; 5], true);
        for target in [0.0, 1.0] {
            let targets = Tensor::from_vec(vec![target; 5], false);
            let loss = BCEWithLogitsLoss.forward(&logits, &targets);
            assert_relative_eq!(loss.data()[0], 2.0_f32.ln(), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_bce_gradient_at_zero() {
        let logits = Tensor::from_vec(vec![0.0], true);
        let targets = Tensor::from_vec(vec![1.0], false);

        let mut loss = BCEWithLogitsLoss.forward(&logits, &targets);
        backward(&mut loss, None);

        // ∂L/∂x = (σ(0) - 1) / 1 = -0.5
        assert_relative_eq!(logits.grad().unwrap()[0], -0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_bce_soft_target_minimum() {
        // Loss against a smoothed target is minimal (zero gradient) at σ(x) = t
        let t = 0.95_f32;
        let logit = (t / (1.0 - t)).ln();
        let logits = Tensor::from_vec(vec![logit], true);
        let mut loss = BCEWithLogitsLoss.forward(&logits, &Tensor::from_vec(vec![t], false));
        backward(&mut loss, None);
        assert!(logits.grad().unwrap()[0].abs() < 1e-5);
    }

    #[test]
    fn test_bce_numerical_stability() {
        let logits = Tensor::from_vec(vec![1000.0, -1000.0, 500.0, -500.0], true);
        let targets = Tensor::from_vec(vec![1.0, 0.0, 1.0, 0.0], false);

        let loss = BCEWithLogitsLoss.forward(&logits, &targets);
        assert!(loss.data()[0].is_finite());
        assert!(loss.data()[0] < 0.01);
    }

    #[test]
    fn test_bce_sample_weights() {
        let logits = Tensor::from_shape(vec![0.0, 3.0], &[2, 1], true);
        let targets = Tensor::from_vec(vec![1.0, 0.0], false);

        let full = BCEWithLogitsLoss.forward(&logits, &targets).data()[0];
        let first_only =
            BCEWithLogitsLoss.forward_weighted(&logits, &targets, Some(&[1.0, 0.0])).data()[0];

        assert_relative_eq!(first_only, 2.0_f32.ln(), epsilon = 1e-5);
        assert!(full > first_only);
    }

    #[test]
    fn test_stable_bce_formula() {
        let logit = 1.5f32;
        let target = 0.7f32;

        let stable = BCEWithLogitsLoss::stable_bce(logit, target);

        // Naive: -[t * log(σ(x)) + (1-t) * log(1 - σ(x))]
        let sigma = 1.0 / (1.0 + (-logit).exp());
        let naive = -(target * sigma.ln() + (1.0 - target) * (1.0 - sigma).ln());

        assert_relative_eq!(stable, naive, epsilon = 1e-5);
    }

    #[test]
    #[should_panic(expected = "must have same length")]
    fn test_bce_mismatched_lengths() {
        let pred = Tensor::from_vec(vec![1.0, 2.0], true);
        let target = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);
        BCEWithLogitsLoss.forward(&pred, &target);
    }

    #[test]
    fn test_bce_name() {
        assert_eq!(BCEWithLogitsLoss.name(), "BCEWithLogits");
    }
}
