//! Per-sample weighted reduction shared by the loss functions

use crate::autograd::{BackwardOp, GradCell};
use crate::Tensor;
use ndarray::Array1;
use std::rc::Rc;

/// Number of samples in a sample-major tensor
pub(crate) fn sample_count(predictions: &Tensor) -> usize {
    predictions.shape().first().copied().unwrap_or(0)
}

/// Reduce per-sample losses to `Σ w_i l_i / count(w_i != 0)` and record the backward op
///
/// Without weights this is the plain mean. Zero-weight samples drop out of the
/// denominator as well as the numerator; an all-zero weight vector yields 0.
///
/// `grad` holds `∂l_i/∂pred` for every prediction element, sample-major, with
/// `predictions.len() / losses.len()` elements per sample.
pub(crate) fn weighted_mean(
    predictions: &Tensor,
    losses: &[f32],
    mut grad: Array1<f32>,
    weights: Option<&[f32]>,
) -> Tensor {
    let n = losses.len();
    if let Some(w) = weights {
        assert_eq!(w.len(), n, "expected {n} sample weights, got {}", w.len());
    }
    let weight = |i: usize| weights.map_or(1.0, |w| w[i]);

    let counted = weights.map_or(n, |w| w.iter().filter(|&&w| w != 0.0).count());
    let denom = counted.max(1) as f32;
    let total: f32 = losses.iter().enumerate().map(|(i, l)| weight(i) * l).sum::<f32>() / denom;

    if n > 0 {
        let per_sample = grad.len() / n;
        for (i, mut chunk) in grad.exact_chunks_mut(per_sample.max(1)).into_iter().enumerate() {
            chunk *= weight(i) / denom;
        }
    }

    let requires_grad = predictions.requires_grad();
    let mut loss = Tensor::from_vec(vec![total], requires_grad);

    if requires_grad {
        loss.set_backward_op(Rc::new(LossBackward {
            predictions: predictions.clone(),
            grad,
            result_grad: loss.grad_cell(),
        }));
    }

    loss
}

struct LossBackward {
    predictions: Tensor,
    grad: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for LossBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            self.predictions.accumulate_grad(&self.grad * grad[0]);
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.predictions.clone()]
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::autograd::backward;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    #[test]
    fn test_unweighted_mean() {
        let pred = Tensor::from_vec(vec![0.0, 0.0], true);
        let mut loss = weighted_mean(&pred, &[1.0, 3.0], arr1(&[1.0, 1.0]), None);
        assert_relative_eq!(loss.data()[0], 2.0);

        backward(&mut loss, None);
        assert_eq!(pred.grad().unwrap().to_vec(), vec![0.5, 0.5]);
    }

    #[test]
    fn test_weights_scale_loss_and_gradient() {
        // Weights [2, 1] over two samples: (2*1 + 1*3) / 2
        let pred = Tensor::from_shape(vec![0.0; 4], &[2, 2], true);
        let mut loss =
            weighted_mean(&pred, &[1.0, 3.0], arr1(&[1.0, 1.0, 1.0, 1.0]), Some(&[2.0, 1.0]));
        assert_relative_eq!(loss.data()[0], 2.5);

        backward(&mut loss, None);
        assert_eq!(pred.grad().unwrap().to_vec(), vec![1.0, 1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_zero_weights_leave_the_denominator() {
        // Weights [2, 0, 0, 0]: only the first sample counts, (2*1) / 1
        let pred = Tensor::from_vec(vec![0.0; 4], true);
        let mut loss = weighted_mean(
            &pred,
            &[1.0, 3.0, 5.0, 7.0],
            arr1(&[1.0; 4]),
            Some(&[2.0, 0.0, 0.0, 0.0]),
        );
        assert_relative_eq!(loss.data()[0], 2.0);

        backward(&mut loss, None);
        assert_eq!(pred.grad().unwrap().to_vec(), vec![2.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_all_zero_weights_is_zero() {
        let pred = Tensor::from_vec(vec![0.0, 0.0], true);
        let loss = weighted_mean(&pred, &[1.0, 3.0], arr1(&[1.0, 1.0]), Some(&[0.0, 0.0]));
        assert_eq!(loss.data()[0], 0.0);
    }

    #[test]
    fn test_empty_batch_is_zero() {
        let pred = Tensor::from_shape(vec![], &[0, 1], true);
        let loss = weighted_mean(&pred, &[], Array1::zeros(0), None);
        assert_eq!(loss.data()[0], 0.0);
    }

    #[test]
    #[should_panic(expected = "sample weights")]
    fn test_weight_count_mismatch_panics() {
        let pred = Tensor::from_vec(vec![0.0, 0.0], true);
        let _ = weighted_mean(&pred, &[1.0, 1.0], arr1(&[1.0, 1.0]), Some(&[1.0]));
    }
}
