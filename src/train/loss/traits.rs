//! Loss function trait

use crate::Tensor;

/// Trait for loss functions
///
/// Predictions are laid out sample-major (`[N, ...]`). Losses are computed
/// per sample and reduced to a scalar as `Σ w_i l_i / count(w_i != 0)`.
pub trait LossFn {
    /// Compute the mean loss given predictions and targets
    ///
    /// Returns a scalar loss value and sets up gradients for backpropagation
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        self.forward_weighted(predictions, targets, None)
    }

    /// Compute the loss with optional per-sample weights
    ///
    /// A weight of zero removes a sample's contribution (and gradient) but
    /// still counts it in the mean.
    fn forward_weighted(
        &self,
        predictions: &Tensor,
        targets: &Tensor,
        weights: Option<&[f32]>,
    ) -> Tensor;

    /// Name of the loss function
    fn name(&self) -> &str;
}
