//! Batch normalization over channels

use crate::autograd::{batch_norm, batch_norm_inference, BatchStats, Context};
use crate::{Result, Tensor};
use ndarray::Array1;
use std::collections::HashMap;

use super::load_into;

/// Batch normalization for `[N, C, H, W]` activations
///
/// Training mode normalizes with batch statistics and folds them into the
/// moving averages: `moving = momentum * moving + (1 - momentum) * batch`.
/// The moving variance tracks the unbiased batch variance. Inference mode
/// normalizes with the moving averages.
pub struct BatchNorm2d {
    /// Scale (channels)
    pub gamma: Tensor,
    /// Shift (channels)
    pub beta: Tensor,
    /// Moving mean (channels, not trained)
    pub moving_mean: Tensor,
    /// Moving variance (channels, not trained)
    pub moving_var: Tensor,
    momentum: f32,
    epsilon: f32,
}

impl BatchNorm2d {
    pub const DEFAULT_MOMENTUM: f32 = 0.99;
    pub const DEFAULT_EPSILON: f32 = 1e-3;

    pub fn new(channels: usize) -> Self {
        Self::with_params(channels, Self::DEFAULT_MOMENTUM, Self::DEFAULT_EPSILON)
    }

    pub fn with_params(channels: usize, momentum: f32, epsilon: f32) -> Self {
        Self {
            gamma: Tensor::full(&[channels], 1.0, true),
            beta: Tensor::zeros(&[channels], true),
            moving_mean: Tensor::zeros(&[channels], false),
            moving_var: Tensor::full(&[channels], 1.0, false),
            momentum,
            epsilon,
        }
    }

    pub fn channels(&self) -> usize {
        self.gamma.len()
    }

    pub fn forward(&mut self, x: &Tensor, ctx: &Context) -> Tensor {
        if !ctx.is_training() {
            return batch_norm_inference(x, &self.gamma, &self.beta, &self.moving_stats(), self.epsilon);
        }

        let (y, stats) = batch_norm(x, &self.gamma, &self.beta, self.epsilon);

        let count = x.len() / self.channels().max(1);
        let correction = if count > 1 { count as f32 / (count - 1) as f32 } else { 1.0 };
        let m = self.momentum;
        self.moving_mean.data_mut().zip_mut_with(&stats.mean, |avg, &b| *avg = m * *avg + (1.0 - m) * b);
        self.moving_var
            .data_mut()
            .zip_mut_with(&stats.var, |avg, &b| *avg = m * *avg + (1.0 - m) * b * correction);

        y
    }

    fn moving_stats(&self) -> BatchStats {
        BatchStats {
            mean: Array1::from(self.moving_mean.as_slice().to_vec()),
            var: Array1::from(self.moving_var.as_slice().to_vec()),
        }
    }

    /// Trainable parameters (gamma, beta)
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.gamma, &mut self.beta]
    }

    pub fn named_tensors(&self, prefix: &str) -> Vec<(String, Tensor)> {
        vec![
            (format!("{prefix}.gamma"), self.gamma.clone()),
            (format!("{prefix}.beta"), self.beta.clone()),
            (format!("{prefix}.moving_mean"), self.moving_mean.clone()),
            (format!("{prefix}.moving_variance"), self.moving_var.clone()),
        ]
    }

    pub fn load_tensors(&mut self, tensors: &HashMap<String, Tensor>, prefix: &str) -> Result<()> {
        load_into(&mut self.gamma, tensors, &format!("{prefix}.gamma"))?;
        load_into(&mut self.beta, tensors, &format!("{prefix}.beta"))?;
        load_into(&mut self.moving_mean, tensors, &format!("{prefix}.moving_mean"))?;
        load_into(&mut self.moving_var, tensors, &format!("{prefix}.moving_variance"))
    }
}
