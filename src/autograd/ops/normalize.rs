//! Normalization autograd operations: batch_norm

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Per-channel statistics of one batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    pub mean: Array1<f32>,
    /// Biased variance
    pub var: Array1<f32>,
}

/// `(batch, channels, spatial)` of a `[N, C, ...]` tensor
fn channel_layout(x: &Tensor) -> (usize, usize, usize) {
    let shape = x.shape();
    assert!(shape.len() >= 2, "batch_norm expects [N, C, ...], got {shape:?}");
    (shape[0], shape[1], shape[2..].iter().product())
}

/// Batch normalization over every axis except the channel axis
///
/// BatchNorm(x) = gamma * (x - mean) / sqrt(var + epsilon) + beta
///
/// Uses the statistics of this batch and returns them so the caller can
/// update its moving averages.
pub fn batch_norm(x: &Tensor, gamma: &Tensor, beta: &Tensor, epsilon: f32) -> (Tensor, BatchStats) {
    let (n, c, spatial) = channel_layout(x);
    assert_eq!(gamma.len(), c, "gamma length {} != channels {c}", gamma.len());
    assert_eq!(beta.len(), c, "beta length {} != channels {c}", beta.len());

    let count = (n * spatial).max(1) as f32;
    let src = x.as_slice();
    let mut mean = Array1::<f32>::zeros(c);
    let mut var = Array1::<f32>::zeros(c);

    for (i, block) in src.chunks_exact(spatial.max(1)).enumerate().take(n * c) {
        mean[i % c] += block.iter().sum::<f32>();
    }
    mean /= count;
    for (i, block) in src.chunks_exact(spatial.max(1)).enumerate().take(n * c) {
        let m = mean[i % c];
        var[i % c] += block.iter().map(|v| (v - m).powi(2)).sum::<f32>();
    }
    var /= count;

    let inv_std = var.mapv(|v| 1.0 / (v + epsilon).sqrt());
    let mut normalized = Array1::zeros(src.len());
    let mut data = Array1::zeros(src.len());
    for i in 0..src.len() {
        let ch = (i / spatial.max(1)) % c;
        let xhat = (src[i] - mean[ch]) * inv_std[ch];
        normalized[i] = xhat;
        data[i] = gamma.data()[ch] * xhat + beta.data()[ch];
    }

    let requires_grad = x.requires_grad() || gamma.requires_grad() || beta.requires_grad();
    let mut result = Tensor::from_array(data, x.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(BatchNormBackward {
            x: x.clone(),
            gamma: gamma.clone(),
            beta: beta.clone(),
            normalized,
            inv_std,
            layout: (n, c, spatial),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    (result, BatchStats { mean, var })
}

struct BatchNormBackward {
    x: Tensor,
    gamma: Tensor,
    beta: Tensor,
    normalized: Array1<f32>,
    inv_std: Array1<f32>,
    layout: (usize, usize, usize),
    result_grad: GradCell,
}

impl BackwardOp for BatchNormBackward {
    fn backward(&self) {
        let (n, c, spatial) = self.layout;
        let spatial = spatial.max(1);
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let m = (n * spatial).max(1) as f32;

            // Σ dy and Σ dy * x̂ per channel
            let mut sum_dy = Array1::<f32>::zeros(c);
            let mut sum_dy_xhat = Array1::<f32>::zeros(c);
            for (i, (&dy, &xhat)) in grad.iter().zip(self.normalized.iter()).enumerate() {
                let ch = (i / spatial) % c;
                sum_dy[ch] += dy;
                sum_dy_xhat[ch] += dy * xhat;
            }

            if self.x.requires_grad() {
                // ∂L/∂x = γ/σ · (dy - mean(dy) - x̂ · mean(dy · x̂))
                let gamma = self.gamma.data();
                let grad_x: Array1<f32> = grad
                    .iter()
                    .zip(self.normalized.iter())
                    .enumerate()
                    .map(|(i, (&dy, &xhat))| {
                        let ch = (i / spatial) % c;
                        gamma[ch]
                            * self.inv_std[ch]
                            * (dy - sum_dy[ch] / m - xhat * sum_dy_xhat[ch] / m)
                    })
                    .collect();
                self.x.accumulate_grad(grad_x);
            }
            if self.gamma.requires_grad() {
                self.gamma.accumulate_grad(sum_dy_xhat);
            }
            if self.beta.requires_grad() {
                self.beta.accumulate_grad(sum_dy);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone(), self.gamma.clone(), self.beta.clone()]
    }
}

/// Batch normalization with fixed statistics (inference)
pub fn batch_norm_inference(
    x: &Tensor,
    gamma: &Tensor,
    beta: &Tensor,
    stats: &BatchStats,
    epsilon: f32,
) -> Tensor {
    let (_, c, spatial) = channel_layout(x);
    let spatial = spatial.max(1);
    let scale: Array1<f32> = gamma
        .data()
        .iter()
        .zip(stats.var.iter())
        .map(|(g, v)| g / (v + epsilon).sqrt())
        .collect();
    let shift: Array1<f32> = beta
        .data()
        .iter()
        .zip(scale.iter().zip(stats.mean.iter()))
        .map(|(b, (s, m))| b - s * m)
        .collect();

    let data: Array1<f32> = x
        .data()
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let ch = (i / spatial) % c;
            scale[ch] * v + shift[ch]
        })
        .collect();

    let requires_grad = x.requires_grad();
    let mut result = Tensor::from_array(data, x.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ChannelScaleBackward {
            x: x.clone(),
            scale,
            layout: (c, spatial),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ChannelScaleBackward {
    x: Tensor,
    scale: Array1<f32>,
    layout: (usize, usize),
    result_grad: GradCell,
}

impl BackwardOp for ChannelScaleBackward {
    fn backward(&self) {
        let (c, spatial) = self.layout;
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let grad_x: Array1<f32> = grad
                .iter()
                .enumerate()
                .map(|(i, &dy)| dy * self.scale[(i / spatial) % c])
                .collect();
            self.x.accumulate_grad(grad_x);
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone()]
    }
}
