//! Autograd operations with backward passes
//!
//! This module provides differentiable operations for automatic differentiation.

mod activations;
mod basic;
mod conv;
mod embedding;
mod matmul;
mod normalize;

// Re-export all public operations
pub use activations::{dropout, leaky_relu, relu, sigmoid, sigmoid_scalar, softmax, tanh};
pub use basic::{add, mean, mul, reshape, scale, sum};
pub use conv::{conv2d, conv_output_size, conv_transpose2d, conv_transpose_output_size, Padding};
pub use embedding::embedding;
pub use matmul::{linear, matmul, matmul_compute};
pub use normalize::{batch_norm, batch_norm_inference, BatchStats};
