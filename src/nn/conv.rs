//! Convolution layers (channel-first)

use crate::autograd::{
    conv2d, conv_output_size, conv_transpose2d, conv_transpose_output_size, Padding,
};
use crate::{Result, Tensor};
use rand::Rng;
use std::collections::HashMap;

use super::init::{conv_fans, glorot_normal, glorot_uniform};
use super::load_into;

/// 2-D convolution with square kernels
pub struct Conv2d {
    /// Kernel (out_channels x in_channels x k x k)
    pub weight: Tensor,
    /// Bias (out_channels)
    pub bias: Tensor,
    stride: usize,
    padding: Padding,
}

impl Conv2d {
    /// Glorot-uniform kernel, zero bias
    pub fn new<R: Rng>(
        in_channels: usize,
        out_channels: usize,
        kernel: usize,
        stride: usize,
        padding: Padding,
        rng: &mut R,
    ) -> Self {
        let (fan_in, fan_out) = conv_fans(in_channels, out_channels, kernel);
        Self {
            weight: glorot_uniform(rng, &[out_channels, in_channels, kernel, kernel], fan_in, fan_out),
            bias: Tensor::zeros(&[out_channels], true),
            stride,
            padding,
        }
    }

    pub fn in_channels(&self) -> usize {
        self.weight.shape()[1]
    }

    pub fn out_channels(&self) -> usize {
        self.weight.shape()[0]
    }

    pub fn kernel(&self) -> usize {
        self.weight.shape()[2]
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Spatial output size for a square input
    pub fn output_size(&self, input: usize) -> usize {
        conv_output_size(input, self.kernel(), self.stride, self.padding)
    }

    pub fn forward(&self, x: &Tensor) -> Tensor {
        conv2d(x, &self.weight, &self.bias, self.stride, self.padding)
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weight, &self.bias]
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }

    pub fn named_tensors(&self, prefix: &str) -> Vec<(String, Tensor)> {
        vec![
            (format!("{prefix}.weight"), self.weight.clone()),
            (format!("{prefix}.bias"), self.bias.clone()),
        ]
    }

    pub fn load_tensors(&mut self, tensors: &HashMap<String, Tensor>, prefix: &str) -> Result<()> {
        load_into(&mut self.weight, tensors, &format!("{prefix}.weight"))?;
        load_into(&mut self.bias, tensors, &format!("{prefix}.bias"))
    }
}

/// 2-D transposed convolution with square kernels
pub struct ConvTranspose2d {
    /// Kernel (in_channels x out_channels x k x k)
    pub weight: Tensor,
    /// Bias (out_channels)
    pub bias: Tensor,
    stride: usize,
    padding: Padding,
}

impl ConvTranspose2d {
    /// Glorot-normal kernel, zero bias
    pub fn new<R: Rng>(
        in_channels: usize,
        out_channels: usize,
        kernel: usize,
        stride: usize,
        padding: Padding,
        rng: &mut R,
    ) -> Self {
        let (fan_in, fan_out) = conv_fans(out_channels, in_channels, kernel);
        Self {
            weight: glorot_normal(rng, &[in_channels, out_channels, kernel, kernel], fan_in, fan_out),
            bias: Tensor::zeros(&[out_channels], true),
            stride,
            padding,
        }
    }

    pub fn in_channels(&self) -> usize {
        self.weight.shape()[0]
    }

    pub fn out_channels(&self) -> usize {
        self.weight.shape()[1]
    }

    pub fn kernel(&self) -> usize {
        self.weight.shape()[2]
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Spatial output size for a square input
    pub fn output_size(&self, input: usize) -> usize {
        conv_transpose_output_size(input, self.kernel(), self.stride, self.padding)
    }

    pub fn forward(&self, x: &Tensor) -> Tensor {
        conv_transpose2d(x, &self.weight, &self.bias, self.stride, self.padding)
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weight, &self.bias]
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }

    pub fn named_tensors(&self, prefix: &str) -> Vec<(String, Tensor)> {
        vec![
            (format!("{prefix}.weight"), self.weight.clone()),
            (format!("{prefix}.bias"), self.bias.clone()),
        ]
    }

    pub fn load_tensors(&mut self, tensors: &HashMap<String, Tensor>, prefix: &str) -> Result<()> {
        load_into(&mut self.weight, tensors, &format!("{prefix}.weight"))?;
        load_into(&mut self.bias, tensors, &format!("{prefix}.bias"))
    }
}
