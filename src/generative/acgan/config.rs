//! Configuration types for the ACGAN networks.

use crate::autograd::{conv_output_size, conv_transpose_output_size, Padding};
use serde::{Deserialize, Serialize};

/// Configuration for the Generator network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Size of the latent vector `z`
    pub latent_size: usize,
    /// Number of classes the generator is conditioned on
    pub num_classes: usize,
    /// Side of the square seed feature map produced by the dense layer
    pub seed_size: usize,
    /// Channels of the seed feature map
    pub seed_channels: usize,
    /// Output channels of each upsampling stage; the first stage is a
    /// stride-1 `valid` transposed convolution, the others stride 2 `same`
    pub stage_channels: Vec<usize>,
    /// Channels of the generated image
    pub channels: usize,
    /// Transposed convolution kernel size
    pub kernel_size: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            latent_size: 110,
            num_classes: 2,
            seed_size: 12,
            seed_channels: 768,
            stage_channels: vec![384, 192, 96],
            channels: 3,
            kernel_size: 5,
        }
    }
}

impl GeneratorConfig {
    /// Side of the generated images
    pub fn output_size(&self) -> usize {
        let mut size = self.seed_size;
        for stage in 0..self.stage_channels.len() {
            size = if stage == 0 {
                conv_transpose_output_size(size, self.kernel_size, 1, Padding::Valid)
            } else {
                conv_transpose_output_size(size, self.kernel_size, 2, Padding::Same)
            };
        }
        conv_transpose_output_size(size, self.kernel_size, 2, Padding::Same)
    }
}

/// Configuration for the Discriminator network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscriminatorConfig {
    /// Side of the square input images
    pub image_size: usize,
    /// Channels of the input images
    pub channels: usize,
    /// Number of classes of the auxiliary head
    pub num_classes: usize,
    /// Filters of each convolution block
    pub filters: Vec<usize>,
    /// Stride of each convolution block
    pub strides: Vec<usize>,
    /// Convolution kernel size
    pub kernel_size: usize,
    /// Negative slope of the LeakyReLU activations
    pub leaky_slope: f32,
    /// Dropout rate after each block
    pub dropout: f32,
}

impl Default for DiscriminatorConfig {
    fn default() -> Self {
        Self {
            image_size: 128,
            channels: 3,
            num_classes: 2,
            filters: vec![16, 32, 64, 128, 256, 512],
            strides: vec![2, 1, 2, 1, 2, 1],
            kernel_size: 3,
            leaky_slope: 0.2,
            dropout: 0.5,
        }
    }
}

impl DiscriminatorConfig {
    /// Side of the last feature map
    pub fn feature_map_size(&self) -> usize {
        self.strides
            .iter()
            .fold(self.image_size, |size, &s| conv_output_size(size, self.kernel_size, s, Padding::Same))
    }

    /// Length of the flattened feature vector fed to both heads
    pub fn feature_size(&self) -> usize {
        let side = self.feature_map_size();
        self.filters.last().copied().unwrap_or(self.channels) * side * side
    }
}

/// Adam hyperparameters shared by the discriminator and combined models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self { learning_rate: 2e-4, beta1: 0.5, beta2: 0.999, epsilon: 1e-7 }
    }
}

/// Configuration for the complete ACGAN
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcganConfig {
    pub generator: GeneratorConfig,
    pub discriminator: DiscriminatorConfig,
    pub optimizer: AdamConfig,
}
