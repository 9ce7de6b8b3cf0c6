//! Discriminator network for the ACGAN.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

use super::config::DiscriminatorConfig;
use super::summary::{LayerSummary, ModelSummary};
use crate::autograd::{dropout, leaky_relu, reshape, Context, Padding};
use crate::nn::{Conv2d, Linear};
use crate::{Result, Tensor};

/// Raw outputs of both discriminator heads
#[derive(Clone)]
pub struct DiscriminatorOutput {
    /// Real/fake logits `[N, 1]`
    pub generation: Tensor,
    /// Class logits `[N, num_classes]`
    pub auxiliary: Tensor,
}

/// Discriminator network: decides real vs fake and classifies the lesion
///
/// A stack of `Same`-padded convolutions, each followed by LeakyReLU and
/// dropout, feeds two dense heads. Both heads return logits; the sigmoid and
/// softmax are folded into the losses and applied by
/// [`Acgan::discriminator_predict`](super::Acgan::discriminator_predict).
pub struct Discriminator {
    /// Configuration
    pub config: DiscriminatorConfig,
    convs: Vec<Conv2d>,
    generation: Linear,
    auxiliary: Linear,
}

impl Discriminator {
    /// Create a new discriminator with random initialization
    pub fn new(config: DiscriminatorConfig) -> Self {
        Self::from_rng(config, &mut StdRng::from_os_rng())
    }

    /// Create a new discriminator with a seed for reproducibility
    pub fn with_seed(config: DiscriminatorConfig, seed: u64) -> Self {
        Self::from_rng(config, &mut StdRng::seed_from_u64(seed))
    }

    /// Create a new discriminator drawing initial weights from `rng`
    pub fn from_rng<R: Rng>(config: DiscriminatorConfig, rng: &mut R) -> Self {
        assert_eq!(
            config.filters.len(),
            config.strides.len(),
            "every convolution block needs a stride"
        );

        let mut in_channels = config.channels;
        let convs = config
            .filters
            .iter()
            .zip(&config.strides)
            .map(|(&filters, &stride)| {
                let conv = Conv2d::new(in_channels, filters, config.kernel_size, stride, Padding::Same, rng);
                in_channels = filters;
                conv
            })
            .collect();

        let features = config.feature_size();
        let generation = Linear::new(features, 1, rng);
        let auxiliary = Linear::new(features, config.num_classes, rng);

        Self { config, convs, generation, auxiliary }
    }

    /// Forward pass over `[N, channels, S, S]` images
    ///
    /// Dropout is active only in training mode and draws its masks from the
    /// context's generator.
    pub fn forward(&self, images: &Tensor, ctx: &mut Context) -> DiscriminatorOutput {
        let c = &self.config;
        let n = images.shape().first().copied().unwrap_or(0);
        assert_eq!(
            images.shape(),
            &[n, c.channels, c.image_size, c.image_size],
            "discriminator input must be [batch, channels, size, size]"
        );

        let mut x = images.clone();
        for conv in &self.convs {
            x = leaky_relu(&conv.forward(&x), c.leaky_slope);
            if ctx.is_training() {
                x = dropout(&x, c.dropout, ctx.rng());
            }
        }

        let features = reshape(&x, &[n, c.feature_size()]);
        DiscriminatorOutput {
            generation: self.generation.forward(&features),
            auxiliary: self.auxiliary.forward(&features),
        }
    }

    /// Freeze or unfreeze every parameter
    ///
    /// A frozen discriminator still propagates gradients to its input, which
    /// is how the combined model trains the generator through it.
    pub fn set_trainable(&mut self, trainable: bool) {
        for p in self.parameters_mut() {
            p.set_requires_grad(trainable);
        }
    }

    pub fn is_trainable(&self) -> bool {
        self.generation.weight.requires_grad()
    }

    /// Trainable parameters, in a stable order
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params: Vec<&mut Tensor> =
            self.convs.iter_mut().flat_map(Conv2d::parameters_mut).collect();
        params.extend(self.generation.parameters_mut());
        params.extend(self.auxiliary.parameters_mut());
        params
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        let mut params: Vec<&Tensor> = self.convs.iter().flat_map(Conv2d::parameters).collect();
        params.extend(self.generation.parameters());
        params.extend(self.auxiliary.parameters());
        params
    }

    /// Clear accumulated gradients on every parameter
    pub fn zero_grad(&self) {
        for p in self.parameters() {
            p.zero_grad();
        }
    }

    pub fn named_tensors(&self) -> Vec<(String, Tensor)> {
        let mut tensors: Vec<(String, Tensor)> = self
            .convs
            .iter()
            .enumerate()
            .flat_map(|(i, conv)| conv.named_tensors(&format!("conv{i}")))
            .collect();
        tensors.extend(self.generation.named_tensors("generation"));
        tensors.extend(self.auxiliary.named_tensors("auxiliary"));
        tensors
    }

    /// Restore weights saved by [`Discriminator::named_tensors`]
    pub fn load_tensors(&mut self, tensors: &HashMap<String, Tensor>) -> Result<()> {
        for (i, conv) in self.convs.iter_mut().enumerate() {
            conv.load_tensors(tensors, &format!("conv{i}"))?;
        }
        self.generation.load_tensors(tensors, "generation")?;
        self.auxiliary.load_tensors(tensors, "auxiliary")
    }

    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|t| t.len()).sum()
    }

    /// Per-layer output shapes and parameter counts
    pub fn summary(&self) -> ModelSummary {
        let mut layers = Vec::new();
        let mut side = self.config.image_size;
        for (i, conv) in self.convs.iter().enumerate() {
            side = conv.output_size(side);
            let shape = vec![conv.out_channels(), side, side];
            layers.push(LayerSummary::new(
                &format!("conv{i}"),
                "Conv2D",
                shape.clone(),
                conv.weight.len() + conv.bias.len(),
                0,
            ));
            layers.push(LayerSummary::new(&format!("leaky_relu{i}"), "LeakyReLU", shape.clone(), 0, 0));
            layers.push(LayerSummary::new(&format!("dropout{i}"), "Dropout", shape, 0, 0));
        }

        let features = self.config.feature_size();
        layers.push(LayerSummary::new("flatten", "Flatten", vec![features], 0, 0));
        for (name, head) in [("generation", &self.generation), ("auxiliary", &self.auxiliary)] {
            layers.push(LayerSummary::new(
                name,
                "Dense",
                vec![head.out_features()],
                head.weight.len() + head.bias.len(),
                0,
            ));
        }

        ModelSummary::new("discriminator", layers)
    }
}
