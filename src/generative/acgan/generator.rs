//! Generator network for the ACGAN.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

use super::config::GeneratorConfig;
use super::summary::{LayerSummary, ModelSummary};
use crate::autograd::{mul, relu, reshape, tanh, Context, Padding};
use crate::nn::{BatchNorm2d, ConvTranspose2d, Embedding, Linear};
use crate::{Result, Tensor};

/// One upsampling stage: transposed convolution, ReLU, batch norm
struct Stage {
    deconv: ConvTranspose2d,
    norm: BatchNorm2d,
}

/// Generator network: maps a latent vector and a class label to an image
///
/// The latent vector is multiplied element-wise with a learned embedding of
/// the class, projected to a small feature map by a dense layer and then
/// upsampled by transposed convolutions to `[N, channels, S, S]` in `[-1, 1]`.
pub struct Generator {
    /// Configuration
    pub config: GeneratorConfig,
    embedding: Embedding,
    dense: Linear,
    stages: Vec<Stage>,
    output: ConvTranspose2d,
}

impl Generator {
    /// Create a new generator with random initialization
    pub fn new(config: GeneratorConfig) -> Self {
        Self::from_rng(config, &mut StdRng::from_os_rng())
    }

    /// Create a new generator with a seed for reproducibility
    pub fn with_seed(config: GeneratorConfig, seed: u64) -> Self {
        Self::from_rng(config, &mut StdRng::seed_from_u64(seed))
    }

    /// Create a new generator drawing initial weights from `rng`
    pub fn from_rng<R: Rng>(config: GeneratorConfig, rng: &mut R) -> Self {
        let k = config.kernel_size;
        let embedding = Embedding::new(config.num_classes, config.latent_size, rng);
        let seed_len = config.seed_size * config.seed_size * config.seed_channels;
        let dense = Linear::new(config.latent_size, seed_len, rng);

        let mut in_channels = config.seed_channels;
        let stages = config
            .stage_channels
            .iter()
            .enumerate()
            .map(|(i, &out_channels)| {
                let (stride, padding) = if i == 0 { (1, Padding::Valid) } else { (2, Padding::Same) };
                let deconv = ConvTranspose2d::new(in_channels, out_channels, k, stride, padding, rng);
                in_channels = out_channels;
                Stage { deconv, norm: BatchNorm2d::new(out_channels) }
            })
            .collect();
        let output = ConvTranspose2d::new(in_channels, config.channels, k, 2, Padding::Same, rng);

        Self { config, embedding, dense, stages, output }
    }

    /// Generate images for `noise` (`[N, latent_size]`) and class `labels`
    ///
    /// Batch norm uses batch statistics in training mode and the moving
    /// averages otherwise.
    pub fn forward(&mut self, noise: &Tensor, labels: &[usize], ctx: &Context) -> Tensor {
        let n = labels.len();
        assert_eq!(
            noise.shape(),
            &[n, self.config.latent_size],
            "noise must be [batch, latent_size]"
        );

        // Hadamard product between z and the class-conditional embedding
        let h = mul(noise, &self.embedding.forward(labels));

        let seed = relu(&self.dense.forward(&h));
        let side = self.config.seed_size;
        let mut x = reshape(&seed, &[n, self.config.seed_channels, side, side]);

        for stage in &mut self.stages {
            x = stage.norm.forward(&relu(&stage.deconv.forward(&x)), ctx);
        }

        tanh(&self.output.forward(&x))
    }

    /// Enable or disable gradient tracking on every parameter
    pub fn set_trainable(&mut self, trainable: bool) {
        for p in self.parameters_mut() {
            p.set_requires_grad(trainable);
        }
    }

    /// Trainable parameters, in a stable order
    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = self.embedding.parameters_mut();
        params.extend(self.dense.parameters_mut());
        for stage in &mut self.stages {
            params.extend(stage.deconv.parameters_mut());
            params.extend(stage.norm.parameters_mut());
        }
        params.extend(self.output.parameters_mut());
        params
    }

    /// All weights including batch-norm moving statistics, by name
    pub fn named_tensors(&self) -> Vec<(String, Tensor)> {
        let mut tensors = self.embedding.named_tensors("embedding");
        tensors.extend(self.dense.named_tensors("dense"));
        for (i, stage) in self.stages.iter().enumerate() {
            tensors.extend(stage.deconv.named_tensors(&format!("stage{i}.deconv")));
            tensors.extend(stage.norm.named_tensors(&format!("stage{i}.norm")));
        }
        tensors.extend(self.output.named_tensors("output"));
        tensors
    }

    /// Restore weights saved by [`Generator::named_tensors`]
    pub fn load_tensors(&mut self, tensors: &HashMap<String, Tensor>) -> Result<()> {
        self.embedding.load_tensors(tensors, "embedding")?;
        self.dense.load_tensors(tensors, "dense")?;
        for (i, stage) in self.stages.iter_mut().enumerate() {
            stage.deconv.load_tensors(tensors, &format!("stage{i}.deconv"))?;
            stage.norm.load_tensors(tensors, &format!("stage{i}.norm"))?;
        }
        self.output.load_tensors(tensors, "output")
    }

    /// Get number of parameters (trainable and moving statistics)
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.named_tensors().iter().map(|(_, t)| t.len()).sum()
    }

    /// Per-layer output shapes and parameter counts
    pub fn summary(&self) -> ModelSummary {
        let c = &self.config;
        let mut layers = vec![
            LayerSummary::new("embedding", "Embedding", vec![c.latent_size], self.embedding.weight.len(), 0),
            LayerSummary::new("multiply", "Multiply", vec![c.latent_size], 0, 0),
            LayerSummary::new(
                "dense",
                "Dense",
                vec![c.seed_size * c.seed_size * c.seed_channels],
                self.dense.weight.len() + self.dense.bias.len(),
                0,
            ),
            LayerSummary::new("reshape", "Reshape", vec![c.seed_channels, c.seed_size, c.seed_size], 0, 0),
        ];

        let mut side = c.seed_size;
        for (i, stage) in self.stages.iter().enumerate() {
            side = stage.deconv.output_size(side);
            let channels = stage.deconv.out_channels();
            layers.push(LayerSummary::new(
                &format!("stage{i}.deconv"),
                "Conv2DTranspose",
                vec![channels, side, side],
                stage.deconv.weight.len() + stage.deconv.bias.len(),
                0,
            ));
            layers.push(LayerSummary::new(
                &format!("stage{i}.norm"),
                "BatchNormalization",
                vec![channels, side, side],
                2 * channels,
                2 * channels,
            ));
        }

        side = self.output.output_size(side);
        layers.push(LayerSummary::new(
            "output",
            "Conv2DTranspose",
            vec![c.channels, side, side],
            self.output.weight.len() + self.output.bias.len(),
            0,
        ));

        ModelSummary::new("generator", layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generative::acgan::latent::uniform_noise;

    fn tiny_config() -> GeneratorConfig {
        GeneratorConfig {
            latent_size: 6,
            num_classes: 2,
            seed_size: 2,
            seed_channels: 4,
            stage_channels: vec![4, 3],
            channels: 3,
            kernel_size: 3,
        }
    }

    #[test]
    fn test_generator_output_shape_and_range() {
        let config = tiny_config();
        // 2 -> 4 (valid) -> 8 -> 16
        assert_eq!(config.output_size(), 16);

        let mut gen = Generator::with_seed(config, 42);
        let ctx = Context::with_seed(0);
        let mut rng = StdRng::seed_from_u64(1);
        let z = uniform_noise(&mut rng, 3, 6);

        let images = gen.forward(&z, &[0, 1, 1], &ctx);
        assert_eq!(images.shape(), &[3, 3, 16, 16]);
        assert!(images.data().iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_generator_deterministic_in_inference() {
        let mut gen = Generator::with_seed(tiny_config(), 42);
        let mut ctx = Context::with_seed(0);
        ctx.eval();
        let z = Tensor::from_shape(vec![0.5; 12], &[2, 6], false);

        let a = gen.forward(&z, &[0, 1], &ctx);
        let b = gen.forward(&z, &[0, 1], &ctx);
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_label_changes_output() {
        let mut gen = Generator::with_seed(tiny_config(), 42);
        let mut ctx = Context::with_seed(0);
        ctx.eval();
        let z = Tensor::from_shape(vec![0.5; 12], &[2, 6], false);

        let images = gen.forward(&z, &[0, 1], &ctx);
        let per_image = images.len() / 2;
        let data = images.as_slice();
        assert_ne!(data[..per_image], data[per_image..]);
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = Generator::with_seed(tiny_config(), 7);
        let b = Generator::with_seed(tiny_config(), 7);
        for ((na, ta), (nb, tb)) in a.named_tensors().iter().zip(b.named_tensors().iter()) {
            assert_eq!(na, nb);
            assert_eq!(ta.data(), tb.data());
        }
    }

    #[test]
    fn test_parameter_counts() {
        let mut gen = Generator::with_seed(tiny_config(), 0);
        // embedding, dense(2), 2 stages x (deconv(2) + norm(2)), output(2)
        assert_eq!(gen.parameters_mut().len(), 1 + 2 + 2 * 4 + 2);
        // named tensors add two moving statistics per stage
        assert_eq!(gen.named_tensors().len(), 13 + 2 * 2);

        let summary = gen.summary();
        assert_eq!(summary.total_params(), gen.num_parameters());
        assert_eq!(summary.layers.last().map(|l| l.output_shape.clone()), Some(vec![3, 16, 16]));
    }

    #[test]
    fn test_load_tensors_round_trip() {
        let source = Generator::with_seed(tiny_config(), 1);
        let mut target = Generator::with_seed(tiny_config(), 2);
        let tensors: HashMap<String, Tensor> = source.named_tensors().into_iter().collect();

        target.load_tensors(&tensors).expect("same architecture loads");

        let mut ctx = Context::with_seed(0);
        ctx.eval();
        let z = Tensor::from_shape(vec![0.25; 6], &[1, 6], false);
        let mut source = source;
        assert_eq!(source.forward(&z, &[1], &ctx).data(), target.forward(&z, &[1], &ctx).data());
    }
}
