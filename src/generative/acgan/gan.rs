//! The ACGAN: generator, discriminator, their optimizers and the
//! train / evaluate / predict loops over them.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize};

use super::config::AcganConfig;
use super::discriminator::{Discriminator, DiscriminatorOutput};
use super::generator::Generator;
use super::latent::{labels_to_tensor, sample_labels, uniform_noise};
use crate::autograd::{add, backward, sigmoid, softmax, Context};
use crate::optim::{Adam, Optimizer};
use crate::train::{argmax_rows, Accuracy, BCEWithLogitsLoss, CrossEntropyLoss, LossFn, Metric};
use crate::Tensor;

/// JSON writes NaN as `null`; read it back as NaN
pub(crate) fn f32_or_nan<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or(f32::NAN))
}

/// Total loss and its two components, as reported per batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossBreakdown {
    /// `generation_loss + auxiliary_loss`
    #[serde(deserialize_with = "f32_or_nan")]
    pub loss: f32,
    /// Real/fake binary cross entropy
    #[serde(deserialize_with = "f32_or_nan")]
    pub generation_loss: f32,
    /// Class sparse categorical cross entropy
    #[serde(deserialize_with = "f32_or_nan")]
    pub auxiliary_loss: f32,
}

impl LossBreakdown {
    pub fn new(generation_loss: f32, auxiliary_loss: f32) -> Self {
        Self { loss: generation_loss + auxiliary_loss, generation_loss, auxiliary_loss }
    }

    /// Component-wise mean; NaN for an empty slice
    pub fn mean(items: &[Self]) -> Self {
        let n = items.len() as f32;
        let total = |f: fn(&Self) -> f32| items.iter().map(f).sum::<f32>() / n;
        Self {
            loss: total(|b| b.loss),
            generation_loss: total(|b| b.generation_loss),
            auxiliary_loss: total(|b| b.auxiliary_loss),
        }
    }

    /// Mean over chunks of different sizes, weighted by size
    fn weighted_mean(items: &[(Self, usize)]) -> Self {
        let n = items.iter().map(|(_, count)| *count).sum::<usize>() as f32;
        let total = |f: fn(&Self) -> f32| items.iter().map(|(b, c)| f(b) * *c as f32).sum::<f32>() / n;
        Self {
            loss: total(|b| b.loss),
            generation_loss: total(|b| b.generation_loss),
            auxiliary_loss: total(|b| b.auxiliary_loss),
        }
    }

    /// `[loss, generation_loss, auxiliary_loss]`
    pub fn to_array(self) -> [f32; 3] {
        [self.loss, self.generation_loss, self.auxiliary_loss]
    }
}

/// Per-sample loss weights for the two discriminator heads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleWeights {
    pub generation: Option<Vec<f32>>,
    pub auxiliary: Option<Vec<f32>>,
}

impl SampleWeights {
    /// Weights for a `real ‖ fake` batch where the class head learns from
    /// the real images only
    ///
    /// A `real_weight` of 2 keeps the weight total equal to the batch size.
    pub fn real_only_auxiliary(batch_size: usize, real_weight: f32) -> Self {
        let auxiliary = std::iter::repeat(real_weight)
            .take(batch_size)
            .chain(std::iter::repeat(0.0).take(batch_size))
            .collect();
        Self { generation: Some(vec![1.0; 2 * batch_size]), auxiliary: Some(auxiliary) }
    }
}

/// Discriminator probabilities for a set of images
#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminatorPrediction {
    /// Probability that each image is real
    pub real: Vec<f32>,
    /// Class probabilities, `num_classes` per image
    pub classes: Vec<f32>,
    pub num_classes: usize,
}

impl DiscriminatorPrediction {
    /// Most likely class per image
    pub fn predicted_classes(&self) -> Vec<usize> {
        argmax_rows(&self.classes, self.num_classes)
    }
}

/// Auxiliary Classifier GAN
///
/// Owns both networks and one Adam optimizer for each trainable role: the
/// discriminator, and the generator trained through the frozen
/// discriminator (the combined model).
pub struct Acgan {
    pub config: AcganConfig,
    pub generator: Generator,
    pub discriminator: Discriminator,
    disc_optimizer: Adam,
    gen_optimizer: Adam,
    ctx: Context,
}

impl Acgan {
    /// Build fresh networks, all randomness derived from `seed`
    pub fn new(config: AcganConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let generator = Generator::from_rng(config.generator.clone(), &mut rng);
        let discriminator = Discriminator::from_rng(config.discriminator.clone(), &mut rng);
        let ctx = Context::with_seed(rng.random());

        let adam = config.optimizer;
        let make_adam = || Adam::new(adam.learning_rate, adam.beta1, adam.beta2, adam.epsilon);

        Self {
            disc_optimizer: make_adam(),
            gen_optimizer: make_adam(),
            config,
            generator,
            discriminator,
            ctx,
        }
    }

    pub fn num_classes(&self) -> usize {
        self.config.discriminator.num_classes
    }

    /// `[n, latent_size]` noise from `U(-1, 1)`
    pub fn sample_noise(&mut self, n: usize) -> Tensor {
        uniform_noise(self.ctx.rng(), n, self.config.generator.latent_size)
    }

    /// `n` labels drawn uniformly over the classes
    pub fn sample_labels(&mut self, n: usize) -> Vec<usize> {
        let classes = self.num_classes();
        sample_labels(self.ctx.rng(), n, classes)
    }

    /// Generate images in inference mode; the result is detached
    pub fn generate(&mut self, noise: &Tensor, labels: &[usize]) -> Tensor {
        self.ctx.eval();
        let images = self.generator.forward(noise, labels, &self.ctx).detach();
        self.ctx.train();
        images
    }

    /// [`Acgan::generate`] over `batch_size` samples at a time
    pub fn generate_batched(&mut self, noise: &Tensor, labels: &[usize], batch_size: usize) -> Tensor {
        let parts: Vec<Tensor> = chunk_ranges(labels.len(), batch_size)
            .map(|(start, end)| self.generate(&noise.slice_outer(start, end), &labels[start..end]))
            .collect();
        if parts.is_empty() {
            let c = &self.config.generator;
            let side = c.output_size();
            return Tensor::zeros(&[0, c.channels, side, side], false);
        }
        Tensor::concat_outer(&parts.iter().collect::<Vec<_>>())
    }

    /// Discriminator probabilities in inference mode, `batch_size` images at a time
    pub fn discriminator_predict(&mut self, images: &Tensor, batch_size: usize) -> DiscriminatorPrediction {
        let n = images.shape().first().copied().unwrap_or(0);
        let mut real = Vec::with_capacity(n);
        let mut classes = Vec::with_capacity(n * self.num_classes());

        self.ctx.eval();
        for start in (0..n).step_by(batch_size.max(1)) {
            let end = (start + batch_size.max(1)).min(n);
            let out = self.discriminator.forward(&images.slice_outer(start, end), &mut self.ctx);
            real.extend(sigmoid(&out.generation).data().iter());
            classes.extend(softmax(&out.auxiliary).data().iter());
        }
        self.ctx.train();

        DiscriminatorPrediction { real, classes, num_classes: self.num_classes() }
    }

    /// One Adam step on the discriminator
    ///
    /// `images` is the full `real ‖ fake` batch; the returned losses are the
    /// ones computed before the update.
    pub fn train_discriminator_on_batch(
        &mut self,
        images: &Tensor,
        generation_targets: &[f32],
        auxiliary_targets: &[usize],
        weights: &SampleWeights,
    ) -> LossBreakdown {
        self.ctx.train();
        let out = self.discriminator.forward(images, &mut self.ctx);
        let (mut loss, breakdown) = head_losses(&out, generation_targets, auxiliary_targets, weights);
        backward(&mut loss, None);

        let mut params = self.discriminator.parameters_mut();
        self.disc_optimizer.step_refs(&mut params);
        self.disc_optimizer.zero_grad_refs(&mut params);

        tracing::debug!(loss = breakdown.loss, "discriminator step");
        breakdown
    }

    /// One Adam step on the generator through the frozen discriminator
    ///
    /// Both networks run in training mode, so generator batch norm uses batch
    /// statistics and discriminator dropout is active.
    pub fn train_generator_on_batch(
        &mut self,
        noise: &Tensor,
        labels: &[usize],
        trick_targets: &[f32],
    ) -> LossBreakdown {
        self.ctx.train();
        self.discriminator.set_trainable(false);

        let fakes = self.generator.forward(noise, labels, &self.ctx);
        let out = self.discriminator.forward(&fakes, &mut self.ctx);
        let (mut loss, breakdown) = head_losses(&out, trick_targets, labels, &SampleWeights::default());
        backward(&mut loss, None);

        let mut params = self.generator.parameters_mut();
        self.gen_optimizer.step_refs(&mut params);
        self.gen_optimizer.zero_grad_refs(&mut params);

        self.discriminator.set_trainable(true);
        tracing::debug!(loss = breakdown.loss, "generator step");
        breakdown
    }

    /// Discriminator losses in inference mode, without updates
    pub fn evaluate_discriminator(
        &mut self,
        images: &Tensor,
        generation_targets: &[f32],
        auxiliary_targets: &[usize],
        batch_size: usize,
    ) -> LossBreakdown {
        let n = images.shape().first().copied().unwrap_or(0);
        self.ctx.eval();
        let chunks: Vec<(LossBreakdown, usize)> = chunk_ranges(n, batch_size)
            .map(|(start, end)| {
                let out = self.discriminator.forward(&images.slice_outer(start, end), &mut self.ctx);
                let (_, breakdown) = head_losses(
                    &out,
                    &generation_targets[start..end],
                    &auxiliary_targets[start..end],
                    &SampleWeights::default(),
                );
                (breakdown, end - start)
            })
            .collect();
        self.ctx.train();
        LossBreakdown::weighted_mean(&chunks)
    }

    /// Combined-model losses in inference mode, without updates
    pub fn evaluate_combined(
        &mut self,
        noise: &Tensor,
        labels: &[usize],
        trick_targets: &[f32],
        batch_size: usize,
    ) -> LossBreakdown {
        self.ctx.eval();
        let chunks: Vec<(LossBreakdown, usize)> = chunk_ranges(labels.len(), batch_size)
            .map(|(start, end)| {
                let fakes = self.generator.forward(&noise.slice_outer(start, end), &labels[start..end], &self.ctx);
                let out = self.discriminator.forward(&fakes, &mut self.ctx);
                let (_, breakdown) = head_losses(
                    &out,
                    &trick_targets[start..end],
                    &labels[start..end],
                    &SampleWeights::default(),
                );
                (breakdown, end - start)
            })
            .collect();
        self.ctx.train();
        LossBreakdown::weighted_mean(&chunks)
    }

    /// Fraction of images whose most likely class matches `labels`
    pub fn classification_accuracy(&mut self, images: &Tensor, labels: &[usize], batch_size: usize) -> f32 {
        if labels.is_empty() {
            return 0.0;
        }
        let prediction = self.discriminator_predict(images, batch_size);
        let scores =
            Tensor::from_shape(prediction.classes, &[labels.len(), prediction.num_classes], false);
        Accuracy::default().compute(&scores, &labels_to_tensor(labels))
    }
}

/// Weighted losses of both heads and their sum
fn head_losses(
    out: &DiscriminatorOutput,
    generation_targets: &[f32],
    auxiliary_targets: &[usize],
    weights: &SampleWeights,
) -> (Tensor, LossBreakdown) {
    let generation = BCEWithLogitsLoss.forward_weighted(
        &out.generation,
        &Tensor::from_vec(generation_targets.to_vec(), false),
        weights.generation.as_deref(),
    );
    let auxiliary = CrossEntropyLoss.forward_weighted(
        &out.auxiliary,
        &labels_to_tensor(auxiliary_targets),
        weights.auxiliary.as_deref(),
    );
    let breakdown = LossBreakdown::new(generation.data()[0], auxiliary.data()[0]);
    (add(&generation, &auxiliary), breakdown)
}

/// `[start, end)` ranges covering `0..n` in steps of `batch_size`
fn chunk_ranges(n: usize, batch_size: usize) -> impl Iterator<Item = (usize, usize)> {
    let step = batch_size.max(1);
    (0..n).step_by(step).map(move |start| (start, (start + step).min(n)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::generative::acgan::{DiscriminatorConfig, GeneratorConfig};
    use approx::assert_relative_eq;

    fn tiny_config() -> AcganConfig {
        AcganConfig {
            generator: GeneratorConfig {
                latent_size: 8,
                num_classes: 2,
                seed_size: 2,
                seed_channels: 4,
                stage_channels: vec![4],
                channels: 3,
                kernel_size: 3,
            },
            discriminator: DiscriminatorConfig {
                image_size: 8,
                channels: 3,
                num_classes: 2,
                filters: vec![4, 8],
                strides: vec![2, 2],
                kernel_size: 3,
                leaky_slope: 0.2,
                dropout: 0.5,
            },
            ..AcganConfig::default()
        }
    }

    #[test]
    fn test_loss_breakdown_mean() {
        let mean = LossBreakdown::mean(&[LossBreakdown::new(1.0, 2.0), LossBreakdown::new(3.0, 0.0)]);
        assert_eq!(mean.to_array(), [3.0, 2.0, 1.0]);
        assert!(LossBreakdown::mean(&[]).loss.is_nan());
    }

    #[test]
    fn test_weighted_mean_by_chunk_size() {
        let mean = LossBreakdown::weighted_mean(&[
            (LossBreakdown::new(1.0, 0.0), 3),
            (LossBreakdown::new(5.0, 0.0), 1),
        ]);
        assert_relative_eq!(mean.generation_loss, 2.0);
    }

    #[test]
    fn test_real_only_auxiliary_weights() {
        let weights = SampleWeights::real_only_auxiliary(2, 2.0);
        assert_eq!(weights.generation, Some(vec![1.0; 4]));
        assert_eq!(weights.auxiliary, Some(vec![2.0, 2.0, 0.0, 0.0]));
    }

    #[test]
    fn test_chunk_ranges() {
        assert_eq!(chunk_ranges(5, 2).collect::<Vec<_>>(), vec![(0, 2), (2, 4), (4, 5)]);
        assert_eq!(chunk_ranges(0, 2).count(), 0);
    }

    #[test]
    fn test_generate_is_detached_and_sized() {
        let mut gan = Acgan::new(tiny_config(), 1);
        let noise = gan.sample_noise(4);
        let labels = gan.sample_labels(4);
        assert!(labels.iter().all(|&l| l < 2));

        let images = gan.generate(&noise, &labels);
        assert_eq!(images.shape(), &[4, 3, 8, 8]);
        assert!(!images.requires_grad());
    }

    #[test]
    fn test_generate_batched_matches_single_pass() {
        let mut gan = Acgan::new(tiny_config(), 6);
        let noise = gan.sample_noise(5);
        let labels = vec![0, 1, 0, 1, 1];

        let whole = gan.generate(&noise, &labels);
        let batched = gan.generate_batched(&noise, &labels, 2);
        assert_eq!(batched.shape(), whole.shape());
        for (a, b) in batched.as_slice().iter().zip(whole.as_slice()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5);
        }
        assert_eq!(gan.generate_batched(&noise.slice_outer(0, 0), &[], 2).shape(), &[0, 3, 8, 8]);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let mut a = Acgan::new(tiny_config(), 9);
        let mut b = Acgan::new(tiny_config(), 9);
        let na = a.sample_noise(2);
        let nb = b.sample_noise(2);
        assert_eq!(na.data(), nb.data());
        assert_eq!(a.generate(&na, &[0, 1]).data(), b.generate(&nb, &[0, 1]).data());
    }

    #[test]
    fn test_discriminator_step_updates_only_discriminator() {
        let mut gan = Acgan::new(tiny_config(), 2);
        let noise = gan.sample_noise(4);
        let fakes = gan.generate(&noise, &[0, 1, 0, 1]);
        let gen_before = gan.generator.named_tensors();
        let disc_before = gan.discriminator.named_tensors();

        let breakdown = gan.train_discriminator_on_batch(
            &fakes,
            &[0.95, 0.95, 0.0, 0.0],
            &[0, 1, 0, 1],
            &SampleWeights::real_only_auxiliary(2, 2.0),
        );
        assert!(breakdown.loss.is_finite());
        assert_relative_eq!(breakdown.loss, breakdown.generation_loss + breakdown.auxiliary_loss);

        let changed = |before: &[(String, Tensor)], after: &[(String, Tensor)]| {
            before.iter().zip(after).any(|((_, a), (_, b))| a.data() != b.data())
        };
        assert!(changed(&disc_before, &gan.discriminator.named_tensors()));
        assert!(!changed(&gen_before, &gan.generator.named_tensors()));
        assert!(gan.discriminator.parameters().iter().all(|p| p.grad().is_none()));
    }

    #[test]
    fn test_generator_step_keeps_discriminator_frozen() {
        let mut gan = Acgan::new(tiny_config(), 3);
        let noise = gan.sample_noise(4);
        let labels = vec![0, 1, 1, 0];
        let disc_before = gan.discriminator.named_tensors();
        let dense_before = gan.generator.named_tensors();

        let breakdown = gan.train_generator_on_batch(&noise, &labels, &[0.95; 4]);
        assert!(breakdown.loss.is_finite());

        for ((_, a), (_, b)) in disc_before.iter().zip(gan.discriminator.named_tensors().iter()) {
            assert_eq!(a.data(), b.data());
        }
        assert!(gan.discriminator.is_trainable());
        assert!(dense_before
            .iter()
            .zip(gan.generator.named_tensors().iter())
            .any(|((_, a), (_, b))| a.data() != b.data()));
    }

    #[test]
    fn test_evaluate_does_not_update() {
        let mut gan = Acgan::new(tiny_config(), 4);
        let noise = gan.sample_noise(5);
        let labels = vec![0, 1, 0, 1, 1];
        let images = gan.generate(&noise, &labels);
        let before = gan.discriminator.named_tensors();

        let chunked = gan.evaluate_discriminator(&images, &[0.0; 5], &labels, 2);
        let whole = gan.evaluate_discriminator(&images, &[0.0; 5], &labels, 5);
        assert_relative_eq!(chunked.loss, whole.loss, epsilon = 1e-5);

        let combined = gan.evaluate_combined(&noise, &labels, &[1.0; 5], 3);
        assert!(combined.loss.is_finite());

        for ((_, a), (_, b)) in before.iter().zip(gan.discriminator.named_tensors().iter()) {
            assert_eq!(a.data(), b.data());
        }
    }

    #[test]
    fn test_predict_outputs_probabilities() {
        let mut gan = Acgan::new(tiny_config(), 5);
        let noise = gan.sample_noise(3);
        let images = gan.generate(&noise, &[0, 1, 1]);

        let prediction = gan.discriminator_predict(&images, 2);
        assert_eq!(prediction.real.len(), 3);
        assert!(prediction.real.iter().all(|p| (0.0..=1.0).contains(p)));
        for row in prediction.classes.chunks(2) {
            assert_relative_eq!(row.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        }
        assert_eq!(prediction.predicted_classes().len(), 3);

        let accuracy = gan.classification_accuracy(&images, &[0, 1, 1], 2);
        assert!((0.0..=1.0).contains(&accuracy));
        assert_eq!(gan.classification_accuracy(&images.slice_outer(0, 0), &[], 2), 0.0);
    }
}
