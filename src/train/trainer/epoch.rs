//! Training and test phases of one epoch

use super::core::AcganTrainer;
use crate::data::Dataset;
use crate::generative::{Acgan, LossBreakdown, SampleWeights};
use crate::train::history::EpochStats;
use crate::Tensor;
use std::iter::repeat;

/// `n` copies of `real` followed by `n` copies of `fake`
fn real_fake_targets(n: usize, real: f32, fake: f32) -> Vec<f32> {
    repeat(real).take(n).chain(repeat(fake).take(n)).collect()
}

impl AcganTrainer {
    /// One pass over the training split
    ///
    /// Trailing samples that do not fill a batch are skipped. Returns the
    /// mean generator and discriminator losses of the epoch.
    pub(crate) fn train_epoch(&self, gan: &mut Acgan, train: &Dataset) -> (LossBreakdown, LossBreakdown) {
        let params = &self.spec.training;
        let batch_size = params.batch_size;
        let num_batches = train.num_batches(batch_size);

        let disc_targets = real_fake_targets(batch_size, params.soft_one, params.soft_zero);
        let weights = SampleWeights::real_only_auxiliary(batch_size, params.real_class_weight);
        let trick = vec![params.soft_one; 2 * batch_size];

        let mut gen_losses = Vec::with_capacity(num_batches);
        let mut disc_losses = Vec::with_capacity(num_batches);

        for index in 0..num_batches {
            let (real, real_labels) = train.batch(index, batch_size);

            let noise = gan.sample_noise(batch_size);
            let sampled = gan.sample_labels(batch_size);
            let fakes = gan.generate(&noise, &sampled);

            let images = Tensor::concat_outer(&[&real, &fakes]);
            let aux_targets: Vec<usize> = real_labels.iter().chain(&sampled).copied().collect();
            disc_losses.push(gan.train_discriminator_on_batch(&images, &disc_targets, &aux_targets, &weights));

            let noise = gan.sample_noise(2 * batch_size);
            let sampled = gan.sample_labels(2 * batch_size);
            gen_losses.push(gan.train_generator_on_batch(&noise, &sampled, &trick));

            tracing::debug!(batch = index + 1, num_batches, "batch finished");
        }

        (LossBreakdown::mean(&gen_losses), LossBreakdown::mean(&disc_losses))
    }

    /// Evaluate both models on the test split with hard targets
    pub(crate) fn test_epoch(
        &self,
        gan: &mut Acgan,
        test: &Dataset,
        epoch: usize,
        generator_train: LossBreakdown,
        discriminator_train: LossBreakdown,
    ) -> EpochStats {
        let batch_size = self.spec.training.eval_batch_size;
        let n = test.len();
        let x_test = test.images();

        let noise = gan.sample_noise(n);
        let sampled = gan.sample_labels(n);
        let fakes = gan.generate_batched(&noise, &sampled, batch_size);
        let images = Tensor::concat_outer(&[&x_test, &fakes]);
        let aux_targets: Vec<usize> = test.labels().iter().chain(&sampled).copied().collect();
        let discriminator_test = gan.evaluate_discriminator(
            &images,
            &real_fake_targets(n, 1.0, 0.0),
            &aux_targets,
            batch_size,
        );

        let noise = gan.sample_noise(2 * n);
        let sampled = gan.sample_labels(2 * n);
        let generator_test = gan.evaluate_combined(&noise, &sampled, &vec![1.0; 2 * n], batch_size);

        let accuracy = gan.classification_accuracy(&x_test, test.labels(), batch_size);

        EpochStats {
            epoch,
            generator_train,
            discriminator_train,
            generator_test,
            discriminator_test,
            accuracy,
        }
    }
}
