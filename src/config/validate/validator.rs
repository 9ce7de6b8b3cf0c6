//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::AcganSpec;

/// Validate a training specification
///
/// Checks numeric ranges and that the generator geometry produces images of
/// the configured size. Paths are checked separately by [`validate_paths`].
pub fn validate_config(spec: &AcganSpec) -> Result<(), ValidationError> {
    let data = &spec.data;
    let model = &spec.model;
    let training = &spec.training;
    let optimizer = &spec.optimizer;

    if data.num_classes() < 2 {
        return Err(ValidationError::TooFewClasses(data.num_classes()));
    }

    let sizes = [
        ("image_size", data.image_size),
        ("latent_size", model.latent_size),
        ("seed_size", model.seed_size),
        ("seed_channels", model.seed_channels),
        ("generator_kernel", model.generator_kernel),
        ("discriminator_kernel", model.discriminator_kernel),
        ("eval_batch_size", training.eval_batch_size),
    ];
    for (name, value) in sizes {
        if value == 0 {
            return Err(ValidationError::ZeroSize { name });
        }
    }
    if model.generator_channels.is_empty() || model.generator_channels.contains(&0) {
        return Err(ValidationError::ZeroSize { name: "generator_channels" });
    }
    if model.discriminator_filters.is_empty() || model.discriminator_filters.contains(&0) {
        return Err(ValidationError::ZeroSize { name: "discriminator_filters" });
    }
    if model.discriminator_strides.contains(&0) {
        return Err(ValidationError::ZeroSize { name: "discriminator_strides" });
    }
    if model.discriminator_filters.len() != model.discriminator_strides.len() {
        return Err(ValidationError::StrideCountMismatch {
            filters: model.discriminator_filters.len(),
            strides: model.discriminator_strides.len(),
        });
    }

    let generated = spec.acgan_config().generator.output_size();
    if generated != data.image_size {
        return Err(ValidationError::GeometryMismatch { generated, expected: data.image_size });
    }

    if !(0.0..1.0).contains(&model.dropout) {
        return Err(ValidationError::InvalidDropout(model.dropout));
    }
    if model.leaky_slope.is_nan() || model.leaky_slope < 0.0 {
        return Err(ValidationError::InvalidLeakySlope(model.leaky_slope));
    }

    // NaN slips past plain comparisons
    if optimizer.lr.is_nan() || optimizer.lr <= 0.0 || optimizer.lr > 1.0 {
        return Err(ValidationError::InvalidLearningRate(optimizer.lr));
    }
    for (name, value) in [("beta1", optimizer.beta1), ("beta2", optimizer.beta2)] {
        if !(0.0..1.0).contains(&value) {
            return Err(ValidationError::InvalidBeta { name, value });
        }
    }
    if optimizer.epsilon.is_nan() || optimizer.epsilon <= 0.0 {
        return Err(ValidationError::InvalidEpsilon(optimizer.epsilon));
    }

    if training.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(training.batch_size));
    }
    if training.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(training.epochs));
    }
    if training.runs == 0 {
        return Err(ValidationError::InvalidRuns(training.runs));
    }
    if training.checkpoint_interval == 0 {
        return Err(ValidationError::InvalidCheckpointInterval(training.checkpoint_interval));
    }
    if !(0.0 <= training.soft_zero && training.soft_zero < training.soft_one && training.soft_one <= 1.0) {
        return Err(ValidationError::InvalidSoftLabels { zero: training.soft_zero, one: training.soft_one });
    }
    if training.real_class_weight.is_nan() || training.real_class_weight < 0.0 {
        return Err(ValidationError::InvalidClassWeight(training.real_class_weight));
    }
    if training.sample_rows == 0 || training.sample_cols == 0 {
        return Err(ValidationError::InvalidSampleGrid { rows: training.sample_rows, cols: training.sample_cols });
    }

    Ok(())
}

/// Check that the image directory and both splits exist
pub fn validate_paths(spec: &AcganSpec) -> Result<(), ValidationError> {
    let root = &spec.data.images_dir;
    if !root.is_dir() {
        return Err(ValidationError::ImagesDirNotFound(root.display().to_string()));
    }
    for split in [&spec.data.train_split, &spec.data.test_split] {
        let dir = root.join(split);
        if !dir.is_dir() {
            return Err(ValidationError::SplitNotFound(dir.display().to_string()));
        }
    }
    Ok(())
}
