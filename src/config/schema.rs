//! YAML schema for ACGAN training runs
//!
//! Every field has a default, so an empty document describes the reference
//! setup: 128×128 RGB lesions in `images128/{train,validation}/{outros,melanoma}`,
//! ten runs of 50000 epochs with batches of 100.

use crate::generative::{AcganConfig, AdamConfig, DiscriminatorConfig, GeneratorConfig};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

/// Complete training specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcganSpec {
    /// Image folder
    #[serde(default)]
    pub data: DataSpec,

    /// Network architecture
    #[serde(default)]
    pub model: ModelSpec,

    /// Adam hyperparameters (shared by both optimizers)
    #[serde(default)]
    pub optimizer: OptimSpec,

    /// Loop hyperparameters
    #[serde(default)]
    pub training: TrainingParams,
}

/// Image folder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSpec {
    /// Root holding one directory per split
    pub images_dir: PathBuf,

    /// Split used for training
    pub train_split: String,

    /// Split used for the per-epoch test phase
    pub test_split: String,

    /// Class directories; the position is the label
    pub class_dirs: Vec<String>,

    /// Side of the square images, in pixels
    pub image_size: usize,

    /// Shuffle images (with their labels) once after loading
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub shuffle: bool,
}

impl Default for DataSpec {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("images128"),
            train_split: "train".to_string(),
            test_split: "validation".to_string(),
            class_dirs: vec!["outros".to_string(), "melanoma".to_string()],
            image_size: 128,
            shuffle: true,
        }
    }
}

impl DataSpec {
    pub fn num_classes(&self) -> usize {
        self.class_dirs.len()
    }
}

/// Network architecture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    /// Size of the latent vector
    pub latent_size: usize,

    /// Side of the generator's first feature map
    pub seed_size: usize,

    /// Channels of the generator's first feature map
    pub seed_channels: usize,

    /// Output channels of the generator's upsampling stages
    pub generator_channels: Vec<usize>,

    /// Generator transposed-convolution kernel
    pub generator_kernel: usize,

    /// Filters of the discriminator convolutions
    pub discriminator_filters: Vec<usize>,

    /// Strides of the discriminator convolutions
    pub discriminator_strides: Vec<usize>,

    /// Discriminator convolution kernel
    pub discriminator_kernel: usize,

    /// LeakyReLU negative slope
    pub leaky_slope: f32,

    /// Discriminator dropout rate
    pub dropout: f32,
}

impl Default for ModelSpec {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        let discriminator = DiscriminatorConfig::default();
        Self {
            latent_size: generator.latent_size,
            seed_size: generator.seed_size,
            seed_channels: generator.seed_channels,
            generator_channels: generator.stage_channels,
            generator_kernel: generator.kernel_size,
            discriminator_filters: discriminator.filters,
            discriminator_strides: discriminator.strides,
            discriminator_kernel: discriminator.kernel_size,
            leaky_slope: discriminator.leaky_slope,
            dropout: discriminator.dropout,
        }
    }
}

/// Adam hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimSpec {
    /// Learning rate
    pub lr: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl Default for OptimSpec {
    fn default() -> Self {
        let adam = AdamConfig::default();
        Self { lr: adam.learning_rate, beta1: adam.beta1, beta2: adam.beta2, epsilon: adam.epsilon }
    }
}

/// Training hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Independent runs, each from freshly initialised networks
    pub runs: usize,

    /// Number of epochs per run
    pub epochs: usize,

    /// Real images per discriminator step
    pub batch_size: usize,

    /// Batch size of the test-phase evaluation and prediction
    pub eval_batch_size: usize,

    /// Smoothed "real" target
    pub soft_one: f32,

    /// "Fake" target
    pub soft_zero: f32,

    /// Auxiliary-loss weight of real images in the discriminator step
    pub real_class_weight: f32,

    /// Save weights, history and samples every N epochs
    pub checkpoint_interval: usize,

    /// Rows of generated samples per class in the sample grid
    pub sample_rows: usize,

    /// Columns of the sample grid
    pub sample_cols: usize,

    /// Directory receiving one `r<run>` directory per run
    pub output_dir: PathBuf,

    /// Global random seed for reproducibility
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            runs: 10,
            epochs: 50_000,
            batch_size: 100,
            eval_batch_size: 32,
            soft_one: 0.95,
            soft_zero: 0.0,
            real_class_weight: 2.0,
            checkpoint_interval: 50,
            sample_rows: 3,
            sample_cols: 5,
            output_dir: PathBuf::from("."),
            seed: None,
        }
    }
}

impl AcganSpec {
    /// Network and optimizer configuration described by this spec
    pub fn acgan_config(&self) -> AcganConfig {
        let m = &self.model;
        let num_classes = self.data.num_classes();
        AcganConfig {
            generator: GeneratorConfig {
                latent_size: m.latent_size,
                num_classes,
                seed_size: m.seed_size,
                seed_channels: m.seed_channels,
                stage_channels: m.generator_channels.clone(),
                channels: 3,
                kernel_size: m.generator_kernel,
            },
            discriminator: DiscriminatorConfig {
                image_size: self.data.image_size,
                channels: 3,
                num_classes,
                filters: m.discriminator_filters.clone(),
                strides: m.discriminator_strides.clone(),
                kernel_size: m.discriminator_kernel,
                leaky_slope: m.leaky_slope,
                dropout: m.dropout,
            },
            optimizer: AdamConfig {
                learning_rate: self.optimizer.lr,
                beta1: self.optimizer.beta1,
                beta2: self.optimizer.beta2,
                epsilon: self.optimizer.epsilon,
            },
        }
    }
}
