//! Auxiliary Classifier GAN for skin-lesion images
//!
//! - [`Generator`]: latent vector ⊙ class embedding → dense seed → transposed
//!   convolutions → `tanh` image
//! - [`Discriminator`]: strided convolutions → real/fake head and class head
//! - [`Acgan`]: both networks with their optimizers and the
//!   train / evaluate / predict loops

mod config;
mod discriminator;
mod gan;
mod generator;
pub mod latent;
mod summary;

pub use config::{AcganConfig, AdamConfig, DiscriminatorConfig, GeneratorConfig};
pub use discriminator::{Discriminator, DiscriminatorOutput};
pub use gan::{Acgan, DiscriminatorPrediction, LossBreakdown, SampleWeights};
pub use generator::Generator;
pub use summary::{LayerSummary, ModelSummary};
