//! Generative models
//!
//! Class-conditional image synthesis with an auxiliary-classifier GAN: the
//! discriminator learns to separate real from generated images while also
//! predicting the class, and the generator learns to produce images the
//! discriminator accepts as real members of the requested class.

pub mod acgan;

pub use acgan::{
    Acgan, AcganConfig, AdamConfig, Discriminator, DiscriminatorConfig, Generator, GeneratorConfig,
    LossBreakdown, SampleWeights,
};
