//! Auxiliary-classifier GAN for skin-lesion images
//!
//! Trains a discriminator that tells real lesion images from generated ones
//! and classifies them (melanoma vs. other lesions), together with a
//! generator that synthesises lesions conditioned on class.
//!
//! - [`autograd`]: tape-based reverse-mode differentiation over `ndarray`
//! - [`nn`]: dense, convolution, transposed convolution, batch-norm and
//!   embedding layers
//! - [`optim`]: Adam
//! - [`generative`]: the ACGAN generator, discriminator and train-on-batch steps
//! - [`data`]: image-directory dataset loader
//! - [`train`]: losses, metrics and the epoch/run training loop
//! - [`io`]: safetensors weights, history JSON and sample grids
//! - [`config`] / [`cli`]: YAML configuration and the `acgan` command line

pub mod autograd;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod generative;
pub mod io;
pub mod nn;
pub mod optim;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
