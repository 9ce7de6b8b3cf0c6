//! Periodic run artifacts: weights, history and a sample grid

use super::history::History;
use crate::generative::acgan::latent::class_grid;
use crate::generative::{Acgan, Generator, GeneratorConfig};
use crate::io::{load_weights, save_image_grid, save_weights, Model, ModelMetadata};
use crate::Result;
use std::path::{Path, PathBuf};

/// File name of the run history
pub const HISTORY_FILE: &str = "acgan-history.json";

pub fn generator_weights_path(run_dir: &Path, epoch: usize) -> PathBuf {
    run_dir.join(format!("params_generator_epoch_{epoch:06}.safetensors"))
}

pub fn discriminator_weights_path(run_dir: &Path, epoch: usize) -> PathBuf {
    run_dir.join(format!("params_discriminator_epoch_{epoch:06}.safetensors"))
}

pub fn sample_grid_path(run_dir: &Path, epoch: usize) -> PathBuf {
    run_dir.join(format!("plot_epoch_{epoch:03}_generated.png"))
}

/// Layout of the sample grid: `rows_per_class` rows of `cols` images per class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleGrid {
    pub rows_per_class: usize,
    pub cols: usize,
}

/// Files written by one checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub epoch: usize,
    pub generator: PathBuf,
    pub discriminator: PathBuf,
    pub history: PathBuf,
    pub samples: PathBuf,
}

/// Save both networks, the history so far and a class-ordered sample grid
pub fn save_checkpoint(
    gan: &mut Acgan,
    history: &History,
    run_dir: &Path,
    run: usize,
    epoch: usize,
    grid: SampleGrid,
) -> Result<Checkpoint> {
    let run_label = run.to_string();
    let generator = generator_weights_path(run_dir, epoch);
    save_weights(
        &Model::new(
            ModelMetadata::new("generator", "acgan").with_epoch(epoch).with_custom("run", &run_label),
            gan.generator.named_tensors(),
        ),
        &generator,
    )?;

    let discriminator = discriminator_weights_path(run_dir, epoch);
    save_weights(
        &Model::new(
            ModelMetadata::new("discriminator", "acgan").with_epoch(epoch).with_custom("run", &run_label),
            gan.discriminator.named_tensors(),
        ),
        &discriminator,
    )?;

    let history_path = run_dir.join(HISTORY_FILE);
    history.save(&history_path)?;

    let num_classes = gan.num_classes();
    let per_class = grid.rows_per_class * grid.cols;
    let noise = gan.sample_noise(per_class * num_classes);
    let labels = class_grid(num_classes, per_class);
    let images = gan.generate(&noise, &labels);
    let samples = sample_grid_path(run_dir, epoch);
    save_image_grid(&images, grid.rows_per_class * num_classes, grid.cols, &samples)?;

    tracing::info!(run, epoch, dir = %run_dir.display(), "checkpoint saved");
    Ok(Checkpoint { epoch, generator, discriminator, history: history_path, samples })
}

/// Rebuild a generator from saved weights
pub fn load_generator(path: impl AsRef<Path>, config: GeneratorConfig) -> Result<Generator> {
    let model = load_weights(path)?;
    let mut generator = Generator::new(config);
    generator.load_tensors(&model.tensor_map())?;
    generator.set_trainable(false);
    Ok(generator)
}
