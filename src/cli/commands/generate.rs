//! Generate command implementation

use crate::autograd::Context;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, GenerateArgs};
use crate::generative::acgan::latent::{class_grid, uniform_noise};
use crate::io::save_image_grid;
use crate::train::load_generator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Labels and grid shape (rows, cols) for `count` images of one or every class
pub fn generation_layout(
    class: Option<usize>,
    num_classes: usize,
    count: usize,
) -> Result<(Vec<usize>, usize, usize), String> {
    match class {
        Some(c) if c >= num_classes => {
            Err(format!("Class {c} out of range for {num_classes} classes"))
        }
        Some(c) => Ok((vec![c; count], 1, count)),
        None => Ok((class_grid(num_classes, count), num_classes, count)),
    }
}

pub fn run_generate(args: GenerateArgs, level: LogLevel) -> Result<(), String> {
    if args.count == 0 {
        return Err("Count must be at least 1".to_string());
    }
    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let config = spec.acgan_config().generator;
    let (labels, rows, cols) = generation_layout(args.class, config.num_classes, args.count)?;

    log(level, LogLevel::Normal, &format!("Loading generator: {}", args.weights.display()));
    let latent_size = config.latent_size;
    let mut generator =
        load_generator(&args.weights, config).map_err(|e| format!("Load error: {e}"))?;

    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    log(level, LogLevel::Verbose, &format!("  Noise seed: {seed}"));
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = uniform_noise(&mut rng, labels.len(), latent_size);

    let mut ctx = Context::new();
    ctx.eval();
    let images = generator.forward(&noise, &labels, &ctx);

    save_image_grid(&images, rows, cols, &args.output).map_err(|e| format!("Save error: {e}"))?;
    log(
        level,
        LogLevel::Normal,
        &format!("Wrote {} images to {}", labels.len(), args.output.display()),
    );
    Ok(())
}
