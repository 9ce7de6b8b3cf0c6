//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{read_config, validate_config, validate_paths, AcganSpec, ValidateArgs};

/// Format data configuration as a string
pub fn format_data_info(spec: &AcganSpec) -> String {
    let data = &spec.data;
    [
        format!("  Images: {}", data.images_dir.display()),
        format!("  Splits: {} / {}", data.train_split, data.test_split),
        format!("  Classes: {}", data.class_dirs.join(", ")),
        format!("  Image size: {0}x{0}", data.image_size),
        format!("  Shuffle: {}", data.shuffle),
    ]
    .join("\n")
}

/// Format model configuration as a string
pub fn format_model_info(spec: &AcganSpec) -> String {
    let model = &spec.model;
    [
        format!("  Latent size: {}", model.latent_size),
        format!(
            "  Generator: {0}x{0}x{1} seed, stages {2:?}, kernel {3}",
            model.seed_size, model.seed_channels, model.generator_channels, model.generator_kernel
        ),
        format!(
            "  Discriminator: filters {:?}, strides {:?}, kernel {}",
            model.discriminator_filters, model.discriminator_strides, model.discriminator_kernel
        ),
        format!("  LeakyReLU slope: {}, dropout: {}", model.leaky_slope, model.dropout),
    ]
    .join("\n")
}

/// Format optimizer configuration as a string
pub fn format_optimizer_info(spec: &AcganSpec) -> String {
    let optim = &spec.optimizer;
    format!(
        "  Optimizer: adam\n  Learning rate: {}\n  Betas: ({}, {})\n  Epsilon: {}",
        optim.lr, optim.beta1, optim.beta2, optim.epsilon
    )
}

/// Format training configuration as a string
pub fn format_training_info(spec: &AcganSpec) -> String {
    let training = &spec.training;
    let mut lines = vec![
        format!("  Runs: {}", training.runs),
        format!("  Epochs: {}", training.epochs),
        format!("  Batch size: {} (eval {})", training.batch_size, training.eval_batch_size),
        format!("  Soft labels: {} / {}", training.soft_zero, training.soft_one),
        format!("  Real-sample class weight: {}", training.real_class_weight),
        format!("  Checkpoint every: {} epochs", training.checkpoint_interval),
        format!("  Output dir: {}", training.output_dir.display()),
    ];
    if let Some(seed) = training.seed {
        lines.push(format!("  Seed: {seed}"));
    }
    lines.join("\n")
}

/// Print detailed configuration summary
pub fn print_detailed_summary(spec: &AcganSpec) {
    println!();
    println!("Configuration Summary:");
    println!("{}", format_data_info(spec));
    println!();
    println!("{}", format_model_info(spec));
    println!();
    println!("{}", format_optimizer_info(spec));
    println!();
    println!("{}", format_training_info(spec));
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("Validating config: {}", args.config.display()));

    let spec = read_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    validate_config(&spec).map_err(|e| format!("Validation failed: {e}"))?;
    if let Err(e) = validate_paths(&spec) {
        log(level, LogLevel::Normal, &format!("Warning: {e}"));
    }

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed {
        print_detailed_summary(&spec);
    }

    Ok(())
}
