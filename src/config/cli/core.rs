//! Core CLI types - Cli, Command, and argument structs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types::OutputFormat;

/// Auxiliary-classifier GAN for melanoma classification and lesion synthesis
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "acgan")]
#[command(version)]
#[command(about = "Train an ACGAN on skin-lesion images and generate class-conditional samples")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train from a YAML configuration
    Train(TrainArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),

    /// Display the architecture described by a configuration
    Info(InfoArgs),

    /// Generate images from saved generator weights
    Generate(GenerateArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override image directory
    #[arg(long)]
    pub images_dir: Option<PathBuf>,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override number of runs
    #[arg(short, long)]
    pub runs: Option<usize>,

    /// Override batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Override learning rate
    #[arg(short, long)]
    pub lr: Option<f32>,

    /// Save weights, history and samples every N epochs
    #[arg(long)]
    pub checkpoint_every: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Dry run (validate config and data but don't train)
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Show detailed validation report
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the generate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct GenerateArgs {
    /// Generator weights (`params_generator_epoch_*.safetensors`)
    #[arg(short, long)]
    pub weights: PathBuf,

    /// Configuration the weights were trained with
    #[arg(short, long)]
    pub config: PathBuf,

    /// Class to generate; every class when omitted
    #[arg(long = "class")]
    pub class: Option<usize>,

    /// Images per class
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: usize,

    /// Output PNG grid
    #[arg(short, long)]
    pub output: PathBuf,

    /// Random seed for the latent noise
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to an AcganSpec
pub fn apply_overrides(spec: &mut crate::config::AcganSpec, args: &TrainArgs) {
    if let Some(output_dir) = &args.output_dir {
        spec.training.output_dir = output_dir.clone();
    }
    if let Some(images_dir) = &args.images_dir {
        spec.data.images_dir = images_dir.clone();
    }
    if let Some(epochs) = args.epochs {
        spec.training.epochs = epochs;
    }
    if let Some(runs) = args.runs {
        spec.training.runs = runs;
    }
    if let Some(batch_size) = args.batch_size {
        spec.training.batch_size = batch_size;
    }
    if let Some(lr) = args.lr {
        spec.optimizer.lr = lr;
    }
    if let Some(every) = args.checkpoint_every {
        spec.training.checkpoint_interval = every;
    }
    if let Some(seed) = args.seed {
        spec.training.seed = Some(seed);
    }
}
