//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! acgan train acgan.yaml
//! acgan train acgan.yaml --epochs 100 --runs 1 --output-dir ./runs
//! acgan validate acgan.yaml --detailed
//! acgan info acgan.yaml --format json
//! acgan generate --weights r1/params_generator_epoch_000050.safetensors \
//!     --config acgan.yaml --class 1 --count 10 --output melanoma.png
//! ```

mod core;
mod types;

pub use core::{
    apply_overrides, parse_args, Cli, Command, GenerateArgs, InfoArgs, TrainArgs, ValidateArgs,
};
pub use types::OutputFormat;
