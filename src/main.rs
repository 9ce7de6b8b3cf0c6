//! ACGAN CLI
//!
//! Trains the melanoma ACGAN and samples lesion images from saved generators.
//!
//! # Usage
//!
//! ```bash
//! # Train from config
//! acgan train config/acgan.yaml
//!
//! # Train with overrides
//! acgan train config/acgan.yaml --epochs 100 --runs 1 --seed 42
//!
//! # Validate config
//! acgan validate config/acgan.yaml --detailed
//!
//! # Show both architectures
//! acgan info config/acgan.yaml
//!
//! # Sample melanoma images from a checkpoint
//! acgan generate -w r1/params_generator_epoch_000050.safetensors -c config/acgan.yaml --class 1 -n 8 -o melanoma.png
//! ```
//!
//! Library diagnostics are controlled with `RUST_LOG` (e.g. `RUST_LOG=acgan=debug`).

use acgan::cli::{run_command, Cli};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "acgan=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
