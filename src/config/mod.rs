//! Declarative configuration: YAML schema, validation and command line

mod cli;
mod schema;
mod train;
pub mod validate;

pub use cli::{
    apply_overrides, parse_args, Cli, Command, GenerateArgs, InfoArgs, OutputFormat, TrainArgs,
    ValidateArgs,
};
pub use schema::{AcganSpec, DataSpec, ModelSpec, OptimSpec, TrainingParams};
pub use train::{load_config, parse_config, parse_spec, read_config};
pub use validate::{validate_config, validate_paths, ValidationError};
