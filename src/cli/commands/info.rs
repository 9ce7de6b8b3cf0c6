//! Info command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, AcganSpec, InfoArgs, OutputFormat};
use crate::generative::acgan::ModelSummary;
use crate::generative::{Discriminator, Generator};
use serde::Serialize;

/// Configuration together with the architectures it describes
#[derive(Serialize)]
struct InfoReport<'a> {
    config: &'a AcganSpec,
    generator: ModelSummary,
    discriminator: ModelSummary,
}

/// Layer tables of both networks built from `spec`
pub fn model_summaries(spec: &AcganSpec) -> (ModelSummary, ModelSummary) {
    let config = spec.acgan_config();
    let generator = Generator::with_seed(config.generator, 0).summary();
    let discriminator = Discriminator::with_seed(config.discriminator, 0).summary();
    (generator, discriminator)
}

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    let (generator, discriminator) = model_summaries(&spec);

    match args.format {
        OutputFormat::Text => {
            log(level, LogLevel::Normal, "Configuration Info:");
            println!();
            println!("Images: {} ({}x{})", spec.data.images_dir.display(), spec.data.image_size, spec.data.image_size);
            println!("Classes: {}", spec.data.class_dirs.join(", "));
            println!("Optimizer: adam (lr={}, beta1={})", spec.optimizer.lr, spec.optimizer.beta1);
            println!("Runs: {}, epochs: {}", spec.training.runs, spec.training.epochs);
            println!("Batch size: {}", spec.training.batch_size);
            println!();
            println!("{discriminator}");
            println!();
            println!("{generator}");
        }
        OutputFormat::Json => {
            let report = InfoReport { config: &spec, generator, discriminator };
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let report = InfoReport { config: &spec, generator, discriminator };
            let yaml =
                serde_yaml::to_string(&report).map_err(|e| format!("YAML serialization error: {e}"))?;
            println!("{yaml}");
        }
    }

    Ok(())
}
