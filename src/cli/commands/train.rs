//! Train command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, read_config, validate_config, validate_paths, TrainArgs};
use crate::train::AcganTrainer;

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("ACGAN: Training from {}", args.config.display()));

    let mut spec = read_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    // Validated once, after overrides, so a flag can repair or break the file
    apply_overrides(&mut spec, &args);
    validate_config(&spec).map_err(|e| format!("Validation failed: {e}"))?;
    validate_paths(&spec).map_err(|e| format!("Validation failed: {e}"))?;

    if args.dry_run {
        log(level, LogLevel::Normal, "Dry run - config and data layout validated successfully");
        log(level, LogLevel::Verbose, &format!("  Images: {}", spec.data.images_dir.display()));
        log(
            level,
            LogLevel::Verbose,
            &format!("  Optimizer: adam (lr={}, beta1={})", spec.optimizer.lr, spec.optimizer.beta1),
        );
        log(
            level,
            LogLevel::Verbose,
            &format!("  Runs: {}, epochs: {}", spec.training.runs, spec.training.epochs),
        );
        log(level, LogLevel::Verbose, &format!("  Batch size: {}", spec.training.batch_size));
        return Ok(());
    }

    let summary = AcganTrainer::new(spec)
        .with_log_level(level)
        .run()
        .map_err(|e| format!("Training error: {e}"))?;

    for run in &summary.runs {
        let accuracy = run.final_accuracy().map_or_else(|| "n/a".to_string(), |a| format!("{a:.4}"));
        log(
            level,
            LogLevel::Verbose,
            &format!(
                "  Run {} ({}): {} epochs, final accuracy {accuracy}, {} checkpoints",
                run.run,
                run.run_dir.display(),
                run.epochs(),
                run.checkpoints.len()
            ),
        );
    }
    log(
        level,
        LogLevel::Normal,
        &format!("Training complete! (seed {}, {:.1}s)", summary.seed, summary.elapsed_secs),
    );
    Ok(())
}
