//! Core AcganTrainer struct and the run loop

use crate::cli::{log, LogLevel};
use crate::config::AcganSpec;
use crate::data::{load_splits, ImageFolder, SplitData};
use crate::generative::Acgan;
use crate::train::checkpoint::{save_checkpoint, SampleGrid};
use crate::train::history::History;
use crate::train::report::format_epoch_report;
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::result::{RunSummary, TrainingSummary};

/// Trains the ACGAN described by an [`AcganSpec`]
pub struct AcganTrainer {
    pub(crate) spec: AcganSpec,
    pub(crate) log_level: LogLevel,
}

impl AcganTrainer {
    pub fn new(spec: AcganSpec) -> Self {
        Self { spec, log_level: LogLevel::Normal }
    }

    /// Console verbosity of the epoch reports
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn spec(&self) -> &AcganSpec {
        &self.spec
    }

    /// Directory of run `run` under the output directory
    pub fn run_dir(&self, run: usize) -> PathBuf {
        self.spec.training.output_dir.join(format!("r{run}"))
    }

    /// Load the data and train every run
    ///
    /// Run `r` is seeded with `seed + r`; without a configured seed one is
    /// drawn from the OS and logged.
    pub fn run(&self) -> Result<TrainingSummary> {
        let start = Instant::now();
        let base_seed = self.spec.training.seed.unwrap_or_else(|| rand::rng().random());
        tracing::info!(seed = base_seed, "starting training");

        let data_spec = &self.spec.data;
        let folder =
            ImageFolder::new(&data_spec.images_dir, data_spec.class_dirs.clone(), data_spec.image_size);
        let mut rng = StdRng::seed_from_u64(base_seed);
        let data = load_splits(
            &folder,
            &data_spec.train_split,
            &data_spec.test_split,
            data_spec.shuffle,
            &mut rng,
        )?;

        std::fs::create_dir_all(&self.spec.training.output_dir)?;

        let total_runs = self.spec.training.runs;
        let mut runs = Vec::with_capacity(total_runs);
        for run in 1..=total_runs {
            log(self.log_level, LogLevel::Normal, &format!("Run {run}/{total_runs}"));
            runs.push(self.train_run(run, base_seed.wrapping_add(run as u64), &data)?);
        }

        Ok(TrainingSummary { seed: base_seed, runs, elapsed_secs: start.elapsed().as_secs_f64() })
    }

    /// Train freshly initialised networks for one run
    pub fn train_run(&self, run: usize, seed: u64, data: &SplitData) -> Result<RunSummary> {
        let start = Instant::now();
        let run_dir = self.run_dir(run);
        create_run_dir(&run_dir)?;

        let params = &self.spec.training;
        let mut gan = Acgan::new(self.spec.acgan_config(), seed);
        let mut history = History::new();
        let mut checkpoints = Vec::new();
        let grid = SampleGrid { rows_per_class: params.sample_rows, cols: params.sample_cols };

        for epoch in 1..=params.epochs {
            log(self.log_level, LogLevel::Normal, &format!("Epoch {epoch}/{}", params.epochs));

            let (generator_train, discriminator_train) = self.train_epoch(&mut gan, &data.train);
            log(self.log_level, LogLevel::Verbose, &format!("Testing for epoch {epoch}:"));
            let stats = self.test_epoch(&mut gan, &data.test, epoch, generator_train, discriminator_train);
            history.record(&stats);

            log(self.log_level, LogLevel::Normal, &format!("Discriminator accuracy: {}", stats.accuracy));
            log(self.log_level, LogLevel::Normal, &format_epoch_report(&stats));

            if epoch % params.checkpoint_interval == 0 {
                checkpoints.push(save_checkpoint(&mut gan, &history, &run_dir, run, epoch, grid)?);
            }
        }

        Ok(RunSummary {
            run,
            seed,
            run_dir,
            history,
            checkpoints,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }
}

/// Create a run directory that must not exist yet
fn create_run_dir(path: &Path) -> Result<()> {
    std::fs::create_dir(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => Error::RunExists(path.to_path_buf()),
        _ => Error::Io(e),
    })
}
