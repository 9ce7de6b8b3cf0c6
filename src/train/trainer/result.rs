//! Training result types

use crate::train::checkpoint::Checkpoint;
use crate::train::history::History;
use std::path::PathBuf;

/// Outcome of one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// 1-based run number
    pub run: usize,
    /// Seed the networks and sampling of the run were derived from
    pub seed: u64,
    pub run_dir: PathBuf,
    pub history: History,
    /// Checkpoints in epoch order
    pub checkpoints: Vec<Checkpoint>,
    pub elapsed_secs: f64,
}

impl RunSummary {
    pub fn epochs(&self) -> usize {
        self.history.epochs()
    }

    /// Test accuracy after the last epoch
    pub fn final_accuracy(&self) -> Option<f32> {
        self.history.accuracy.last().copied()
    }
}

/// Outcome of all runs
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    /// Base seed; run `r` used `seed + r`
    pub seed: u64,
    pub runs: Vec<RunSummary>,
    pub elapsed_secs: f64,
}
