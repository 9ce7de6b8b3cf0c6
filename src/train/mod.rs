//! High-level training loop
//!
//! This module provides the ACGAN training framework:
//! - Loss functions (binary cross entropy on logits, sparse categorical
//!   cross entropy) with per-sample weights
//! - Classification accuracy
//! - The run/epoch trainer with its test phase
//! - Loss history and the epoch report
//! - Periodic checkpoints of weights, history and sample grids
//!
//! # Example
//!
//! ```no_run
//! use acgan::config::AcganSpec;
//! use acgan::train::AcganTrainer;
//!
//! let mut spec = AcganSpec::default();
//! spec.training.epochs = 10;
//! spec.training.runs = 1;
//!
//! let summary = AcganTrainer::new(spec).run().unwrap();
//! for run in &summary.runs {
//!     println!("run {}: accuracy {:?}", run.run, run.final_accuracy());
//! }
//! ```

mod checkpoint;
mod history;
mod loss;
mod metrics;
mod report;
mod trainer;

pub use checkpoint::{
    discriminator_weights_path, generator_weights_path, load_generator, sample_grid_path,
    save_checkpoint, Checkpoint, SampleGrid, HISTORY_FILE,
};
pub use history::{EpochStats, History};
pub use loss::{BCEWithLogitsLoss, CrossEntropyLoss, LossFn};
pub(crate) use metrics::argmax_rows;
pub use metrics::{Accuracy, Metric};
pub use report::format_epoch_report;
pub use trainer::{AcganTrainer, RunSummary, TrainingSummary};
