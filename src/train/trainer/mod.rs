//! Run/epoch training loop of the ACGAN
//!
//! [`AcganTrainer`] loads the image folder once, then for every run trains
//! freshly initialised networks for the configured number of epochs:
//!
//! - one discriminator step on `real ‖ fake` and one generator step per batch
//! - a test phase on the held-out split after every epoch
//! - the epoch report on the console and the loss history
//! - weights, history and a sample grid every `checkpoint_interval` epochs
//!
//! # Example
//!
//! ```no_run
//! use acgan::config::load_config;
//! use acgan::train::AcganTrainer;
//!
//! let spec = load_config("config/acgan.yaml").unwrap();
//! let summary = AcganTrainer::new(spec).run().unwrap();
//! println!("{} runs in {:.1}s", summary.runs.len(), summary.elapsed_secs);
//! ```

mod core;
mod epoch;
mod result;

pub use core::AcganTrainer;
pub use result::{RunSummary, TrainingSummary};
