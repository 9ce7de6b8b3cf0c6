//! Evaluation metrics for training and validation

mod classification;
mod trait_def;


pub use classification::Accuracy;
pub(crate) use classification::argmax_rows;
pub use trait_def::Metric;
