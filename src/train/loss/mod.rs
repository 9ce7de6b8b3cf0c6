//! Loss functions for training
//!
//! - [`BCEWithLogitsLoss`] - real/fake decision on logits, soft targets allowed
//! - [`CrossEntropyLoss`] - sparse categorical cross entropy on logits
//!
//! Both support per-sample weights through [`LossFn::forward_weighted`].

mod bce_with_logits;
mod cross_entropy;
mod traits;
mod weighted;

pub use bce_with_logits::BCEWithLogitsLoss;
pub use cross_entropy::CrossEntropyLoss;
pub use traits::LossFn;
