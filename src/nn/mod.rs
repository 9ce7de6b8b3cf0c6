//! Neural network layers
//!
//! Layers own their parameter tensors and build autograd graphs in
//! `forward`. Parameters are exchanged with weight files by name
//! (`{prefix}.weight`, `{prefix}.bias`, ...).

mod batch_norm;
mod conv;
mod embedding;
pub mod init;
mod linear;

pub use batch_norm::BatchNorm2d;
pub use conv::{Conv2d, ConvTranspose2d};
pub use embedding::Embedding;
pub use linear::Linear;

use crate::{Error, Result, Tensor};
use std::collections::HashMap;

/// Replace `target`'s data with the tensor stored under `name`
///
/// The stored tensor must have exactly the target's shape; the target keeps
/// its `requires_grad` flag.
pub(crate) fn load_into(target: &mut Tensor, tensors: &HashMap<String, Tensor>, name: &str) -> Result<()> {
    let source = tensors
        .get(name)
        .ok_or_else(|| Error::Serialization(format!("missing tensor '{name}'")))?;
    if source.shape() != target.shape() {
        return Err(Error::ShapeMismatch {
            name: name.to_string(),
            expected: target.shape().to_vec(),
            got: source.shape().to_vec(),
        });
    }
    *target = Tensor::from_array(source.data().clone(), target.shape().to_vec(), target.requires_grad());
    Ok(())
}
