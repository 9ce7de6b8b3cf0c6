//! Weight loading

use super::model::{Model, ModelMetadata};
use crate::{Error, Result, Tensor};
use safetensors::tensor::Dtype;
use safetensors::SafeTensors;
use std::path::Path;

/// Load a model saved by [`save_weights`](super::save_weights)
///
/// Tensors keep their stored shapes and are created without gradient
/// tracking; the network loaders restore the flag.
///
/// # Example
///
/// ```no_run
/// use acgan::io::load_weights;
///
/// let model = load_weights("params_generator_epoch_000050.safetensors").expect("failed to load");
/// println!("Loaded {} (epoch {:?})", model.metadata.name, model.metadata.epoch);
/// ```
pub fn load_weights(path: impl AsRef<Path>) -> Result<Model> {
    let data = std::fs::read(path)?;

    let (_, header) = SafeTensors::read_metadata(&data)
        .map_err(|e| Error::Serialization(format!("SafeTensors parsing failed: {e}")))?;
    let metadata = ModelMetadata::from_header(header.metadata().clone().unwrap_or_default());

    let tensors = SafeTensors::deserialize(&data)
        .map_err(|e| Error::Serialization(format!("SafeTensors parsing failed: {e}")))?;

    let mut names = tensors.names();
    names.sort_unstable();

    let parameters = names
        .into_iter()
        .map(|name| {
            let view = tensors
                .tensor(name)
                .map_err(|e| Error::Serialization(format!("tensor '{name}': {e}")))?;
            if view.dtype() != Dtype::F32 {
                return Err(Error::Serialization(format!(
                    "tensor '{name}' has dtype {:?}, expected F32",
                    view.dtype()
                )));
            }
            // The byte buffer is not guaranteed to be 4-byte aligned
            let values: Vec<f32> = bytemuck::pod_collect_to_vec(view.data());
            Ok((name.to_string(), Tensor::from_shape(values, view.shape(), false)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Model::new(metadata, parameters))
}
