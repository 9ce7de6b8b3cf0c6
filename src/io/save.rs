//! Weight and history saving

use super::model::Model;
use crate::{Error, Result};
use safetensors::tensor::{Dtype, TensorView};
use serde::Serialize;
use std::path::Path;

/// Save a model's tensors as safetensors
///
/// Shapes are stored as-is; the metadata goes into the file header with a
/// `saved_at` timestamp filled in when absent.
///
/// # Example
///
/// ```no_run
/// use acgan::io::{save_weights, Model, ModelMetadata};
/// # use acgan::Tensor;
///
/// let params = vec![("weight".to_string(), Tensor::from_vec(vec![1.0, 2.0], true))];
/// let model = Model::new(ModelMetadata::new("my-model", "linear"), params);
///
/// save_weights(&model, "model.safetensors").unwrap();
/// ```
pub fn save_weights(model: &Model, path: impl AsRef<Path>) -> Result<()> {
    let tensor_data: Vec<(&str, Vec<u8>, Vec<usize>)> = model
        .parameters
        .iter()
        .map(|(name, tensor)| {
            let bytes: Vec<u8> = bytemuck::cast_slice(tensor.as_slice()).to_vec();
            (name.as_str(), bytes, tensor.shape().to_vec())
        })
        .collect();

    let views = tensor_data
        .iter()
        .map(|(name, bytes, shape)| {
            TensorView::new(Dtype::F32, shape.clone(), bytes)
                .map(|view| (*name, view))
                .map_err(|e| Error::Serialization(format!("invalid tensor '{name}': {e}")))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut metadata = model.metadata.clone();
    if metadata.saved_at.is_none() {
        metadata.saved_at = Some(chrono::Utc::now().to_rfc3339());
    }

    let bytes = safetensors::serialize(views, Some(metadata.to_header()))
        .map_err(|e| Error::Serialization(format!("SafeTensors serialization failed: {e}")))?;
    std::fs::write(path, bytes)?;

    Ok(())
}

/// Write any serializable value as pretty JSON
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?;
    std::fs::write(path, json)?;
    Ok(())
}
