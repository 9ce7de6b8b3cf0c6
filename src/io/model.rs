//! Named weight collections with their metadata

use crate::Tensor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata stored alongside saved weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name (e.g. "generator")
    pub name: String,

    /// Architecture identifier
    pub architecture: String,

    /// Training epoch the weights belong to
    pub epoch: Option<usize>,

    /// RFC 3339 timestamp of the save
    pub saved_at: Option<String>,

    /// Custom metadata fields
    pub custom: HashMap<String, String>,
}

impl ModelMetadata {
    /// Create new metadata with minimal fields
    pub fn new(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.into(),
            epoch: None,
            saved_at: None,
            custom: HashMap::new(),
        }
    }

    pub fn with_epoch(mut self, epoch: usize) -> Self {
        self.epoch = Some(epoch);
        self
    }

    /// Add custom metadata field
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }

    /// Flatten into the string map safetensors stores in its header
    pub(crate) fn to_header(&self) -> HashMap<String, String> {
        let mut header = self.custom.clone();
        header.insert("name".to_string(), self.name.clone());
        header.insert("architecture".to_string(), self.architecture.clone());
        if let Some(epoch) = self.epoch {
            header.insert("epoch".to_string(), epoch.to_string());
        }
        if let Some(saved_at) = &self.saved_at {
            header.insert("saved_at".to_string(), saved_at.clone());
        }
        header
    }

    /// Rebuild from a safetensors header; unknown keys land in `custom`
    pub(crate) fn from_header(mut header: HashMap<String, String>) -> Self {
        let name = header.remove("name").unwrap_or_else(|| "unknown".to_string());
        let architecture = header.remove("architecture").unwrap_or_else(|| "unknown".to_string());
        let epoch = header.remove("epoch").and_then(|e| e.parse().ok());
        let saved_at = header.remove("saved_at");
        Self { name, architecture, epoch, saved_at, custom: header }
    }
}

/// Named tensors of one network, ready to save or restore
pub struct Model {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Model parameters
    pub parameters: Vec<(String, Tensor)>,
}

impl Model {
    /// Create a new model
    pub fn new(metadata: ModelMetadata, parameters: Vec<(String, Tensor)>) -> Self {
        Self { metadata, parameters }
    }

    /// Get parameter by name
    pub fn get_parameter(&self, name: &str) -> Option<&Tensor> {
        self.parameters.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Total number of scalar values
    pub fn num_values(&self) -> usize {
        self.parameters.iter().map(|(_, t)| t.len()).sum()
    }

    /// Parameters keyed by name, as the network loaders expect
    pub fn tensor_map(&self) -> HashMap<String, Tensor> {
        self.parameters.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let mut metadata = ModelMetadata::new("generator", "acgan").with_epoch(50).with_custom("run", "3");
        metadata.saved_at = Some("2026-01-01T00:00:00+00:00".to_string());

        let restored = ModelMetadata::from_header(metadata.to_header());
        assert_eq!(restored, metadata);
    }

    #[test]
    fn test_from_header_defaults() {
        let restored = ModelMetadata::from_header(HashMap::from([("epoch".to_string(), "x".to_string())]));
        assert_eq!(restored.name, "unknown");
        assert_eq!(restored.epoch, None);
        assert!(restored.custom.is_empty());
    }

    #[test]
    fn test_model_lookup() {
        let model = Model::new(
            ModelMetadata::new("m", "linear"),
            vec![
                ("weight".to_string(), Tensor::from_vec(vec![1.0, 2.0], true)),
                ("bias".to_string(), Tensor::from_vec(vec![0.5], true)),
            ],
        );
        assert_eq!(model.get_parameter("bias").map(Tensor::len), Some(1));
        assert!(model.get_parameter("missing").is_none());
        assert_eq!(model.num_values(), 3);
        assert_eq!(model.tensor_map().len(), 2);
    }
}
