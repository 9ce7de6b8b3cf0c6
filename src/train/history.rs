//! Per-epoch loss history

use crate::generative::LossBreakdown;
use crate::io::save_json;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Losses and accuracy of one epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    pub epoch: usize,
    /// Mean of the generator (combined model) batch losses
    pub generator_train: LossBreakdown,
    /// Mean of the discriminator batch losses
    pub discriminator_train: LossBreakdown,
    /// Combined model on fresh samples with hard targets
    pub generator_test: LossBreakdown,
    /// Discriminator on the test images and as many fakes
    pub discriminator_test: LossBreakdown,
    /// Auxiliary-head accuracy on the test images
    pub accuracy: f32,
}

/// Loss series keyed by component, for the train and test phases
///
/// Serialised as
/// `{"train": {"discriminator": [...], "generator": [...]}, "test": {...}, "accuracy": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub train: BTreeMap<String, Vec<LossBreakdown>>,
    pub test: BTreeMap<String, Vec<LossBreakdown>>,
    /// Test-phase classification accuracy
    #[serde(deserialize_with = "nan_series")]
    pub accuracy: Vec<f32>,
}

fn nan_series<'de, D>(deserializer: D) -> std::result::Result<Vec<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Option<f32>>::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f32::NAN)).collect())
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one epoch to every series
    pub fn record(&mut self, stats: &EpochStats) {
        let push = |map: &mut BTreeMap<String, Vec<LossBreakdown>>, key: &str, value| {
            map.entry(key.to_string()).or_default().push(value);
        };
        push(&mut self.train, "generator", stats.generator_train);
        push(&mut self.train, "discriminator", stats.discriminator_train);
        push(&mut self.test, "generator", stats.generator_test);
        push(&mut self.test, "discriminator", stats.discriminator_test);
        self.accuracy.push(stats.accuracy);
    }

    /// Number of recorded epochs
    pub fn epochs(&self) -> usize {
        self.accuracy.len()
    }

    pub fn train_series(&self, component: &str) -> &[LossBreakdown] {
        self.train.get(component).map_or(&[], Vec::as_slice)
    }

    pub fn test_series(&self, component: &str) -> &[LossBreakdown] {
        self.test.get(component).map_or(&[], Vec::as_slice)
    }

    /// Highest test accuracy and the (1-based) epoch it was reached
    pub fn best_accuracy(&self) -> Option<(usize, f32)> {
        self.accuracy
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, a)| !a.is_nan())
            .fold(None, |best: Option<(usize, f32)>, (i, a)| match best {
                Some((_, b)) if b >= a => best,
                _ => Some((i + 1, a)),
            })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}")))
    }
}
