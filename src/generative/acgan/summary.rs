//! Layer-by-layer model summaries.

use serde::Serialize;
use std::fmt;

/// One row of a model summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSummary {
    pub name: String,
    pub kind: String,
    /// Output shape without the batch dimension
    pub output_shape: Vec<usize>,
    pub trainable_params: usize,
    pub non_trainable_params: usize,
}

impl LayerSummary {
    pub fn new(
        name: &str,
        kind: &str,
        output_shape: Vec<usize>,
        trainable_params: usize,
        non_trainable_params: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            output_shape,
            trainable_params,
            non_trainable_params,
        }
    }

    pub fn params(&self) -> usize {
        self.trainable_params + self.non_trainable_params
    }
}

/// Summary of a whole network
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub layers: Vec<LayerSummary>,
}

impl ModelSummary {
    pub fn new(name: &str, layers: Vec<LayerSummary>) -> Self {
        Self { name: name.to_string(), layers }
    }

    pub fn trainable_params(&self) -> usize {
        self.layers.iter().map(|l| l.trainable_params).sum()
    }

    pub fn non_trainable_params(&self) -> usize {
        self.layers.iter().map(|l| l.non_trainable_params).sum()
    }

    pub fn total_params(&self) -> usize {
        self.trainable_params() + self.non_trainable_params()
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.name)?;
        writeln!(f, "{:<28} {:<22} {:>12}", "Layer (type)", "Output Shape", "Param #")?;
        writeln!(f, "{}", "=".repeat(64))?;
        for layer in &self.layers {
            let shape = layer.output_shape.iter().map(ToString::to_string).collect::<Vec<_>>();
            writeln!(
                f,
                "{:<28} {:<22} {:>12}",
                format!("{} ({})", layer.name, layer.kind),
                format!("(None, {})", shape.join(", ")),
                layer.params()
            )?;
        }
        writeln!(f, "{}", "=".repeat(64))?;
        writeln!(f, "Total params: {}", self.total_params())?;
        writeln!(f, "Trainable params: {}", self.trainable_params())?;
        write!(f, "Non-trainable params: {}", self.non_trainable_params())
    }
}
