//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Image directory does not exist: {0}")]
    ImagesDirNotFound(String),

    #[error("Split directory does not exist: {0}")]
    SplitNotFound(String),

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid Adam {name}: {value} (must be in [0.0, 1.0))")]
    InvalidBeta { name: &'static str, value: f32 },

    #[error("Invalid Adam epsilon: {0} (must be > 0.0)")]
    InvalidEpsilon(f32),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid runs: {0} (must be > 0)")]
    InvalidRuns(usize),

    #[error("Invalid checkpoint interval: {0} (must be > 0)")]
    InvalidCheckpointInterval(usize),

    #[error("Invalid soft labels: zero={zero}, one={one} (need 0.0 <= zero < one <= 1.0)")]
    InvalidSoftLabels { zero: f32, one: f32 },

    #[error("Invalid class weight: {0} (must be >= 0.0)")]
    InvalidClassWeight(f32),

    #[error("Invalid dropout: {0} (must be in [0.0, 1.0))")]
    InvalidDropout(f32),

    #[error("Invalid LeakyReLU slope: {0} (must be >= 0.0)")]
    InvalidLeakySlope(f32),

    #[error("At least two class directories are required, got {0}")]
    TooFewClasses(usize),

    #[error("Invalid {name}: must be > 0")]
    ZeroSize { name: &'static str },

    #[error("Discriminator has {filters} filter entries but {strides} strides")]
    StrideCountMismatch { filters: usize, strides: usize },

    #[error("Generator produces {generated}x{generated} images but image_size is {expected}")]
    GeometryMismatch { generated: usize, expected: usize },

    #[error("Invalid sample grid: {rows}x{cols} (must be > 0)")]
    InvalidSampleGrid { rows: usize, cols: usize },
}
