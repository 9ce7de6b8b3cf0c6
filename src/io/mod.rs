//! Persistence: network weights, training history and sample grids
//!
//! - Weights: safetensors with name/epoch/timestamp in the header
//! - History and other records: pretty JSON
//! - Generated samples: PNG grids

mod grid;
mod load;
mod model;
mod save;

pub use grid::{image_grid, save_image_grid};
pub use load::load_weights;
pub use model::{Model, ModelMetadata};
pub use save::{save_json, save_weights};
