//! Class embedding table

use crate::autograd::embedding;
use crate::{Result, Tensor};
use rand::Rng;
use std::collections::HashMap;

use super::init::glorot_normal;
use super::load_into;

/// Lookup table mapping a class index to a dense vector
pub struct Embedding {
    /// Table (num_embeddings x dim)
    pub weight: Tensor,
}

impl Embedding {
    /// Glorot-normal table
    pub fn new<R: Rng>(num_embeddings: usize, dim: usize, rng: &mut R) -> Self {
        Self { weight: glorot_normal(rng, &[num_embeddings, dim], num_embeddings, dim) }
    }

    pub fn num_embeddings(&self) -> usize {
        self.weight.shape()[0]
    }

    pub fn dim(&self) -> usize {
        self.weight.shape()[1]
    }

    /// Rows of the table for `ids`, as `[ids.len(), dim]`
    pub fn forward(&self, ids: &[usize]) -> Tensor {
        embedding(&self.weight, ids)
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight]
    }

    pub fn named_tensors(&self, prefix: &str) -> Vec<(String, Tensor)> {
        vec![(format!("{prefix}.weight"), self.weight.clone())]
    }

    pub fn load_tensors(&mut self, tensors: &HashMap<String, Tensor>, prefix: &str) -> Result<()> {
        load_into(&mut self.weight, tensors, &format!("{prefix}.weight"))
    }
}
