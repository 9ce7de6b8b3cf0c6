//! Fully connected layer

use crate::autograd::linear;
use crate::{Result, Tensor};
use rand::Rng;
use std::collections::HashMap;

use super::init::glorot_uniform;
use super::load_into;

/// Dense layer: `y = x W + b` over `[N, in]` inputs
pub struct Linear {
    /// Kernel (in_features x out_features)
    pub weight: Tensor,
    /// Bias (out_features)
    pub bias: Tensor,
}

impl Linear {
    /// Glorot-uniform kernel, zero bias
    pub fn new<R: Rng>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        Self {
            weight: glorot_uniform(rng, &[in_features, out_features], in_features, out_features),
            bias: Tensor::zeros(&[out_features], true),
        }
    }

    pub fn in_features(&self) -> usize {
        self.weight.shape()[0]
    }

    pub fn out_features(&self) -> usize {
        self.weight.shape()[1]
    }

    pub fn forward(&self, x: &Tensor) -> Tensor {
        linear(x, &self.weight, &self.bias)
    }

    pub fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weight, &self.bias]
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }

    pub fn named_tensors(&self, prefix: &str) -> Vec<(String, Tensor)> {
        vec![
            (format!("{prefix}.weight"), self.weight.clone()),
            (format!("{prefix}.bias"), self.bias.clone()),
        ]
    }

    pub fn load_tensors(&mut self, tensors: &HashMap<String, Tensor>, prefix: &str) -> Result<()> {
        load_into(&mut self.weight, tensors, &format!("{prefix}.weight"))?;
        load_into(&mut self.bias, tensors, &format!("{prefix}.bias"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_linear_shapes() {
        let mut rng = StdRng::seed_from_u64(0);
        let layer = Linear::new(4, 3, &mut rng);
        assert_eq!((layer.in_features(), layer.out_features()), (4, 3));

        let y = layer.forward(&Tensor::zeros(&[5, 4], false));
        assert_eq!(y.shape(), &[5, 3]);
        // Zero input and zero bias give zero output
        assert!(y.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_linear_named_tensors() {
        let mut rng = StdRng::seed_from_u64(0);
        let layer = Linear::new(2, 2, &mut rng);
        let names: Vec<String> = layer.named_tensors("head").into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["head.weight", "head.bias"]);
        assert_eq!(layer.parameters().len(), 2);
    }
}
