//! Latent-space and class-label sampling.

use crate::Tensor;
use rand::Rng;

/// `[n, latent_size]` noise drawn from `U(-1, 1)`
pub fn uniform_noise<R: Rng>(rng: &mut R, n: usize, latent_size: usize) -> Tensor {
    let data: Vec<f32> = (0..n * latent_size).map(|_| rng.random_range(-1.0..1.0)).collect();
    Tensor::from_shape(data, &[n, latent_size], false)
}

/// `n` class labels drawn uniformly from `0..num_classes`
pub fn sample_labels<R: Rng>(rng: &mut R, n: usize, num_classes: usize) -> Vec<usize> {
    (0..n).map(|_| rng.random_range(0..num_classes)).collect()
}

/// `per_class` copies of each class label, in class order
pub fn class_grid(num_classes: usize, per_class: usize) -> Vec<usize> {
    (0..num_classes).flat_map(|c| std::iter::repeat(c).take(per_class)).collect()
}

/// Labels as the `f32` targets expected by the loss functions
pub fn labels_to_tensor(labels: &[usize]) -> Tensor {
    Tensor::from_vec(labels.iter().map(|&l| l as f32).collect(), false)
}
