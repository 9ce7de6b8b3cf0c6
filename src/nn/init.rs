//! Weight initializers

use crate::Tensor;
use rand::Rng;

/// Standard normal sample via Box-Muller
pub(crate) fn standard_normal<R: Rng>(rng: &mut R) -> f32 {
    let u1: f64 = rng.random::<f64>().max(1e-10);
    let u2: f64 = rng.random::<f64>();
    ((-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()) as f32
}

/// Glorot (Xavier) uniform: `U(-limit, limit)`, `limit = √(6 / (fan_in + fan_out))`
pub fn glorot_uniform<R: Rng>(rng: &mut R, shape: &[usize], fan_in: usize, fan_out: usize) -> Tensor {
    let limit = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
    let len: usize = shape.iter().product();
    let data: Vec<f32> = (0..len).map(|_| rng.random_range(-limit..=limit)).collect();
    Tensor::from_shape(data, shape, true)
}

/// Glorot (Xavier) normal, truncated at two standard deviations
///
/// The standard deviation is rescaled so the truncated distribution keeps a
/// variance of `2 / (fan_in + fan_out)`.
pub fn glorot_normal<R: Rng>(rng: &mut R, shape: &[usize], fan_in: usize, fan_out: usize) -> Tensor {
    // Standard deviation of a unit normal truncated to [-2, 2]
    const TRUNCATED_STD: f32 = 0.879_625_66;
    let std = (2.0 / (fan_in + fan_out).max(1) as f32).sqrt() / TRUNCATED_STD;
    let len: usize = shape.iter().product();
    let data: Vec<f32> = (0..len)
        .map(|_| loop {
            let z = standard_normal(rng);
            if z.abs() <= 2.0 {
                break z * std;
            }
        })
        .collect();
    Tensor::from_shape(data, shape, true)
}

/// Fan-in and fan-out of a `[out, in, k, k]` (or `[in, out, k, k]`) kernel
pub fn conv_fans(in_channels: usize, out_channels: usize, kernel: usize) -> (usize, usize) {
    let receptive = kernel * kernel;
    (in_channels * receptive, out_channels * receptive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_glorot_uniform_within_limit() {
        let mut rng = StdRng::seed_from_u64(0);
        let t = glorot_uniform(&mut rng, &[20, 30], 20, 30);
        let limit = (6.0f32 / 50.0).sqrt();
        assert_eq!(t.shape(), &[20, 30]);
        assert!(t.requires_grad());
        assert!(t.data().iter().all(|v| v.abs() <= limit));
    }

    #[test]
    fn test_glorot_normal_variance() {
        let mut rng = StdRng::seed_from_u64(1);
        let (fan_in, fan_out) = (100, 100);
        let t = glorot_normal(&mut rng, &[fan_in, fan_out], fan_in, fan_out);

        let n = t.len() as f32;
        let mean = t.data().sum() / n;
        let var = t.data().iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        let expected = 2.0 / (fan_in + fan_out) as f32;

        assert!(mean.abs() < 5e-3, "mean {mean}");
        assert!((var / expected - 1.0).abs() < 0.05, "var {var} vs {expected}");
    }

    #[test]
    fn test_conv_fans() {
        assert_eq!(conv_fans(3, 16, 3), (27, 144));
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = glorot_normal(&mut StdRng::seed_from_u64(7), &[4, 4], 4, 4);
        let b = glorot_normal(&mut StdRng::seed_from_u64(7), &[4, 4], 4, 4);
        assert_eq!(a.data(), b.data());
    }

    proptest! {
        #[test]
        fn prop_glorot_normal_is_truncated(seed in 0u64..1000, fan in 1usize..64) {
            let mut rng = StdRng::seed_from_u64(seed);
            let t = glorot_normal(&mut rng, &[fan, 8], fan, 8);
            let bound = 2.0 * (2.0 / (fan + 8) as f32).sqrt() / 0.879_625_66 + 1e-6;
            prop_assert!(t.data().iter().all(|v| v.abs() <= bound));
        }
    }
}
