//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
///
/// Models hand out their trainable tensors as `&mut Tensor`, so the
/// reference form is the primitive operation and the owned form delegates
/// to it. Parameter order must be stable between calls: per-parameter state
/// is keyed by position.
pub trait Optimizer {
    /// Perform an optimization step on referenced parameters
    fn step_refs(&mut self, params: &mut [&mut Tensor]);

    /// Perform a single optimization step
    fn step(&mut self, params: &mut [Tensor]) {
        let mut refs: Vec<&mut Tensor> = params.iter_mut().collect();
        self.step_refs(&mut refs);
    }

    /// Zero out all gradients
    fn zero_grad(&mut self, params: &mut [Tensor]) {
        for param in params {
            param.zero_grad();
        }
    }

    /// Zero gradients on referenced parameters
    fn zero_grad_refs(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    /// Plain gradient descent, enough to exercise the default methods
    struct TestOptimizer {
        learning_rate: f32,
    }

    impl Optimizer for TestOptimizer {
        fn step_refs(&mut self, params: &mut [&mut Tensor]) {
            for param in params.iter_mut() {
                if let Some(grad) = param.grad() {
                    let lr = self.learning_rate;
                    param.data_mut().zip_mut_with(&grad, |d, g| *d -= lr * g);
                }
            }
        }

        fn lr(&self) -> f32 {
            self.learning_rate
        }

        fn set_lr(&mut self, lr: f32) {
            self.learning_rate = lr;
        }
    }

    #[test]
    fn test_step_delegates_to_step_refs() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        let mut params =
            vec![Tensor::from_vec(vec![1.0, 2.0], true), Tensor::from_vec(vec![3.0, 4.0], true)];
        params[0].set_grad(arr1(&[0.5, 1.0]));
        params[1].set_grad(arr1(&[1.5, 2.0]));

        opt.step(&mut params);

        let data1 = params[0].data().to_vec();
        let data2 = params[1].data().to_vec();
        assert!((data1[0] - 0.95).abs() < 1e-6);
        assert!((data1[1] - 1.9).abs() < 1e-6);
        assert!((data2[0] - 2.85).abs() < 1e-6);
        assert!((data2[1] - 3.8).abs() < 1e-6);
    }

    #[test]
    fn test_step_refs_without_grad_is_noop() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        let mut param = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);

        opt.step_refs(&mut [&mut param]);

        assert_eq!(param.data().to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_zero_grad_clears_gradients() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        let mut params = vec![Tensor::from_vec(vec![1.0, 2.0], true)];
        params[0].set_grad(arr1(&[0.5, 1.0]));

        opt.zero_grad(&mut params);
        assert!(params[0].grad().is_none());

        let mut param = Tensor::from_vec(vec![1.0], true);
        param.set_grad(arr1(&[2.0]));
        opt.zero_grad_refs(&mut [&mut param]);
        assert!(param.grad().is_none());
    }

    #[test]
    fn test_set_lr() {
        let mut opt = TestOptimizer { learning_rate: 0.1 };
        opt.set_lr(0.01);
        assert_eq!(opt.lr(), 0.01);
    }
}
