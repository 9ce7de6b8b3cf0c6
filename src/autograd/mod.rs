//! Tape-based autograd engine
//!
//! Provides reverse-mode automatic differentiation over flat `f32` tensors.
//! Every differentiable op records a [`BackwardOp`] on its result; calling
//! [`backward`] on a scalar loss walks the recorded graph in reverse
//! topological order so each op runs once and shared inputs receive the sum
//! of their gradients.
//!
//! ```
//! use acgan::autograd::{backward, mul, sum, Tensor};
//!
//! let x = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
//! let mut y = sum(&mul(&x, &x));
//! backward(&mut y, None);
//!
//! let grad = x.grad().unwrap();
//! assert_eq!(grad.to_vec(), vec![2.0, 4.0, 6.0]);
//! ```

mod backward;
mod context;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::BackwardOp;
pub use context::Context;
pub use ops::*;
pub use tensor::{GradCell, Tensor};

/// Perform backward pass on a tensor
///
/// Seeds the tensor's gradient with `grad_output` (ones when `None`, the
/// usual case for a scalar loss) and runs every reachable backward op.
pub fn backward(tensor: &mut Tensor, grad_output: Option<ndarray::Array1<f32>>) {
    if let Some(grad) = grad_output {
        tensor.set_grad(grad);
    } else {
        let ones = ndarray::Array1::ones(tensor.data().len());
        tensor.set_grad(ones);
    }

    for op in backward::topological_order(tensor).into_iter().rev() {
        op.backward();
    }
}
