//! Activation function autograd operations: relu, leaky_relu, tanh, sigmoid, softmax, dropout

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::{Array1, Axis};
use rand::Rng;
use std::rc::Rc;

/// ReLU activation
pub fn relu(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| x.max(0.0));
    let local = a.data().mapv(|x| if x > 0.0 { 1.0 } else { 0.0 });
    elementwise(a, data, local)
}

/// Leaky ReLU: `x` for positive inputs, `alpha * x` otherwise
pub fn leaky_relu(a: &Tensor, alpha: f32) -> Tensor {
    let data = a.data().mapv(|x| if x > 0.0 { x } else { alpha * x });
    let local = a.data().mapv(|x| if x > 0.0 { 1.0 } else { alpha });
    elementwise(a, data, local)
}

/// Hyperbolic tangent
pub fn tanh(a: &Tensor) -> Tensor {
    let data = a.data().mapv(f32::tanh);
    // ∂tanh/∂x = 1 - tanh²
    let local = data.mapv(|y| 1.0 - y * y);
    elementwise(a, data, local)
}

/// Numerically stable logistic sigmoid of a single value
pub fn sigmoid_scalar(v: f32) -> f32 {
    if v >= 0.0 {
        1.0 / (1.0 + (-v).exp())
    } else {
        let exp_v = v.exp();
        exp_v / (1.0 + exp_v)
    }
}

/// Logistic sigmoid
pub fn sigmoid(a: &Tensor) -> Tensor {
    let data = a.data().mapv(sigmoid_scalar);
    let local = data.mapv(|s| s * (1.0 - s));
    elementwise(a, data, local)
}

/// Inverted dropout
///
/// Zeroes each element with probability `rate` and scales survivors by
/// `1 / (1 - rate)`. A rate of zero returns the input unchanged.
pub fn dropout<R: Rng>(a: &Tensor, rate: f32, rng: &mut R) -> Tensor {
    assert!((0.0..1.0).contains(&rate), "dropout rate must be in [0, 1), got {rate}");
    if rate == 0.0 {
        return a.clone();
    }
    let keep = 1.0 / (1.0 - rate);
    let mask: Array1<f32> =
        (0..a.len()).map(|_| if rng.random::<f32>() < rate { 0.0 } else { keep }).collect();
    let data = a.data() * &mask;
    elementwise(a, data, mask)
}

/// Record an element-wise op whose derivative is known at forward time
fn elementwise(a: &Tensor, data: Array1<f32>, local: Array1<f32>) -> Tensor {
    let requires_grad = a.requires_grad();
    let mut result = Tensor::from_array(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ElementwiseBackward {
            a: a.clone(),
            local,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ElementwiseBackward {
    a: Tensor,
    local: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for ElementwiseBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂a = ∂L/∂out * f'(a)
                self.a.accumulate_grad(grad * &self.local);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Row-wise softmax of a `[rows, cols]` tensor
pub fn softmax(a: &Tensor) -> Tensor {
    let (rows, cols) = matrix_dims(a);
    let input = a.data().view().into_shape_with_order((rows, cols)).expect("softmax shape");

    let mut probs = input.to_owned();
    for mut row in probs.axis_iter_mut(Axis(0)) {
        let max = row.iter().fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let total = row.sum();
        row.mapv_inplace(|v| v / total);
    }
    let data: Array1<f32> = probs.iter().copied().collect();

    let requires_grad = a.requires_grad();
    let mut result = Tensor::from_array(data.clone(), a.shape().to_vec(), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(SoftmaxBackward {
            a: a.clone(),
            probs: data,
            cols,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct SoftmaxBackward {
    a: Tensor,
    probs: Array1<f32>,
    cols: usize,
    result_grad: GradCell,
}

impl BackwardOp for SoftmaxBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.a.requires_grad() {
                // ∂L/∂x_i = y_i * (g_i - Σ_j g_j y_j), per row
                let mut grad_a = Array1::zeros(self.probs.len());
                for (r, (y, g)) in self
                    .probs
                    .exact_chunks(self.cols)
                    .into_iter()
                    .zip(grad.exact_chunks(self.cols))
                    .enumerate()
                {
                    let dot: f32 = y.iter().zip(g.iter()).map(|(a, b)| a * b).sum();
                    for c in 0..self.cols {
                        grad_a[r * self.cols + c] = y[c] * (g[c] - dot);
                    }
                }
                self.a.accumulate_grad(grad_a);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone()]
    }
}

/// Interpret a tensor as a matrix: `[rows, cols]`, or one row for 1-D input
fn matrix_dims(a: &Tensor) -> (usize, usize) {
    match a.shape() {
        [cols] => (1, *cols),
        [rows, cols] => (*rows, *cols),
        other => panic!("expected a 1-D or 2-D tensor, got shape {other:?}"),
    }
}
