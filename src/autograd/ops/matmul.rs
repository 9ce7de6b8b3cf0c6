//! Matrix multiplication autograd operations: matmul, linear

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::linalg::general_mat_mul;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use std::rc::Rc;

/// Row-major view of a flat buffer
#[inline]
pub(crate) fn view2(data: &[f32], rows: usize, cols: usize) -> ArrayView2<'_, f32> {
    ArrayView2::from_shape((rows, cols), data).expect("buffer matches matrix dimensions")
}

/// Flatten a matrix in logical (row-major) order
#[inline]
pub(crate) fn flatten(matrix: &Array2<f32>) -> Array1<f32> {
    matrix.iter().copied().collect()
}

/// Compute `a[m,k] · b[k,n]` into a flat row-major buffer
pub fn matmul_compute(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let c = view2(a, m, k).dot(&view2(b, k, n));
    c.iter().copied().collect()
}

/// Matrix product of `a[m,k]` and `b[k,n]`
pub fn matmul(a: &Tensor, b: &Tensor) -> Tensor {
    let (m, k) = dims2(a);
    let (k2, n) = dims2(b);
    assert_eq!(k, k2, "matmul inner dimensions differ: {k} vs {k2}");

    let data = Array1::from(matmul_compute(a.as_slice(), b.as_slice(), m, k, n));
    let requires_grad = a.requires_grad() || b.requires_grad();
    let mut result = Tensor::from_array(data, vec![m, n], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(LinearBackward {
            x: a.clone(),
            w: b.clone(),
            bias: None,
            dims: (m, k, n),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

/// Affine map `x[n,in] · w[in,out] + b[out]`
pub fn linear(x: &Tensor, w: &Tensor, b: &Tensor) -> Tensor {
    let (n, k) = dims2(x);
    let (k2, out) = dims2(w);
    assert_eq!(k, k2, "linear input features differ: {k} vs {k2}");
    assert_eq!(b.len(), out, "linear bias length {} != {out}", b.len());

    let mut y = view2(x.as_slice(), n, k).dot(&view2(w.as_slice(), k, out));
    y += &b.data().view();
    let data = flatten(&y);

    let requires_grad = x.requires_grad() || w.requires_grad() || b.requires_grad();
    let mut result = Tensor::from_array(data, vec![n, out], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(LinearBackward {
            x: x.clone(),
            w: w.clone(),
            bias: Some(b.clone()),
            dims: (n, k, out),
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct LinearBackward {
    x: Tensor,
    w: Tensor,
    bias: Option<Tensor>,
    dims: (usize, usize, usize),
    result_grad: GradCell,
}

impl BackwardOp for LinearBackward {
    fn backward(&self) {
        let (m, k, n) = self.dims;
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let grad = view2(grad.as_slice().expect("gradient is contiguous"), m, n);

            if self.x.requires_grad() {
                // ∂L/∂x = ∂L/∂y · wᵀ
                let grad_x = grad.dot(&view2(self.w.as_slice(), k, n).t());
                self.x.accumulate_grad(flatten(&grad_x));
            }
            if self.w.requires_grad() {
                // ∂L/∂w = xᵀ · ∂L/∂y
                let mut grad_w = Array2::zeros((k, n));
                general_mat_mul(1.0, &view2(self.x.as_slice(), m, k).t(), &grad, 0.0, &mut grad_w);
                self.w.accumulate_grad(flatten(&grad_w));
            }
            if let Some(bias) = &self.bias {
                if bias.requires_grad() {
                    bias.accumulate_grad(grad.sum_axis(Axis(0)));
                }
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        let mut inputs = vec![self.x.clone(), self.w.clone()];
        inputs.extend(self.bias.clone());
        inputs
    }
}

fn dims2(t: &Tensor) -> (usize, usize) {
    match t.shape() {
        [rows, cols] => (*rows, *cols),
        other => panic!("expected a 2-D tensor, got shape {other:?}"),
    }
}
