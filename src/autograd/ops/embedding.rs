//! Embedding lookup with scatter-add gradient

use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Gather rows of `table[V, D]` for each id, producing `[ids.len(), D]`
///
/// Panics if an id is outside the table.
pub fn embedding(table: &Tensor, ids: &[usize]) -> Tensor {
    let (vocab, dim) = match table.shape() {
        [v, d] => (*v, *d),
        other => panic!("embedding table must be [V, D], got {other:?}"),
    };

    let rows = table.as_slice();
    let mut data = Vec::with_capacity(ids.len() * dim);
    for &id in ids {
        assert!(id < vocab, "embedding id {id} out of range for {vocab} rows");
        data.extend_from_slice(&rows[id * dim..(id + 1) * dim]);
    }

    let requires_grad = table.requires_grad();
    let mut result = Tensor::from_shape(data, &[ids.len(), dim], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(EmbeddingBackward {
            table: table.clone(),
            ids: ids.to_vec(),
            dim,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct EmbeddingBackward {
    table: Tensor,
    ids: Vec<usize>,
    dim: usize,
    result_grad: GradCell,
}

impl BackwardOp for EmbeddingBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let mut grad_table = Array1::zeros(self.table.len());
            for (row, &id) in self.ids.iter().enumerate() {
                for d in 0..self.dim {
                    grad_table[id * self.dim + d] += grad[row * self.dim + d];
                }
            }
            self.table.accumulate_grad(grad_table);
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.table.clone()]
    }
}
