//! Backward operation trait and graph traversal

use super::Tensor;
use std::collections::HashSet;
use std::rc::Rc;

/// A recorded operation that can propagate gradients to its inputs
///
/// `backward` reads the gradient of the op's result and accumulates the
/// gradients of its inputs. It must not recurse into the inputs' own ops:
/// [`super::backward`] schedules every op exactly once in topological order.
pub trait BackwardOp {
    /// Accumulate input gradients from the result gradient
    fn backward(&self);

    /// Tensors this op read in the forward pass
    fn inputs(&self) -> Vec<Tensor>;
}

/// Ops reachable from `root`, inputs before consumers
pub(crate) fn topological_order(root: &Tensor) -> Vec<Rc<dyn BackwardOp>> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    // (tensor, inputs already expanded)
    let mut stack = vec![(root.clone(), false)];

    while let Some((tensor, expanded)) = stack.pop() {
        let Some(op) = tensor.backward_op() else {
            continue;
        };
        if expanded {
            order.push(op);
            continue;
        }
        if !visited.insert(tensor.id()) {
            continue;
        }
        stack.push((tensor, true));
        for input in op.inputs() {
            if !visited.contains(&input.id()) {
                stack.push((input, false));
            }
        }
    }

    order
}
