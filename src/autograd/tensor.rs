//! Tensor with gradient tracking

use super::BackwardOp;
use ndarray::Array1;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared gradient slot of a tensor
pub type GradCell = Rc<RefCell<Option<Array1<f32>>>>;

/// Flat `f32` tensor with a logical shape and an optional gradient
///
/// Data is stored row-major in a single [`Array1`]. Cloning a tensor is cheap:
/// the data is shared copy-on-write and the gradient cell is shared, so a
/// clone captured by a backward op accumulates into the original's gradient.
#[derive(Clone)]
pub struct Tensor {
    data: Rc<Array1<f32>>,
    shape: Vec<usize>,
    grad: GradCell,
    backward_op: Option<Rc<dyn BackwardOp>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a 1-D tensor from an array
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        let shape = vec![data.len()];
        Self::from_array(data, shape, requires_grad)
    }

    /// Create a 1-D tensor from a vector
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a tensor with an explicit shape
    ///
    /// Panics if the shape does not cover exactly `data.len()` elements.
    pub fn from_shape(data: Vec<f32>, shape: &[usize], requires_grad: bool) -> Self {
        Self::from_array(Array1::from(data), shape.to_vec(), requires_grad)
    }

    /// Create a tensor from an array with an explicit shape
    pub fn from_array(data: Array1<f32>, shape: Vec<usize>, requires_grad: bool) -> Self {
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "shape {shape:?} does not match {} elements",
            data.len()
        );
        let data = if data.is_standard_layout() { data } else { data.iter().copied().collect() };
        Self {
            data: Rc::new(data),
            shape,
            grad: Rc::new(RefCell::new(None)),
            backward_op: None,
            requires_grad,
        }
    }

    /// Zero-filled tensor
    pub fn zeros(shape: &[usize], requires_grad: bool) -> Self {
        let len: usize = shape.iter().product();
        Self::from_array(Array1::zeros(len), shape.to_vec(), requires_grad)
    }

    /// Tensor filled with a constant
    pub fn full(shape: &[usize], value: f32, requires_grad: bool) -> Self {
        let len: usize = shape.iter().product();
        Self::from_array(Array1::from_elem(len, value), shape.to_vec(), requires_grad)
    }

    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Mutable access to the data
    ///
    /// Copies the buffer first if a live graph still shares it.
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        Rc::make_mut(&mut self.data)
    }

    /// Data as a contiguous slice
    pub fn as_slice(&self) -> &[f32] {
        self.data.as_slice().expect("tensor data is contiguous")
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub fn set_requires_grad(&mut self, requires_grad: bool) {
        self.requires_grad = requires_grad;
    }

    /// Current gradient, if any
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Overwrite the gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add to the gradient, initializing it if absent
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut slot = self.grad.borrow_mut();
        match slot.as_mut() {
            Some(existing) => *existing += &grad,
            None => *slot = Some(grad),
        }
    }

    /// Drop the gradient
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    pub fn grad_cell(&self) -> GradCell {
        Rc::clone(&self.grad)
    }

    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }

    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    /// Graph identity of this tensor (shared by its clones)
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.grad) as *const () as usize
    }

    /// Copy of the data cut from the graph
    pub fn detach(&self) -> Self {
        Self {
            data: Rc::clone(&self.data),
            shape: self.shape.clone(),
            grad: Rc::new(RefCell::new(None)),
            backward_op: None,
            requires_grad: false,
        }
    }

    /// Rows `start..end` along the first axis, detached from the graph
    pub fn slice_outer(&self, start: usize, end: usize) -> Self {
        let outer = self.shape.first().copied().unwrap_or(0);
        assert!(start <= end && end <= outer, "slice {start}..{end} out of bounds for {outer}");
        let inner: usize = self.shape[1..].iter().product();
        let data = self.as_slice()[start * inner..end * inner].to_vec();
        let mut shape = self.shape.clone();
        shape[0] = end - start;
        Self::from_shape(data, &shape, false)
    }

    /// Stack tensors along the first axis, detached from the graph
    pub fn concat_outer(parts: &[&Tensor]) -> Self {
        let Some(first) = parts.first() else {
            return Self::zeros(&[0], false);
        };
        let inner = &first.shape[1..];
        let mut outer = 0;
        let mut data = Vec::new();
        for part in parts {
            assert_eq!(&part.shape[1..], inner, "concat requires matching inner dimensions");
            outer += part.shape[0];
            data.extend_from_slice(part.as_slice());
        }
        let mut shape = first.shape.clone();
        shape[0] = outer;
        Self::from_shape(data, &shape, false)
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.borrow().is_some())
            .finish_non_exhaustive()
    }
}
