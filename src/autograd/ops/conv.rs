//! Convolution autograd operations: conv2d, conv_transpose2d
//!
//! Tensors are channel-first (`[N, C, H, W]`). Both ops lower to matrix
//! products over an im2col buffer; the transposed convolution is the adjoint
//! of the forward convolution that maps its output shape back to its input
//! shape, so the two share [`ConvGeometry`].

use super::matmul::{flatten, view2};
use crate::autograd::{BackwardOp, GradCell, Tensor};
use ndarray::linalg::general_mat_mul;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Spatial padding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    /// Pad so that `out = ceil(in / stride)` (convolution) or `out = in * stride` (transposed)
    #[default]
    Same,
    /// No padding
    Valid,
}

/// Output size of a convolution along one axis
pub fn conv_output_size(input: usize, kernel: usize, stride: usize, padding: Padding) -> usize {
    match padding {
        Padding::Same => input.div_ceil(stride),
        Padding::Valid => {
            assert!(input >= kernel, "valid convolution needs input {input} >= kernel {kernel}");
            (input - kernel) / stride + 1
        }
    }
}

/// Output size of a transposed convolution along one axis
pub fn conv_transpose_output_size(
    input: usize,
    kernel: usize,
    stride: usize,
    padding: Padding,
) -> usize {
    match padding {
        Padding::Same => input * stride,
        Padding::Valid => input.saturating_sub(1) * stride + kernel,
    }
}

/// Geometry of one strided convolution over a single image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConvGeometry {
    pub channels: usize,
    pub in_h: usize,
    pub in_w: usize,
    pub kernel: usize,
    pub stride: usize,
    pub pad_top: usize,
    pub pad_left: usize,
    pub out_h: usize,
    pub out_w: usize,
}

impl ConvGeometry {
    pub fn new(
        channels: usize,
        (in_h, in_w): (usize, usize),
        kernel: usize,
        stride: usize,
        padding: Padding,
    ) -> Self {
        assert!(stride > 0 && kernel > 0, "kernel and stride must be positive");
        let out_h = conv_output_size(in_h, kernel, stride, padding);
        let out_w = conv_output_size(in_w, kernel, stride, padding);
        let (pad_top, pad_left) = match padding {
            // Odd totals put the extra row/column at the bottom/right
            Padding::Same => (
                ((out_h - 1) * stride + kernel).saturating_sub(in_h) / 2,
                ((out_w - 1) * stride + kernel).saturating_sub(in_w) / 2,
            ),
            Padding::Valid => (0, 0),
        };
        Self { channels, in_h, in_w, kernel, stride, pad_top, pad_left, out_h, out_w }
    }

    /// Rows of the im2col buffer: `C * k * k`
    pub fn patch_len(&self) -> usize {
        self.channels * self.kernel * self.kernel
    }

    /// Columns of the im2col buffer: `out_h * out_w`
    pub fn positions(&self) -> usize {
        self.out_h * self.out_w
    }

    pub fn image_len(&self) -> usize {
        self.channels * self.in_h * self.in_w
    }

    /// Source pixel of output position `(oy, ox)` under kernel tap `(ky, kx)`
    #[inline]
    fn source(&self, oy: usize, ox: usize, ky: usize, kx: usize) -> Option<(usize, usize)> {
        let iy = (oy * self.stride + ky).checked_sub(self.pad_top)?;
        let ix = (ox * self.stride + kx).checked_sub(self.pad_left)?;
        (iy < self.in_h && ix < self.in_w).then_some((iy, ix))
    }
}

/// Unfold one `[C, H, W]` image into a `[C*k*k, out_h*out_w]` patch matrix
pub(crate) fn im2col(image: &[f32], g: &ConvGeometry) -> Array2<f32> {
    let mut cols = Array2::zeros((g.patch_len(), g.positions()));
    let k = g.kernel;
    for c in 0..g.channels {
        let plane = &image[c * g.in_h * g.in_w..(c + 1) * g.in_h * g.in_w];
        for ky in 0..k {
            for kx in 0..k {
                let mut row = cols.row_mut((c * k + ky) * k + kx);
                for oy in 0..g.out_h {
                    for ox in 0..g.out_w {
                        if let Some((iy, ix)) = g.source(oy, ox, ky, kx) {
                            row[oy * g.out_w + ox] = plane[iy * g.in_w + ix];
                        }
                    }
                }
            }
        }
    }
    cols
}

/// Fold a patch matrix back into an image, summing overlapping taps
pub(crate) fn col2im(cols: &Array2<f32>, g: &ConvGeometry, image: &mut [f32]) {
    let k = g.kernel;
    for c in 0..g.channels {
        let plane = &mut image[c * g.in_h * g.in_w..(c + 1) * g.in_h * g.in_w];
        for ky in 0..k {
            for kx in 0..k {
                let row = cols.row((c * k + ky) * k + kx);
                for oy in 0..g.out_h {
                    for ox in 0..g.out_w {
                        if let Some((iy, ix)) = g.source(oy, ox, ky, kx) {
                            plane[iy * g.in_w + ix] += row[oy * g.out_w + ox];
                        }
                    }
                }
            }
        }
    }
}

fn dims4(t: &Tensor) -> (usize, usize, usize, usize) {
    match t.shape() {
        [n, c, h, w] => (*n, *c, *h, *w),
        other => panic!("expected a [N, C, H, W] tensor, got shape {other:?}"),
    }
}

/// 2-D convolution
///
/// * `x` - input `[N, C, H, W]`
/// * `weight` - kernel `[O, C, k, k]`
/// * `bias` - `[O]`
pub fn conv2d(x: &Tensor, weight: &Tensor, bias: &Tensor, stride: usize, padding: Padding) -> Tensor {
    let (n, c, h, w) = dims4(x);
    let (o, wc, k, k2) = dims4(weight);
    assert_eq!(c, wc, "conv2d input channels {c} != kernel channels {wc}");
    assert_eq!(k, k2, "conv2d kernels must be square");
    assert_eq!(bias.len(), o, "conv2d bias length {} != {o}", bias.len());

    let g = ConvGeometry::new(c, (h, w), k, stride, padding);
    let kernel = view2(weight.as_slice(), o, g.patch_len());
    let out_len = o * g.positions();

    let mut data = Vec::with_capacity(n * out_len);
    for image in x.as_slice().chunks_exact(g.image_len().max(1)).take(n) {
        let mut y = kernel.dot(&im2col(image, &g));
        for (mut row, &b) in y.axis_iter_mut(Axis(0)).zip(bias.data().iter()) {
            row += b;
        }
        data.extend(y.iter().copied());
    }
    data.resize(n * out_len, 0.0);

    let requires_grad = x.requires_grad() || weight.requires_grad() || bias.requires_grad();
    let mut result = Tensor::from_shape(data, &[n, o, g.out_h, g.out_w], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(Conv2dBackward {
            x: x.clone(),
            weight: weight.clone(),
            bias: bias.clone(),
            geometry: g,
            batch: n,
            out_channels: o,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct Conv2dBackward {
    x: Tensor,
    weight: Tensor,
    bias: Tensor,
    geometry: ConvGeometry,
    batch: usize,
    out_channels: usize,
    result_grad: GradCell,
}

impl BackwardOp for Conv2dBackward {
    fn backward(&self) {
        let g = &self.geometry;
        let o = self.out_channels;
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let grad = grad.as_slice().expect("gradient is contiguous");
            let kernel = view2(self.weight.as_slice(), o, g.patch_len());
            let out_len = o * g.positions();

            let mut grad_x = vec![0.0; self.batch * g.image_len()];
            let mut grad_w = Array2::zeros((o, g.patch_len()));
            let mut grad_b = Array1::zeros(o);

            for i in 0..self.batch {
                let dy = view2(&grad[i * out_len..(i + 1) * out_len], o, g.positions());
                let image = &self.x.as_slice()[i * g.image_len()..(i + 1) * g.image_len()];

                if self.weight.requires_grad() {
                    // ∂L/∂W += dY · colsᵀ
                    let cols = im2col(image, g);
                    general_mat_mul(1.0, &dy, &cols.t(), 1.0, &mut grad_w);
                }
                if self.bias.requires_grad() {
                    grad_b += &dy.sum_axis(Axis(1));
                }
                if self.x.requires_grad() {
                    // ∂L/∂x = col2im(Wᵀ · dY)
                    let dcols = kernel.t().dot(&dy);
                    col2im(&dcols, g, &mut grad_x[i * g.image_len()..(i + 1) * g.image_len()]);
                }
            }

            if self.x.requires_grad() {
                self.x.accumulate_grad(Array1::from(grad_x));
            }
            if self.weight.requires_grad() {
                self.weight.accumulate_grad(flatten(&grad_w));
            }
            if self.bias.requires_grad() {
                self.bias.accumulate_grad(grad_b);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone(), self.weight.clone(), self.bias.clone()]
    }
}

/// 2-D transposed convolution
///
/// * `x` - input `[N, Ci, H, W]`
/// * `weight` - kernel `[Ci, Co, k, k]`
/// * `bias` - `[Co]`
pub fn conv_transpose2d(
    x: &Tensor,
    weight: &Tensor,
    bias: &Tensor,
    stride: usize,
    padding: Padding,
) -> Tensor {
    let (n, ci, h, w) = dims4(x);
    let (wci, co, k, k2) = dims4(weight);
    assert_eq!(ci, wci, "conv_transpose2d input channels {ci} != kernel channels {wci}");
    assert_eq!(k, k2, "conv_transpose2d kernels must be square");
    assert_eq!(bias.len(), co, "conv_transpose2d bias length {} != {co}", bias.len());

    let out_h = conv_transpose_output_size(h, k, stride, padding);
    let out_w = conv_transpose_output_size(w, k, stride, padding);
    // The forward convolution this op is the adjoint of: output image -> input grid
    let g = ConvGeometry::new(co, (out_h, out_w), k, stride, padding);
    debug_assert_eq!((g.out_h, g.out_w), (h, w));

    let kernel = view2(weight.as_slice(), ci, g.patch_len());
    let in_len = ci * h * w;
    let plane = out_h * out_w;

    let mut data = vec![0.0; n * g.image_len()];
    for i in 0..n {
        let xi = view2(&x.as_slice()[i * in_len..(i + 1) * in_len], ci, h * w);
        let cols = kernel.t().dot(&xi);
        let out = &mut data[i * g.image_len()..(i + 1) * g.image_len()];
        col2im(&cols, &g, out);
        for (ch, b) in bias.data().iter().enumerate() {
            for v in &mut out[ch * plane..(ch + 1) * plane] {
                *v += b;
            }
        }
    }

    let requires_grad = x.requires_grad() || weight.requires_grad() || bias.requires_grad();
    let mut result = Tensor::from_shape(data, &[n, co, out_h, out_w], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ConvTranspose2dBackward {
            x: x.clone(),
            weight: weight.clone(),
            bias: bias.clone(),
            geometry: g,
            batch: n,
            in_channels: ci,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ConvTranspose2dBackward {
    x: Tensor,
    weight: Tensor,
    bias: Tensor,
    geometry: ConvGeometry,
    batch: usize,
    in_channels: usize,
    result_grad: GradCell,
}

impl BackwardOp for ConvTranspose2dBackward {
    fn backward(&self) {
        let g = &self.geometry;
        let ci = self.in_channels;
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let grad = grad.as_slice().expect("gradient is contiguous");
            let kernel = view2(self.weight.as_slice(), ci, g.patch_len());
            let in_len = ci * g.positions();
            let plane = g.in_h * g.in_w;

            let mut grad_x = Array1::zeros(self.batch * in_len);
            let mut grad_w = Array2::zeros((ci, g.patch_len()));
            let mut grad_b = Array1::<f32>::zeros(g.channels);

            for i in 0..self.batch {
                let dy = &grad[i * g.image_len()..(i + 1) * g.image_len()];
                let dcols = im2col(dy, g);

                if self.x.requires_grad() {
                    // ∂L/∂x = W · im2col(dY)
                    let dx = kernel.dot(&dcols);
                    grad_x
                        .slice_mut(ndarray::s![i * in_len..(i + 1) * in_len])
                        .assign(&flatten(&dx));
                }
                if self.weight.requires_grad() {
                    // ∂L/∂W += x · im2col(dY)ᵀ
                    let xi = view2(&self.x.as_slice()[i * in_len..(i + 1) * in_len], ci, g.positions());
                    general_mat_mul(1.0, &xi, &dcols.t(), 1.0, &mut grad_w);
                }
                if self.bias.requires_grad() {
                    for (ch, b) in grad_b.iter_mut().enumerate() {
                        *b += dy[ch * plane..(ch + 1) * plane].iter().sum::<f32>();
                    }
                }
            }

            if self.x.requires_grad() {
                self.x.accumulate_grad(grad_x);
            }
            if self.weight.requires_grad() {
                self.weight.accumulate_grad(flatten(&grad_w));
            }
            if self.bias.requires_grad() {
                self.bias.accumulate_grad(grad_b);
            }
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.x.clone(), self.weight.clone(), self.bias.clone()]
    }
}
