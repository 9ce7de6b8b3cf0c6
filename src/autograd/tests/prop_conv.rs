//! Gradient checks for convolution operations over random geometries

use super::test_utils::{assert_grad_close, backward_projected, finite_difference, project_value, wave};
use crate::autograd::{conv2d, conv_output_size, conv_transpose2d, conv_transpose_output_size, Padding, Tensor};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
struct Geometry {
    batch: usize,
    in_ch: usize,
    out_ch: usize,
    size: usize,
    kernel: usize,
    stride: usize,
    padding: Padding,
}

fn geometry() -> impl Strategy<Value = Geometry> {
    (1usize..3, 1usize..3, 1usize..3, 3usize..6, 1usize..4, 1usize..3, any::<bool>()).prop_map(
        |(batch, in_ch, out_ch, size, kernel, stride, same)| Geometry {
            batch,
            in_ch,
            out_ch,
            size,
            kernel,
            stride,
            padding: if same { Padding::Same } else { Padding::Valid },
        },
    )
}

enum Wrt {
    Input,
    Weight,
    Bias,
}

/// Compare analytical and numerical gradients of `op` w.r.t. one argument
fn check<F>(op: F, x: (Vec<f32>, Vec<usize>), w: (Vec<f32>, Vec<usize>), b: Vec<f32>, wrt: Wrt)
where
    F: Fn(&Tensor, &Tensor, &Tensor) -> Tensor,
{
    let bias_shape = vec![b.len()];
    let build = |values: &[f32], which: &Wrt, grad: bool| {
        let pick = |v: &Vec<f32>, shape: &[usize], me: bool| {
            if me {
                Tensor::from_shape(values.to_vec(), shape, grad)
            } else {
                Tensor::from_shape(v.clone(), shape, false)
            }
        };
        (
            pick(&x.0, &x.1, matches!(which, Wrt::Input)),
            pick(&w.0, &w.1, matches!(which, Wrt::Weight)),
            pick(&b, &bias_shape, matches!(which, Wrt::Bias)),
        )
    };

    let point = match wrt {
        Wrt::Input => x.0.clone(),
        Wrt::Weight => w.0.clone(),
        Wrt::Bias => b.clone(),
    };

    let (xt, wt, bt) = build(&point, &wrt, true);
    backward_projected(&op(&xt, &wt, &bt));
    let target = match wrt {
        Wrt::Input => xt,
        Wrt::Weight => wt,
        Wrt::Bias => bt,
    };
    let analytical = target.grad().expect("gradient should be available");

    let numerical = finite_difference(
        |v| {
            let (xt, wt, bt) = build(v, &wrt, false);
            project_value(&op(&xt, &wt, &bt))
        },
        &point,
        1e-2,
    );
    assert_grad_close(analytical.as_slice().unwrap(), &numerical, 2e-2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_conv2d_gradient_check(g in geometry()) {
        prop_assume!(g.padding == Padding::Same || g.size >= g.kernel);
        let x_shape = vec![g.batch, g.in_ch, g.size, g.size];
        let w_shape = vec![g.out_ch, g.in_ch, g.kernel, g.kernel];
        let x = wave(x_shape.iter().product(), 0.3);
        let w = wave(w_shape.iter().product(), 1.9);
        let b = wave(g.out_ch, 4.1);

        let op = |x: &Tensor, w: &Tensor, b: &Tensor| conv2d(x, w, b, g.stride, g.padding);

        let y = op(
            &Tensor::from_shape(x.clone(), &x_shape, false),
            &Tensor::from_shape(w.clone(), &w_shape, false),
            &Tensor::from_vec(b.clone(), false),
        );
        let out = conv_output_size(g.size, g.kernel, g.stride, g.padding);
        prop_assert_eq!(y.shape(), &[g.batch, g.out_ch, out, out][..]);

        for wrt in [Wrt::Input, Wrt::Weight, Wrt::Bias] {
            check(op, (x.clone(), x_shape.clone()), (w.clone(), w_shape.clone()), b.clone(), wrt);
        }
    }

    #[test]
    fn prop_conv_transpose2d_gradient_check(g in geometry()) {
        let x_shape = vec![g.batch, g.in_ch, g.size, g.size];
        let w_shape = vec![g.in_ch, g.out_ch, g.kernel, g.kernel];
        let x = wave(x_shape.iter().product(), 0.7);
        let w = wave(w_shape.iter().product(), 2.3);
        let b = wave(g.out_ch, 5.3);

        let op = |x: &Tensor, w: &Tensor, b: &Tensor| conv_transpose2d(x, w, b, g.stride, g.padding);

        let y = op(
            &Tensor::from_shape(x.clone(), &x_shape, false),
            &Tensor::from_shape(w.clone(), &w_shape, false),
            &Tensor::from_vec(b.clone(), false),
        );
        let out = conv_transpose_output_size(g.size, g.kernel, g.stride, g.padding);
        prop_assert_eq!(y.shape(), &[g.batch, g.out_ch, out, out][..]);

        for wrt in [Wrt::Input, Wrt::Weight, Wrt::Bias] {
            check(op, (x.clone(), x_shape.clone()), (w.clone(), w_shape.clone()), b.clone(), wrt);
        }
    }
}
