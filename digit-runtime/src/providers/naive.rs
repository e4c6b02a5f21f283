use ndarray::{Array1, ArrayD, Axis, Ix2, IxDyn};
use rayon::ThreadPool;

use crate::operators::{
    ConvAttributes, FlattenAttributes, GemmAttributes, MaxPoolAttributes, SoftmaxAttributes,
};

use super::{OperationError, Provider};

pub struct NaiveProvider;

impl Provider for NaiveProvider {
    fn name(&self) -> &str {
        "Naive"
    }

    fn version(&self) -> u64 {
        8
    }

    fn relu(_thread_pool: &ThreadPool, x: ArrayD<f32>) -> ArrayD<f32> {
        x.mapv(|v| v.max(0.0))
    }

    fn add(
        _thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        y: ArrayD<f32>,
    ) -> Result<ArrayD<f32>, OperationError> {
        if x.shape() == y.shape() {
            Ok(x + y)
        } else if broadcastable(y.shape(), x.shape()) {
            Ok(x + &y)
        } else if broadcastable(x.shape(), y.shape()) {
            Ok(y + &x)
        } else {
            Err(OperationError::WrongShape(
                format!("{:?}", x.shape()),
                format!("{:?}", y.shape()),
            ))
        }
    }

    fn reshape(
        _thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        shape: ArrayD<i64>,
    ) -> Result<ArrayD<f32>, OperationError> {
        if shape.ndim() != 1 {
            return Err(OperationError::WrongDim(1, shape.ndim()));
        }
        let input_shape = x.shape().to_vec();
        let total = x.len();

        // ONNX semantics: 0 copies the input dimension, -1 infers one
        // dimension from the element count
        let mut target: Vec<usize> = Vec::with_capacity(shape.len());
        let mut inferred: Option<usize> = None;
        for (i, &entry) in shape.iter().enumerate() {
            if entry == 0 {
                let copied = input_shape.get(i).ok_or_else(|| {
                    OperationError::UnsupportedConfiguration(
                        String::from("Reshape"),
                        format!("dimension {} cannot be copied from the input", i),
                    )
                })?;
                target.push(*copied);
            } else if entry == -1 {
                if inferred.is_some() {
                    return Err(OperationError::UnsupportedConfiguration(
                        String::from("Reshape"),
                        String::from("at most one dimension can be inferred"),
                    ));
                }
                inferred = Some(i);
                target.push(1);
            } else {
                target.push(entry as usize);
            }
        }
        if let Some(i) = inferred {
            let partial: usize = target.iter().product();
            if partial == 0 || total % partial != 0 {
                return Err(OperationError::WrongShape(
                    format!("a shape with {} elements", total),
                    format!("{:?}", target),
                ));
            }
            target[i] = total / partial;
        }

        x.into_shape(IxDyn(&target)).map_err(|_| {
            OperationError::WrongShape(
                format!("a shape with {} elements", total),
                format!("{:?}", target),
            )
        })
    }

    fn flatten(
        _thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        attrs: FlattenAttributes,
    ) -> Result<ArrayD<f32>, OperationError> {
        if attrs.axis > x.ndim() {
            return Err(OperationError::WrongDim(attrs.axis, x.ndim()));
        }
        let rows: usize = x.shape()[..attrs.axis].iter().product();
        let cols: usize = x.shape()[attrs.axis..].iter().product();
        let total = x.len();

        x.into_shape(IxDyn(&[rows, cols])).map_err(|_| {
            OperationError::WrongShape(
                format!("a shape with {} elements", total),
                format!("[{}, {}]", rows, cols),
            )
        })
    }

    fn matmul(
        _thread_pool: &ThreadPool,
        a: ArrayD<f32>,
        b: ArrayD<f32>,
    ) -> Result<ArrayD<f32>, OperationError> {
        if a.ndim() != 2 {
            return Err(OperationError::WrongDim(2, a.ndim()));
        }
        if b.ndim() != 2 {
            return Err(OperationError::WrongDim(2, b.ndim()));
        }
        let a = a.into_dimensionality::<Ix2>().unwrap();
        let b = b.into_dimensionality::<Ix2>().unwrap();

        if a.shape()[1] != b.shape()[0] {
            return Err(OperationError::WrongShape(
                format!("[{}, *]", a.shape()[1]),
                format!("[{}, *]", b.shape()[0]),
            ));
        }
        Ok(a.dot(&b).into_dyn())
    }

    fn gemm(
        _thread_pool: &ThreadPool,
        a: ArrayD<f32>,
        b: ArrayD<f32>,
        c: ArrayD<f32>,
        attrs: GemmAttributes,
    ) -> Result<ArrayD<f32>, OperationError> {
        let GemmAttributes {
            alpha,
            beta,
            trans_a,
            trans_b,
        } = attrs;
        if a.ndim() > 2 {
            return Err(OperationError::WrongDim(2, a.ndim()));
        }
        if b.ndim() > 2 {
            return Err(OperationError::WrongDim(2, b.ndim()));
        }
        if c.ndim() > 2 {
            return Err(OperationError::WrongDim(2, c.ndim()));
        }
        let act_c = if c.ndim() == 2 {
            c.into_dimensionality::<Ix2>().unwrap()
        } else {
            let n = c.len();
            c.into_shape(IxDyn(&[1, n]))
                .unwrap()
                .into_dimensionality::<Ix2>()
                .unwrap()
        };

        let act_a = if trans_a == 0 {
            a.into_dimensionality::<Ix2>().unwrap()
        } else {
            a.into_dimensionality::<Ix2>().unwrap().t().to_owned()
        };
        let act_b = if trans_b == 0 {
            b.into_dimensionality::<Ix2>().unwrap()
        } else {
            b.into_dimensionality::<Ix2>().unwrap().t().to_owned()
        };

        if act_a.shape()[1] != act_b.shape()[0] {
            return Err(OperationError::WrongShape(
                format!("[{}, *]", act_a.shape()[1]),
                format!("[{}, *]", act_b.shape()[0]),
            ));
        }
        if act_b.shape()[1] != act_c.shape()[1] {
            return Err(OperationError::WrongShape(
                format!("[*, {}]", act_b.shape()[1]),
                format!("[*, {}]", act_c.shape()[1]),
            ));
        }
        Ok((alpha * act_a.dot(&act_b) + beta * act_c).into_dyn())
    }

    fn softmax(
        _thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        attrs: SoftmaxAttributes,
    ) -> Result<ArrayD<f32>, OperationError> {
        if x.ndim() == 0 {
            return Err(OperationError::WrongDim(1, 0));
        }
        let ndim = x.ndim() as i64;
        let axis = if attrs.axis < 0 {
            attrs.axis + ndim
        } else {
            attrs.axis
        };
        if axis != ndim - 1 {
            return Err(OperationError::UnsupportedConfiguration(
                String::from("Softmax"),
                format!(
                    "axis {} on a tensor with {} dimensions",
                    attrs.axis, ndim
                ),
            ));
        }

        // shift by the lane maximum to keep the exponentials stable
        let last = Axis(x.ndim() - 1);
        let maxes = x.map_axis(last, |lane| lane.fold(f32::NEG_INFINITY, |m, &v| m.max(v)));
        let shifted = x - &maxes.insert_axis(last);
        let exponentials = shifted.mapv(f32::exp);
        let sums = exponentials.sum_axis(last).insert_axis(last);
        Ok(exponentials / &sums)
    }

    fn max_pool(
        _thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        attrs: MaxPoolAttributes,
    ) -> Result<ArrayD<f32>, OperationError> {
        let [batch_size, in_chans, height, width] = *x.shape() else {
            return Err(OperationError::WrongDim(4, x.ndim()));
        };
        let MaxPoolAttributes {
            kernel_shape: [kern_h, kern_w],
            pads: [pad_hs, pad_ws, pad_he, pad_we],
            strides: [stride_h, stride_w],
        } = attrs;
        check_window_geometry(
            "MaxPool",
            [kern_h, kern_w],
            [stride_h, stride_w],
            height + pad_hs + pad_he,
            width + pad_ws + pad_we,
        )?;
        let out_height = 1 + ((height + pad_hs + pad_he) - kern_h) / stride_h;
        let out_width = 1 + ((width + pad_ws + pad_we) - kern_w) / stride_w;
        let out_shape = [batch_size, in_chans, out_height, out_width];

        // tensor bounds considering padding; the kernel size is subtracted
        // to consider valid windows only
        let tens_hs: i64 = 0i64 - (pad_hs as i64);
        let tens_ws: i64 = 0i64 - (pad_ws as i64);
        let tens_he: i64 = ((height + pad_he) - kern_h + 1) as i64;
        let tens_we: i64 = ((width + pad_we) - kern_w + 1) as i64;

        let mut output: ArrayD<f32> = ArrayD::<f32>::from_elem(IxDyn(&out_shape), 0.0);
        for batch in 0..batch_size {
            for channel in 0..in_chans {
                // iterate over the input tensor with the specified stride
                for ext_row in (tens_hs..tens_he).step_by(stride_h) {
                    for ext_col in (tens_ws..tens_we).step_by(stride_w) {
                        let mut result = f32::MIN;
                        // iterate over the window defined by the kernel,
                        // clamped to the unpadded tensor
                        for input_row in ext_row.max(0)..(ext_row + kern_h as i64).min(height as i64)
                        {
                            for input_col in
                                ext_col.max(0)..(ext_col + kern_w as i64).min(width as i64)
                            {
                                result = result.max(
                                    x[[batch, channel, input_row as usize, input_col as usize]],
                                );
                            }
                        }
                        let out_row = (ext_row + pad_hs as i64) as usize / stride_h;
                        let out_col = (ext_col + pad_ws as i64) as usize / stride_w;
                        output[[batch, channel, out_row, out_col]] = result;
                    }
                }
            }
        }
        Ok(output)
    }

    fn conv(
        _thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        weights: ArrayD<f32>,
        bias: Option<Array1<f32>>,
        attrs: ConvAttributes,
    ) -> Result<ArrayD<f32>, OperationError> {
        let [batch_size, in_chans, height, width] = *x.shape() else {
            return Err(OperationError::WrongDim(4, x.ndim()));
        };
        let [n_featmaps, weight_chans, kern_h, kern_w] = *weights.shape() else {
            return Err(OperationError::WrongDim(4, weights.ndim()));
        };
        if weight_chans != in_chans {
            return Err(OperationError::WrongShape(
                format!("[*, {}, *, *]", in_chans),
                format!("[*, {}, *, *]", weight_chans),
            ));
        }
        if [kern_h, kern_w] != attrs.kernel_shape {
            return Err(OperationError::WrongShape(
                format!(
                    "[*, *, {}, {}]",
                    attrs.kernel_shape[0], attrs.kernel_shape[1]
                ),
                format!("[*, *, {}, {}]", kern_h, kern_w),
            ));
        }
        let bias = bias.unwrap_or_else(|| Array1::zeros(n_featmaps));
        if bias.shape()[0] != n_featmaps {
            return Err(OperationError::WrongShape(
                format!("[{}]", n_featmaps),
                format!("[{}]", bias.shape()[0]),
            ));
        }

        let ConvAttributes {
            // w = width, h = height; s = start, e = end
            kernel_shape: _,
            pads: [pad_hs, pad_ws, pad_he, pad_we],
            strides: [stride_h, stride_w],
        } = attrs;
        check_window_geometry(
            "Conv",
            [kern_h, kern_w],
            [stride_h, stride_w],
            height + pad_hs + pad_he,
            width + pad_ws + pad_we,
        )?;
        let out_height = 1 + ((height + pad_hs + pad_he) - kern_h) / stride_h;
        let out_width = 1 + ((width + pad_ws + pad_we) - kern_w) / stride_w;
        let out_shape = [batch_size, n_featmaps, out_height, out_width];

        // tensor bounds considering padding; the kernel size is subtracted
        // to consider valid windows only
        let tens_hs: i64 = 0_i64 - (pad_hs as i64);
        let tens_ws: i64 = 0_i64 - (pad_ws as i64);
        let tens_he: i64 = (height + pad_he) as i64 - kern_h as i64 + 1;
        let tens_we: i64 = (width + pad_we) as i64 - kern_w as i64 + 1;

        let mut output: ArrayD<f32> = ArrayD::<f32>::from_elem(IxDyn(&out_shape), 0.0);
        for batch in 0..batch_size {
            for featmap in 0..n_featmaps {
                // iterate over the input tensor with the specified stride
                for ext_row in (tens_hs..tens_he).step_by(stride_h) {
                    for ext_col in (tens_ws..tens_we).step_by(stride_w) {
                        let mut accumulator: f32 = bias[[featmap]];
                        for channel in 0..in_chans {
                            // iterate over the window defined by the kernel
                            for (kern_row, input_row) in
                                (ext_row..ext_row + kern_h as i64).enumerate()
                            {
                                if input_row < 0 || input_row >= height as i64 {
                                    continue;
                                }
                                for (kern_col, input_col) in
                                    (ext_col..ext_col + kern_w as i64).enumerate()
                                {
                                    if input_col < 0 || input_col >= width as i64 {
                                        continue;
                                    }
                                    accumulator += x
                                        [[batch, channel, input_row as usize, input_col as usize]]
                                        * weights[[featmap, channel, kern_row, kern_col]];
                                }
                            }
                        }
                        let out_row = (ext_row + pad_hs as i64) as usize / stride_h;
                        let out_col = (ext_col + pad_ws as i64) as usize / stride_w;
                        output[[batch, featmap, out_row, out_col]] = accumulator;
                    }
                }
            }
        }
        Ok(output)
    }
}

/// True when `from` can be broadcast to `to` with right-aligned dimensions.
fn broadcastable(from: &[usize], to: &[usize]) -> bool {
    from.len() <= to.len()
        && from
            .iter()
            .rev()
            .zip(to.iter().rev())
            .all(|(&f, &t)| f == t || f == 1)
}

/// Rejects degenerate window setups before the output geometry is computed.
pub(super) fn check_window_geometry(
    operator: &str,
    kernel_shape: [usize; 2],
    strides: [usize; 2],
    padded_height: usize,
    padded_width: usize,
) -> Result<(), OperationError> {
    let [kern_h, kern_w] = kernel_shape;
    let [stride_h, stride_w] = strides;
    if kern_h == 0 || kern_w == 0 || stride_h == 0 || stride_w == 0 {
        return Err(OperationError::UnsupportedConfiguration(
            String::from(operator),
            String::from("kernel and stride entries must be nonzero"),
        ));
    }
    if kern_h > padded_height || kern_w > padded_width {
        return Err(OperationError::WrongShape(
            format!("a padded input of at least [{}, {}]", kern_h, kern_w),
            format!("[{}, {}]", padded_height, padded_width),
        ));
    }
    Ok(())
}
