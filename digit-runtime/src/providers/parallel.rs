use ndarray::{Array1, ArrayD, Ix2, IxDyn};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::Mutex;

use crate::operators::{
    ConvAttributes, FlattenAttributes, GemmAttributes, MaxPoolAttributes, SoftmaxAttributes,
};

use super::naive::check_window_geometry;
use super::{NaiveProvider, OperationError, Provider};

pub struct ParNaiveProvider;

impl Provider for ParNaiveProvider {
    fn name(&self) -> &str {
        "ParNaive"
    }

    fn version(&self) -> u64 {
        8
    }

    fn relu(_thread_pool: &ThreadPool, x: ArrayD<f32>) -> ArrayD<f32> {
        NaiveProvider::relu(_thread_pool, x)
    }

    fn add(
        _thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        y: ArrayD<f32>,
    ) -> Result<ArrayD<f32>, OperationError> {
        NaiveProvider::add(_thread_pool, x, y)
    }

    fn reshape(
        _thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        shape: ArrayD<i64>,
    ) -> Result<ArrayD<f32>, OperationError> {
        NaiveProvider::reshape(_thread_pool, x, shape)
    }

    fn flatten(
        _thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        attrs: FlattenAttributes,
    ) -> Result<ArrayD<f32>, OperationError> {
        NaiveProvider::flatten(_thread_pool, x, attrs)
    }

    fn matmul(
        _thread_pool: &ThreadPool,
        a: ArrayD<f32>,
        b: ArrayD<f32>,
    ) -> Result<ArrayD<f32>, OperationError> {
        NaiveProvider::matmul(_thread_pool, a, b)
    }

    fn softmax(
        _thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        attrs: SoftmaxAttributes,
    ) -> Result<ArrayD<f32>, OperationError> {
        NaiveProvider::softmax(_thread_pool, x, attrs)
    }

    fn gemm(
        thread_pool: &ThreadPool,
        a: ArrayD<f32>,
        b: ArrayD<f32>,
        c: ArrayD<f32>,
        attrs: GemmAttributes,
    ) -> Result<ArrayD<f32>, OperationError> {
        if thread_pool.current_num_threads() == 1 {
            return NaiveProvider::gemm(thread_pool, a, b, c, attrs);
        }
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
        // the two terms of the affine expression are independent
        let mut term1 = None;
        let mut term2 = None;
        thread_pool.scope(|s| {
            s.spawn(|_| term1 = Some(alpha * act_a.dot(&act_b)));
            s.spawn(|_| term2 = Some(beta * act_c));
        });
        Ok(
            (term1.expect("term1 unavailable") + term2.expect("term2 unavailable")).into_dyn(),
        )
    }

    fn max_pool(
        thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        attrs: MaxPoolAttributes,
    ) -> Result<ArrayD<f32>, OperationError> {
        if thread_pool.current_num_threads() == 1 {
            return NaiveProvider::max_pool(thread_pool, x, attrs);
        }
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

        let tens_hs: i64 = 0i64 - (pad_hs as i64);
        let tens_ws: i64 = 0i64 - (pad_ws as i64);
        let tens_he: i64 = ((height + pad_he) - kern_h + 1) as i64;
        let tens_we: i64 = ((width + pad_we) - kern_w + 1) as i64;

        // each work item computes one channel plane locally and publishes
        // it under the lock
        let output = Mutex::new(ArrayD::<f32>::from_elem(IxDyn(&out_shape), 0.0));
        thread_pool.install(|| {
            (0..batch_size * in_chans).into_par_iter().for_each(|work_item| {
                let batch = work_item / in_chans;
                let channel = work_item % in_chans;

                let mut plane = vec![0.0_f32; out_height * out_width];
                for ext_row in (tens_hs..tens_he).step_by(stride_h) {
                    for ext_col in (tens_ws..tens_we).step_by(stride_w) {
                        let mut result = f32::MIN;
                        for input_row in
                            ext_row.max(0)..(ext_row + kern_h as i64).min(height as i64)
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
                        plane[out_row * out_width + out_col] = result;
                    }
                }

                let mut output = output.lock().expect("output lock poisoned");
                for out_row in 0..out_height {
                    for out_col in 0..out_width {
                        output[[batch, channel, out_row, out_col]] =
                            plane[out_row * out_width + out_col];
                    }
                }
            });
        });
        Ok(output.into_inner().expect("output lock poisoned"))
    }

    fn conv(
        thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        weights: ArrayD<f32>,
        bias: Option<Array1<f32>>,
        attrs: ConvAttributes,
    ) -> Result<ArrayD<f32>, OperationError> {
        if thread_pool.current_num_threads() == 1 {
            return NaiveProvider::conv(thread_pool, x, weights, bias, attrs);
        }
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

        let tens_hs: i64 = 0_i64 - (pad_hs as i64);
        let tens_ws: i64 = 0_i64 - (pad_ws as i64);
        let tens_he: i64 = (height + pad_he) as i64 - kern_h as i64 + 1;
        let tens_we: i64 = (width + pad_we) as i64 - kern_w as i64 + 1;

        // each work item computes one feature map plane locally and
        // publishes it under the lock
        let output = Mutex::new(ArrayD::<f32>::from_elem(IxDyn(&out_shape), 0.0));
        thread_pool.install(|| {
            (0..batch_size * n_featmaps)
                .into_par_iter()
                .for_each(|work_item| {
                    let batch = work_item / n_featmaps;
                    let featmap = work_item % n_featmaps;

                    let mut plane = vec![0.0_f32; out_height * out_width];
                    for ext_row in (tens_hs..tens_he).step_by(stride_h) {
                        for ext_col in (tens_ws..tens_we).step_by(stride_w) {
                            let mut accumulator: f32 = bias[[featmap]];
                            for channel in 0..in_chans {
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
                                        accumulator += x[[
                                            batch,
                                            channel,
                                            input_row as usize,
                                            input_col as usize,
                                        ]] * weights
                                            [[featmap, channel, kern_row, kern_col]];
                                    }
                                }
                            }
                            let out_row = (ext_row + pad_hs as i64) as usize / stride_h;
                            let out_col = (ext_col + pad_ws as i64) as usize / stride_w;
                            plane[out_row * out_width + out_col] = accumulator;
                        }
                    }

                    let mut output = output.lock().expect("output lock poisoned");
                    for out_row in 0..out_height {
                        for out_col in 0..out_width {
                            output[[batch, featmap, out_row, out_col]] =
                                plane[out_row * out_width + out_col];
                        }
                    }
                });
        });
        Ok(output.into_inner().expect("output lock poisoned"))
    }
}
