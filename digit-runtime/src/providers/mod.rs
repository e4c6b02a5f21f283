mod naive;
mod parallel;

pub use naive::*;
pub use parallel::*;

use ndarray::{Array1, ArrayD};
use rayon::ThreadPool;

use crate::operators::{
    ConvAttributes, FlattenAttributes, GemmAttributes, MaxPoolAttributes, OperationError,
    SoftmaxAttributes,
};

pub type DefaultProvider = ParNaiveProvider;

/// A trait that has to be implemented by all the execution providers.
/// It contains the functions that are used to execute the supported
/// operators. Only the subset of the ONNX operators needed by digit
/// classifier networks is covered.
///
/// This interface can be limiting for providers that may not want to use
/// ndarray. In the future, it could be extended to support other data
/// structures.
pub trait Provider {
    /// Returns the name of the execution provider.
    fn name(&self) -> &str;

    /// Returns the targeted ONNX opset version of the execution provider.
    /// This is used to check if the execution provider is compatible with
    /// the model.
    fn version(&self) -> u64;

    fn conv(
        thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        weights: ArrayD<f32>,
        bias: Option<Array1<f32>>,
        attrs: ConvAttributes,
    ) -> Result<ArrayD<f32>, OperationError>;

    fn relu(thread_pool: &ThreadPool, x: ArrayD<f32>) -> ArrayD<f32>;

    fn max_pool(
        thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        attrs: MaxPoolAttributes,
    ) -> Result<ArrayD<f32>, OperationError>;

    fn add(
        thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        y: ArrayD<f32>,
    ) -> Result<ArrayD<f32>, OperationError>;

    fn reshape(
        thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        shape: ArrayD<i64>,
    ) -> Result<ArrayD<f32>, OperationError>;

    fn flatten(
        thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        attrs: FlattenAttributes,
    ) -> Result<ArrayD<f32>, OperationError>;

    fn matmul(
        thread_pool: &ThreadPool,
        a: ArrayD<f32>,
        b: ArrayD<f32>,
    ) -> Result<ArrayD<f32>, OperationError>;

    fn gemm(
        thread_pool: &ThreadPool,
        a: ArrayD<f32>,
        b: ArrayD<f32>,
        c: ArrayD<f32>,
        attrs: GemmAttributes,
    ) -> Result<ArrayD<f32>, OperationError>;

    fn softmax(
        thread_pool: &ThreadPool,
        x: ArrayD<f32>,
        attrs: SoftmaxAttributes,
    ) -> Result<ArrayD<f32>, OperationError>;
}
