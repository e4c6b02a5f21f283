///
/// # Operators
///
/// This module defines the ONNX operator structures.
///
/// Currently it only defines the subset of operators needed to execute
/// handwritten-digit classifier networks.
///
mod attributes;
mod initializers;
mod validators;

pub use attributes::*;
pub use initializers::*;

use thiserror::Error;

use crate::tensor::TensorParametrizedShape;

#[derive(Debug, Clone)]
pub enum Operator {
    /// Pseudo-operator feeding the model input, carrying the declared
    /// (possibly parameterized) input shape.
    InputFeed(TensorParametrizedShape),
    /// Pseudo-operator collecting the model output, carrying the declared
    /// (possibly parameterized) output shape.
    OutputCollector(TensorParametrizedShape),
    Convolution(ConvInits, ConvAttributes),
    ReLU,
    MaxPool(MaxPoolAttributes),
    /// Element-wise addition. The right operand is either a second graph
    /// edge or a constant initializer (e.g. a broadcast bias).
    Add(Option<AddInits>),
    Reshape(ReshapeInits),
    Flatten(FlattenAttributes),
    MatMul(MatMulInits),
    Gemm(GemmInits, GemmAttributes),
    Softmax(SoftmaxAttributes),
}

impl Operator {
    pub fn name(&self) -> String {
        let name = match self {
            Operator::InputFeed(_) => "InputFeed",
            Operator::OutputCollector(_) => "OutputCollector",
            Operator::Convolution(_, _) => "Conv",
            Operator::ReLU => "Relu",
            Operator::MaxPool(_) => "MaxPool",
            Operator::Add(_) => "Add",
            Operator::Reshape(_) => "Reshape",
            Operator::Flatten(_) => "Flatten",
            Operator::MatMul(_) => "MatMul",
            Operator::Gemm(_, _) => "Gemm",
            Operator::Softmax(_) => "Softmax",
        };
        String::from(name)
    }
}

#[derive(Error, Debug)]
pub enum OperationError {
    #[error("expected a tensor with {0} dimensions, found {1}")]
    WrongDim(usize, usize),
    #[error("expected a tensor of shape {0}, found {1}")]
    WrongShape(String, String),
    #[error("the input shape {actual:?} does not match the declared shape {expected:?}")]
    UnexpectedInputShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("invalid tensor type for operator {0}, input {1}")]
    InvalidTensorType(String, String),
    #[error("no value provided for shape parameter \"{0}\"")]
    MissingParamDimension(String),
    #[error("unsupported configuration for operator {0}: {1}")]
    UnsupportedConfiguration(String, String),
}
