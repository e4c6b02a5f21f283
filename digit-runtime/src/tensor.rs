//! # Tensor utilities
//!
//! This module contains utilities to deal with dynamic ONNX tensors.
//!
//! The main enum is [`Tensor`], which is either a decoded constant
//! (an initializer, e.g. trained weights) or the description of a graph
//! input/output with a possibly parameterized shape.
//! Constant data is stored in the [`TensorData`] enum, which contains the
//! actual array with its element data type.
use ndarray::{ArrayD, IxDyn};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use thiserror::Error;

use crate::onnx_format::tensor_shape_proto::dimension::Value as DimensionValue;
use crate::onnx_format::type_proto::Value as TypeValue;
use crate::onnx_format::{TensorProto, ValueInfoProto};

#[derive(Error, Debug)]
pub enum TensorError {
    #[error("unsupported tensor element data type (tag {0})")]
    UnsupportedDataType(i32),
    #[error("the tensor data does not fit the declared dimensions {0:?}")]
    ShapeMismatch(Vec<usize>),
    #[error("the value info \"{0}\" does not describe a tensor")]
    MissingTensorType(String),
}

/// A dimension of a graph input/output tensor: either a concrete value or
/// a named parameter to be substituted at inference time (e.g. the batch
/// size "N" of a digit model).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphDimension {
    Value(usize),
    Parameter(String),
}

pub type TensorParametrizedShape = Vec<GraphDimension>;

#[derive(Debug, Clone)]
pub enum Tensor {
    /// A constant tensor decoded from an initializer.
    Constant(TensorData),
    /// A graph input or output, described by shape and element type only.
    InOut(TensorParametrizedShape, TensorDataType),
}

impl Tensor {
    /// Returns true for inputs/outputs whose shape has at least one
    /// parameterized dimension.
    pub fn is_parametrized_io(&self) -> bool {
        match self {
            Tensor::Constant(_) => false,
            Tensor::InOut(shape, _) => shape
                .iter()
                .any(|dim| matches!(dim, GraphDimension::Parameter(_))),
        }
    }
}

impl TryFrom<TensorProto> for Tensor {
    type Error = TensorError;

    fn try_from(proto: TensorProto) -> Result<Self, Self::Error> {
        let dimensions = proto
            .dims
            .iter()
            .map(|x| *x as usize)
            .collect::<Vec<usize>>();

        let data = convert_proto_to_tensor_data(proto, dimensions)?;

        Ok(Tensor::Constant(data))
    }
}

impl TryFrom<ValueInfoProto> for Tensor {
    type Error = TensorError;

    fn try_from(value_info: ValueInfoProto) -> Result<Self, Self::Error> {
        let name = value_info.name().to_string();
        let Some(TypeValue::TensorType(tensor_type)) =
            value_info.r#type.and_then(|t| t.value)
        else {
            return Err(TensorError::MissingTensorType(name));
        };

        let element_type = tensor_type.elem_type.unwrap_or_default();
        let element_type: TensorDataType = FromPrimitive::from_i32(element_type)
            .ok_or(TensorError::UnsupportedDataType(element_type))?;

        let shape = tensor_type
            .shape
            .map(|shape| {
                shape
                    .dim
                    .into_iter()
                    .map(|dim| match dim.value {
                        Some(DimensionValue::DimValue(v)) => GraphDimension::Value(v as usize),
                        Some(DimensionValue::DimParam(p)) => GraphDimension::Parameter(p),
                        // an unconstrained dimension behaves like an
                        // anonymous parameter
                        None => GraphDimension::Parameter(String::new()),
                    })
                    .collect::<TensorParametrizedShape>()
            })
            .unwrap_or_default();

        Ok(Tensor::InOut(shape, element_type))
    }
}

/// Enum representing the different types of data that can be stored in a
/// tensor in ONNX.
/// This is the subset of the types defined in the ONNX protobuf
/// specification that digit classifier models use.
/// The tags are the same as the ones defined in the protobuf specification.
#[derive(Debug, Clone, Copy, FromPrimitive, ToPrimitive, PartialEq, Eq)]
pub enum TensorDataType {
    /// 32-bit floating point, equivalent to Rust's `f32`
    Float = 1,
    /// Unsigned 8-bit int, equivalent to Rust's `u8`
    Uint8 = 2,
    /// Signed 32-bit int, equivalent to Rust's `i32`
    Int32 = 6,
    /// Signed 64-bit int, equivalent to Rust's `i64`
    Int64 = 7,
    /// 64-bit floating point, equivalent to Rust's `f64`
    Double = 11,
}

impl std::fmt::Display for TensorDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TensorDataType::Float => "Float",
            TensorDataType::Uint8 => "Uint8",
            TensorDataType::Int32 => "Int32",
            TensorDataType::Int64 => "Int64",
            TensorDataType::Double => "Double",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    Float(ArrayD<f32>),
    Uint8(ArrayD<u8>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    Double(ArrayD<f64>),
}

impl TensorData {
    pub fn dtype(&self) -> TensorDataType {
        match self {
            TensorData::Float(_) => TensorDataType::Float,
            TensorData::Uint8(_) => TensorDataType::Uint8,
            TensorData::Int32(_) => TensorDataType::Int32,
            TensorData::Int64(_) => TensorDataType::Int64,
            TensorData::Double(_) => TensorDataType::Double,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            TensorData::Float(a) => a.shape(),
            TensorData::Uint8(a) => a.shape(),
            TensorData::Int32(a) => a.shape(),
            TensorData::Int64(a) => a.shape(),
            TensorData::Double(a) => a.shape(),
        }
    }
}

impl From<&TensorData> for TensorDataType {
    fn from(data: &TensorData) -> Self {
        data.dtype()
    }
}

fn convert_proto_to_tensor_data(
    proto: TensorProto,
    dimensions: Vec<usize>,
) -> Result<TensorData, TensorError> {
    let element_data_type: TensorDataType = FromPrimitive::from_i32(proto.data_type())
        .ok_or(TensorError::UnsupportedDataType(proto.data_type()))?;

    let shape_error = || TensorError::ShapeMismatch(dimensions.clone());

    let data = match element_data_type {
        TensorDataType::Float => {
            let data: Vec<f32> = {
                match proto.raw_data {
                    Some(raw_data) => raw_data
                        .chunks_exact(4)
                        .map(|x| f32::from_le_bytes([x[0], x[1], x[2], x[3]]))
                        .collect(),
                    None => proto.float_data,
                }
            };
            TensorData::Float(
                ArrayD::from_shape_vec(IxDyn(&dimensions), data).map_err(|_| shape_error())?,
            )
        }
        TensorDataType::Uint8 => {
            let data: Vec<u8> = {
                match proto.raw_data {
                    Some(raw_data) => raw_data,
                    None => proto.int32_data.iter().map(|x| *x as u8).collect(),
                }
            };
            TensorData::Uint8(
                ArrayD::from_shape_vec(IxDyn(&dimensions), data).map_err(|_| shape_error())?,
            )
        }
        TensorDataType::Int32 => {
            let data: Vec<i32> = {
                match proto.raw_data {
                    Some(raw_data) => raw_data
                        .chunks_exact(4)
                        .map(|x| i32::from_le_bytes([x[0], x[1], x[2], x[3]]))
                        .collect(),
                    None => proto.int32_data,
                }
            };
            TensorData::Int32(
                ArrayD::from_shape_vec(IxDyn(&dimensions), data).map_err(|_| shape_error())?,
            )
        }
        TensorDataType::Int64 => {
            let data: Vec<i64> = {
                match proto.raw_data {
                    Some(raw_data) => raw_data
                        .chunks_exact(8)
                        .map(|x| {
                            i64::from_le_bytes([x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7]])
                        })
                        .collect(),
                    None => proto.int64_data,
                }
            };
            TensorData::Int64(
                ArrayD::from_shape_vec(IxDyn(&dimensions), data).map_err(|_| shape_error())?,
            )
        }
        TensorDataType::Double => {
            let data: Vec<f64> = {
                match proto.raw_data {
                    Some(raw_data) => raw_data
                        .chunks_exact(8)
                        .map(|x| {
                            f64::from_le_bytes([x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7]])
                        })
                        .collect(),
                    None => proto.double_data,
                }
            };
            TensorData::Double(
                ArrayD::from_shape_vec(IxDyn(&dimensions), data).map_err(|_| shape_error())?,
            )
        }
    };

    Ok(data)
}
