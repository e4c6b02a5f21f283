//! # Validators
//! These are used for validating the initializer types of the operators.
//! The valid types for each operator input are defined in the ONNX
//! specification.
//!
//! Keep in mind that this just checks the types of the initializers
//! according to the ONNX specs, not their values.
//! Each operator implementation (execution provider) is responsible for
//! checking the values and shapes of its operands.

use crate::tensor::TensorDataType;

use super::{AddInits, ConvInits, GemmInits, MatMulInits, ReshapeInits};

macro_rules! validate_tensor_data_type {
    ($tensor:expr, $($type:ident)|+) => {

        match $tensor.into() {
            $(
                TensorDataType::$type => Ok(()),
            )+
            _ => Err(format!(
                    "{} must be of type {}, found {:?}",
                    stringify!($tensor),
                    stringify!($($type)|+),
                    TensorDataType::from($tensor)
                ))
           ,
        }
    };
}

impl ConvInits {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(bias) = &self.bias {
            validate_tensor_data_type!(bias, Float | Double)?;
        }
        validate_tensor_data_type!(&self.weights, Float | Double)
    }
}

impl AddInits {
    pub fn validate(&self) -> Result<(), String> {
        validate_tensor_data_type!(&self.operand, Float | Double)
    }
}

impl ReshapeInits {
    pub fn validate(&self) -> Result<(), String> {
        validate_tensor_data_type!(&self.shape, Int32 | Int64)
    }
}

impl MatMulInits {
    pub fn validate(&self) -> Result<(), String> {
        validate_tensor_data_type!(&self.b, Float | Double)
    }
}

impl GemmInits {
    pub fn validate(&self) -> Result<(), String> {
        validate_tensor_data_type!(&self.b, Float | Double)?;
        validate_tensor_data_type!(&self.c, Float | Double)
    }
}
