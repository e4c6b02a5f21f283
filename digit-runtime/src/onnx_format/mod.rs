///
/// # ONNX Format
///
/// This module contains the ONNX format related code.
///
/// The ONNX format is defined in the [ONNX specification](https://github.com/onnx/onnx/blob/main/docs/IR.md).
///
/// Only the subset of the protobuf messages needed to decode digit
/// classifier models is kept here.
///
mod onnx_model;

pub use onnx_model::*;
