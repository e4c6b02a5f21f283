//! # digit-runtime
//!
//! An inference runtime for handwritten-digit classifier models stored in
//! the ONNX format.
//!
//! The crate decodes a pretrained model with [`prost`], translates it into
//! an executable [`petgraph`] graph and walks it in topological order,
//! executing each operator through an execution provider. The
//! [`service`] module is the intended entry point: it also takes care of
//! turning digit images into input tensors and model scores into ranked
//! predictions.

pub mod graph;
pub mod onnx_format;
pub mod operators;
pub mod providers;
pub mod service;
pub mod tensor;
