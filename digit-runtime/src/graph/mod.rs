///
/// # Graph
///
/// This module defines the mapping between the ONNX standard and the graph
/// structure used to infer a digit classifier model.
///
mod translator;
pub use translator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("ConversionError: {0}")]
    ConversionError(String),

    #[error("missing attribute {attribute} for operator {operator} of type {operator_type}")]
    MissingAttribute {
        attribute: String,
        operator: String,
        operator_type: String,
    },

    #[error("missing initializer {initializer} for operator {operator}")]
    MissingInitializer {
        initializer: String,
        operator: String,
    },

    #[error("invalid initializer: {0}")]
    InvalidInitializer(String),

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("unsupported configuration for operator {operator}: {reason}")]
    UnsupportedConfiguration { operator: String, reason: String },

    #[error("no producer found for an input of {child_name}")]
    ParentNotFound { child_name: String },

    #[error("could not parse the graph input node")]
    InputNodeParsingError,

    #[error("could not parse the graph output node")]
    OutputNodeParsingError,
}
