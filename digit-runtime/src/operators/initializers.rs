use crate::tensor::TensorData;

#[derive(Debug, Clone)]
pub struct ConvInits {
    pub weights: TensorData,
    pub bias: Option<TensorData>,
}

#[derive(Debug, Clone)]
pub struct AddInits {
    pub operand: TensorData,
}

#[derive(Debug, Clone)]
pub struct ReshapeInits {
    pub shape: TensorData,
}

#[derive(Debug, Clone)]
pub struct MatMulInits {
    pub b: TensorData,
}

#[derive(Debug, Clone)]
pub struct GemmInits {
    pub b: TensorData,
    pub c: TensorData,
}

impl ConvInits {
    pub fn new(weights: TensorData, bias: Option<TensorData>) -> Self {
        Self { weights, bias }
    }
}

impl AddInits {
    pub fn new(operand: TensorData) -> Self {
        Self { operand }
    }
}

impl ReshapeInits {
    pub fn new(shape: TensorData) -> Self {
        Self { shape }
    }
}

impl MatMulInits {
    pub fn new(b: TensorData) -> Self {
        Self { b }
    }
}

impl GemmInits {
    pub fn new(b: TensorData, c: TensorData) -> Self {
        Self { b, c }
    }
}
