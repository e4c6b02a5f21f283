#[derive(Debug, Clone)]
pub struct ConvAttributes {
    // assuming 4D NCHW tensors
    pub kernel_shape: [usize; 2],
    pub pads: [usize; 4],
    pub strides: [usize; 2],
}

#[derive(Debug, Clone)]
pub struct MaxPoolAttributes {
    pub kernel_shape: [usize; 2],
    pub pads: [usize; 4],
    pub strides: [usize; 2],
}

#[derive(Debug, Clone)]
pub struct GemmAttributes {
    pub alpha: f32,
    pub beta: f32,
    pub trans_a: i64,
    pub trans_b: i64,
}

#[derive(Debug, Clone)]
pub struct FlattenAttributes {
    pub axis: usize,
}

#[derive(Debug, Clone)]
pub struct SoftmaxAttributes {
    pub axis: i64,
}

impl ConvAttributes {
    pub fn new(kernel_shape: [usize; 2], pads: [usize; 4], strides: [usize; 2]) -> Self {
        Self {
            kernel_shape,
            pads,
            strides,
        }
    }
}

impl Default for ConvAttributes {
    fn default() -> Self {
        ConvAttributes {
            kernel_shape: [3, 3],
            pads: [0, 0, 0, 0],
            strides: [1, 1],
        }
    }
}

impl MaxPoolAttributes {
    pub fn new(kernel_shape: [usize; 2], pads: [usize; 4], strides: [usize; 2]) -> Self {
        Self {
            kernel_shape,
            pads,
            strides,
        }
    }
}

impl GemmAttributes {
    pub fn new(alpha: f32, beta: f32, trans_a: i64, trans_b: i64) -> Self {
        Self {
            alpha,
            beta,
            trans_a,
            trans_b,
        }
    }
}

impl Default for GemmAttributes {
    // the defaults from the ONNX operator specification
    fn default() -> Self {
        GemmAttributes {
            alpha: 1.0,
            beta: 1.0,
            trans_a: 0,
            trans_b: 0,
        }
    }
}

impl FlattenAttributes {
    pub fn new(axis: usize) -> Self {
        Self { axis }
    }
}

impl Default for FlattenAttributes {
    fn default() -> Self {
        FlattenAttributes { axis: 1 }
    }
}

impl SoftmaxAttributes {
    pub fn new(axis: i64) -> Self {
        Self { axis }
    }
}

impl Default for SoftmaxAttributes {
    fn default() -> Self {
        SoftmaxAttributes { axis: -1 }
    }
}
