use std::{fs::File, io::Read, path::Path};

use prost::Message;

use crate::onnx_format::ModelProto;

use super::{prepare::batch_preprocessing, ServiceError};

/// Read and prepare digit images.
///
/// It will load the images from the given paths, preprocess them and
/// return the batched input tensor.
pub fn read_and_prepare_images<P>(paths: &[P]) -> Result<ndarray::Array4<f32>, ServiceError>
where
    P: AsRef<Path>,
{
    let images = paths
        .iter()
        .map(image::open)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServiceError::InvalidInput(Box::new(e)))?;

    batch_preprocessing(images.as_slice()).map_err(|e| ServiceError::InvalidInput(Box::new(e)))
}

/// Read an ONNX model from the given path.
/// It will return a [`ModelProto`] that can be used by a
/// [`Service`](super::Service).
pub fn read_model_proto<P>(path: P) -> Result<ModelProto, ServiceError>
where
    P: AsRef<Path>,
{
    let mut buffer = Vec::new();
    let mut file = File::open(path).map_err(ServiceError::CouldNotReadModel)?;
    file.read_to_end(&mut buffer)
        .map_err(ServiceError::CouldNotReadModel)?;

    ModelProto::decode(buffer.as_slice()).map_err(ServiceError::CouldNotDecodeModel)
}
