use image::imageops::FilterType;
use ndarray::{Array4, Axis, ShapeError};

/// The side length of the model input plane.
pub const INPUT_SIDE: usize = 28;

/// Preprocess a single digit image.
///
/// It should be used only on a single image.
/// It will always add a batch dimension equal to 1 to the result.
pub fn preprocessing(image: &image::DynamicImage) -> ndarray::Array4<f32> {
    // call single_preprocessing on the image and add a batch dimension
    single_preprocessing(image).insert_axis(ndarray::Axis(0))
}

/// Preprocess a batch of digit images.
///
/// It will add a batch dimension equal to the number of images to the
/// result.
pub fn batch_preprocessing(
    images: &[image::DynamicImage],
) -> Result<ndarray::Array4<f32>, ShapeError> {
    // call single_preprocessing on each image and create an array4 from the results
    Array4::from_shape_vec(
        (images.len(), 1, INPUT_SIDE, INPUT_SIDE),
        images.iter().flat_map(single_preprocessing).collect(),
    )
}

/// Postprocess the output of the model.
///
/// This will apply a softmax function to the scores.
pub fn postprocessing(tensor: ndarray::Array2<f32>) -> ndarray::Array2<f32> {
    // softmax on the last axis of the tensor
    let tensor = tensor.mapv(|x| x.exp());

    tensor.clone()
        / tensor
            .sum_axis(ndarray::Axis(1))
            .insert_axis(ndarray::Axis(1))
}

/// True when every row of the tensor already is a probability
/// distribution, i.e. the model ends with its own softmax.
pub(crate) fn is_probability_distribution(tensor: &ndarray::Array2<f32>) -> bool {
    tensor.iter().all(|&v| (0.0..=1.0).contains(&v))
        && tensor
            .sum_axis(Axis(1))
            .iter()
            .all(|&row_sum| (row_sum - 1.0).abs() < 1e-3)
}

/// Preprocess a batch element the way the digit classifier was trained:
/// grayscale, inverted intensities (the strokes become bright on a dark
/// background), 28x28, scaled to [0, 1], channel-first.
fn single_preprocessing(image: &image::DynamicImage) -> ndarray::Array3<f32> {
    let mut gray = image.to_luma8();
    image::imageops::invert(&mut gray);
    let resized = image::imageops::resize(&gray, INPUT_SIDE as u32, INPUT_SIDE as u32, FilterType::Triangle);

    // convert the image to a [1, 28, 28] tensor, scaling to [0, 1]
    ndarray::Array3::from_shape_fn((1, INPUT_SIDE, INPUT_SIDE), |(_, y, x)| {
        f32::from(resized.get_pixel(x as u32, y as u32)[0]) / 255.0
    })
}
