use criterion::{black_box, criterion_group, Criterion};
use digit_runtime::onnx_format::{
    tensor_shape_proto, type_proto, AttributeProto, GraphProto, ModelProto, NodeProto,
    TensorProto, TensorShapeProto, TypeProto, ValueInfoProto,
};
use digit_runtime::service::prepare::preprocessing;
use digit_runtime::service::{Config, Service};
use digit_runtime::tensor::TensorData;
use image::{DynamicImage, GrayImage, Luma};
use std::time::Duration;

fn io_value_info(name: &str, dims: &[i64]) -> ValueInfoProto {
    let dim = dims
        .iter()
        .map(|&d| tensor_shape_proto::Dimension {
            denotation: None,
            value: Some(if d < 0 {
                tensor_shape_proto::dimension::Value::DimParam(String::from("N"))
            } else {
                tensor_shape_proto::dimension::Value::DimValue(d)
            }),
        })
        .collect();
    ValueInfoProto {
        name: Some(name.to_string()),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type: Some(1),
                shape: Some(TensorShapeProto { dim }),
            })),
        }),
        doc_string: None,
    }
}

fn float_initializer(name: &str, dims: &[i64], data: Vec<f32>) -> TensorProto {
    TensorProto {
        dims: dims.to_vec(),
        data_type: Some(1),
        float_data: data,
        name: Some(name.to_string()),
        ..Default::default()
    }
}

fn node(
    op_type: &str,
    name: &str,
    inputs: &[&str],
    outputs: &[&str],
    attributes: Vec<AttributeProto>,
) -> NodeProto {
    NodeProto {
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: outputs.iter().map(|s| s.to_string()).collect(),
        name: Some(name.to_string()),
        op_type: Some(op_type.to_string()),
        attribute: attributes,
        doc_string: None,
        domain: None,
    }
}

fn ints_attr(name: &str, values: &[i64]) -> AttributeProto {
    AttributeProto {
        name: Some(name.to_string()),
        ints: values.to_vec(),
        ..Default::default()
    }
}

/// A small digit CNN with patterned weights, wide enough to keep the
/// operators busy.
fn digit_model() -> ModelProto {
    let conv_weights: Vec<f32> = (0..16 * 25).map(|v| ((v * 7 + 3) % 11) as f32 * 0.01).collect();
    let fc_weights: Vec<f32> = (0..3136 * 10).map(|v| ((v * 3 + 1) % 13) as f32 * 0.001).collect();

    let graph = GraphProto {
        node: vec![
            node(
                "Conv",
                "conv",
                &["image", "conv_weights"],
                &["conv_out"],
                vec![
                    ints_attr("kernel_shape", &[5, 5]),
                    ints_attr("pads", &[2, 2, 2, 2]),
                    ints_attr("strides", &[1, 1]),
                ],
            ),
            node("Relu", "relu", &["conv_out"], &["relu_out"], vec![]),
            node(
                "MaxPool",
                "pool",
                &["relu_out"],
                &["pool_out"],
                vec![
                    ints_attr("kernel_shape", &[2, 2]),
                    ints_attr("strides", &[2, 2]),
                ],
            ),
            node(
                "Flatten",
                "flatten",
                &["pool_out"],
                &["flat_out"],
                vec![AttributeProto {
                    name: Some(String::from("axis")),
                    i: Some(1),
                    ..Default::default()
                }],
            ),
            node(
                "Gemm",
                "fc",
                &["flat_out", "fc_weights", "fc_bias"],
                &["logits"],
                vec![],
            ),
            node("Softmax", "probabilities", &["logits"], &["scores"], vec![]),
        ],
        name: Some(String::from("digit_cnn")),
        initializer: vec![
            float_initializer("conv_weights", &[16, 1, 5, 5], conv_weights),
            float_initializer("fc_weights", &[3136, 10], fc_weights),
            float_initializer("fc_bias", &[10], vec![0.0; 10]),
        ],
        input: vec![io_value_info("image", &[-1, 1, 28, 28])],
        output: vec![io_value_info("scores", &[-1, 10])],
        ..Default::default()
    };
    ModelProto {
        ir_version: Some(3),
        graph: Some(graph),
        ..Default::default()
    }
}

fn digit_image() -> DynamicImage {
    let mut canvas = GrayImage::from_pixel(28, 28, Luma([255]));
    for y in 4..24 {
        for x in 12..16 {
            canvas.put_pixel(x, y, Luma([0]));
        }
    }
    DynamicImage::ImageLuma8(canvas)
}

fn run_digit_model(num_threads: usize) -> TensorData {
    let preprocessed_image = preprocessing(&digit_image());

    let config = Config { num_threads };
    let service = Service::new(digit_model(), config);
    let input_parameters = vec![(String::from("N"), 1_usize)];
    service
        .run(preprocessed_image.into_dyn(), input_parameters)
        .unwrap()
}

fn bench_runtime(c: &mut Criterion) {
    let mut group = c.benchmark_group("Runtime");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(30));
    group.bench_function("DigitCnnSingleThread", move |b| {
        b.iter(|| run_digit_model(black_box(1)))
    });
    group.bench_function("DigitCnnFourThreads", move |b| {
        b.iter(|| run_digit_model(black_box(4)))
    });
    group.finish();
}

criterion_group!(runtime, bench_runtime,);
