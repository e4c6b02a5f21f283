use digit_runtime::onnx_format::{
    tensor_shape_proto, type_proto, TensorProto, TensorShapeProto, TypeProto, ValueInfoProto,
};
use digit_runtime::tensor::{GraphDimension, Tensor, TensorData, TensorDataType, TensorError};

fn float_proto(name: &str, dims: Vec<i64>) -> TensorProto {
    TensorProto {
        dims,
        data_type: Some(1),
        name: Some(name.to_string()),
        ..Default::default()
    }
}

#[test]
fn decodes_typed_float_data() {
    let mut proto = float_proto("weights", vec![2, 2]);
    proto.float_data = vec![1.0, 2.0, 3.0, 4.0];

    let Tensor::Constant(data) = Tensor::try_from(proto).unwrap() else {
        panic!("expected a constant tensor")
    };

    assert_eq!(data.dtype(), TensorDataType::Float);
    assert_eq!(data.shape(), &[2, 2]);
    let TensorData::Float(array) = data else {
        panic!("expected float data")
    };
    assert_eq!(array[[1, 1]], 4.0);
}

#[test]
fn decodes_raw_little_endian_float_data() {
    let mut proto = float_proto("weights", vec![2]);
    let mut raw = Vec::new();
    raw.extend_from_slice(&0.5_f32.to_le_bytes());
    raw.extend_from_slice(&(-1.5_f32).to_le_bytes());
    proto.raw_data = Some(raw);

    let Tensor::Constant(TensorData::Float(array)) = Tensor::try_from(proto).unwrap() else {
        panic!("expected float data")
    };

    assert_eq!(array.as_slice().unwrap(), &[0.5, -1.5]);
}

#[test]
fn decodes_int64_shape_tensors() {
    let proto = TensorProto {
        dims: vec![2],
        data_type: Some(7),
        int64_data: vec![-1, 784],
        name: Some(String::from("reshape_target")),
        ..Default::default()
    };

    let Tensor::Constant(TensorData::Int64(array)) = Tensor::try_from(proto).unwrap() else {
        panic!("expected int64 data")
    };

    assert_eq!(array.as_slice().unwrap(), &[-1, 784]);
}

#[test]
fn rejects_mismatched_dimensions() {
    let mut proto = float_proto("weights", vec![3]);
    proto.float_data = vec![1.0, 2.0];

    let err = Tensor::try_from(proto).unwrap_err();
    assert!(matches!(err, TensorError::ShapeMismatch(_)));
}

#[test]
fn rejects_unsupported_element_types() {
    // tag 8 is the ONNX string type, which digit models never carry
    let proto = TensorProto {
        dims: vec![1],
        data_type: Some(8),
        name: Some(String::from("labels")),
        ..Default::default()
    };

    let err = Tensor::try_from(proto).unwrap_err();
    assert!(matches!(err, TensorError::UnsupportedDataType(8)));
}

#[test]
fn parses_a_parameterized_value_info() {
    let value_info = ValueInfoProto {
        name: Some(String::from("image")),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type: Some(1),
                shape: Some(TensorShapeProto {
                    dim: vec![
                        tensor_shape_proto::Dimension {
                            denotation: None,
                            value: Some(tensor_shape_proto::dimension::Value::DimParam(
                                String::from("N"),
                            )),
                        },
                        tensor_shape_proto::Dimension {
                            denotation: None,
                            value: Some(tensor_shape_proto::dimension::Value::DimValue(784)),
                        },
                    ],
                }),
            })),
        }),
        doc_string: None,
    };

    let tensor = Tensor::try_from(value_info).unwrap();
    assert!(tensor.is_parametrized_io());

    let Tensor::InOut(shape, element_type) = tensor else {
        panic!("expected an input/output description")
    };
    assert_eq!(element_type, TensorDataType::Float);
    assert_eq!(
        shape,
        vec![
            GraphDimension::Parameter(String::from("N")),
            GraphDimension::Value(784),
        ]
    );
}

#[test]
fn a_constant_is_never_a_parameterized_io() {
    let mut proto = float_proto("weights", vec![1]);
    proto.float_data = vec![0.0];

    let tensor = Tensor::try_from(proto).unwrap();
    assert!(!tensor.is_parametrized_io());
}
