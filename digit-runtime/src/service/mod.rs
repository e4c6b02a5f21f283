//! Contains the service that can be used to run inference on a digit
//! classifier model.
//!
//! The service is created using a [`ServiceBuilder`], which can be created
//! using [`ServiceBuilder::new`].
//!
//! The service can be used to run inference on a model using the
//! [`Service::run`] method, if you want to preprocess and postprocess the
//! input and output data yourself.
//! Otherwise, you can use the [`Service::prepare_and_run`] method, which
//! will preprocess the input images and postprocess the output scores for
//! you.

mod labels;
pub mod prepare;
pub mod utility;

use ndarray::{ArrayD, Ix1};
use petgraph::{algo::toposort, Direction};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::{borrow::BorrowMut, error::Error, ops::ControlFlow, path::PathBuf};
use thiserror::Error;

use crate::{
    graph::{create_graph, GraphError},
    onnx_format::ModelProto,
    operators::{OperationError, Operator},
    providers::{DefaultProvider, Provider},
    tensor::{GraphDimension, TensorData},
};

use self::labels::DIGIT_LABELS;
use self::prepare::{is_probability_distribution, postprocessing};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("The input is invalid: {0}")]
    InvalidInput(Box<dyn Error>),
    #[error("The model file could not be read: {0}")]
    CouldNotReadModel(std::io::Error),
    #[error("The model file could not be decoded: {0}")]
    CouldNotDecodeModel(prost::DecodeError),
    #[error("The model could not be translated into an executable graph: {0}")]
    CouldNotTranslateModel(GraphError),
    #[error("An operation failed while inferring the model: {0}")]
    CouldNotExecuteOperation(OperationError),
    #[error("The used model is invalid: {0}")]
    InvalidModel(&'static str),
    #[error("The output node was not found")]
    OutputNodeNotFound,
    #[error("The output shape {actual} is different than expected {expected}")]
    InvalidOutputShape { expected: usize, actual: usize },
    #[error("The output type {actual} is different than expected {expected}")]
    UnexpectedOutputType { expected: String, actual: String },
    #[error("The model emits {actual} classes, expected {expected}")]
    UnexpectedClassCount { expected: usize, actual: usize },
}

#[derive(Clone, Debug)]
pub struct ServiceBuilder {
    model_path: PathBuf,
    config: Config,
}

pub struct Service {
    model: ModelProto,
    config: Config,
    thread_pool: ThreadPool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub num_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { num_threads: 1 }
    }
}

impl ServiceBuilder {
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            config: Config::default(),
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Service, ServiceError> {
        let model = utility::read_model_proto(self.model_path.as_path())?;
        Ok(Service::new(model, self.config))
    }
}

pub struct Prediction {
    pub class: String,
    pub probability: f32,
}

pub struct InferenceOutput {
    batch_predictions: ndarray::Array2<f32>,
}

impl InferenceOutput {
    pub fn new(output_tensor: ArrayD<f32>) -> Result<Self, ServiceError> {
        if output_tensor.ndim() != 2 {
            return Err(ServiceError::InvalidOutputShape {
                expected: 2,
                actual: output_tensor.ndim(),
            });
        }

        let output_tensor = output_tensor.into_dimensionality::<ndarray::Ix2>().unwrap();
        if output_tensor.shape()[1] != DIGIT_LABELS.len() {
            return Err(ServiceError::UnexpectedClassCount {
                expected: DIGIT_LABELS.len(),
                actual: output_tensor.shape()[1],
            });
        }

        // models ending in their own Softmax already emit distributions
        let batch_predictions = if is_probability_distribution(&output_tensor) {
            output_tensor
        } else {
            postprocessing(output_tensor)
        };
        Ok(Self { batch_predictions })
    }

    /// The argmax of every batch row: the digit the model predicts for
    /// each input image.
    pub fn predicted_digits(&self) -> Vec<usize> {
        self.batch_predictions
            .outer_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
                    .map(|(class, _)| class)
                    .unwrap_or(0)
            })
            .collect()
    }

    pub fn get_top_k_predictions(&self, k: usize) -> Vec<Vec<Prediction>> {
        // for each row in the tensor, get the top k predictions
        self.batch_predictions
            .outer_iter()
            .map(|row| self.get_batch_element_top_k_classes(row.to_owned(), k))
            .collect()
    }

    pub fn get_top_k_class_names(&self, k: usize) -> Vec<Vec<String>> {
        let top_classes = self.get_top_k_predictions(k);

        // for each batch element, get the top k classes
        top_classes
            .into_iter()
            .map(|batch_element_top_classes| {
                batch_element_top_classes
                    .into_iter()
                    .map(|prediction| prediction.class)
                    .take(k)
                    .collect()
            })
            .collect()
    }

    fn get_batch_element_top_k_classes(
        &self,
        tensor: ndarray::Array1<f32>,
        k: usize,
    ) -> Vec<Prediction> {
        let mut top_k_classes = tensor.iter().enumerate().collect::<Vec<_>>();
        top_k_classes.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap());
        top_k_classes.truncate(k);

        top_k_classes
            .into_iter()
            .map(|(class, probability)| Prediction {
                class: String::from(DIGIT_LABELS[class]),
                probability: *probability,
            })
            .collect()
    }
}

impl Service {
    pub fn new(model: ModelProto, config: Config) -> Self {
        let n_threads = config.num_threads;
        Self {
            model,
            config,
            thread_pool: ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build()
                .expect("Unable to create ThreadPool"),
        }
    }

    pub fn current_config(&self) -> Config {
        self.config.clone()
    }

    /// Preprocesses multiple input images and runs the service on them, using the input parameters and the default execution provider.
    pub fn prepare_and_run(
        &self,
        inputs: Vec<PathBuf>,
        input_parameters: Vec<(String, usize)>,
    ) -> Result<InferenceOutput, ServiceError> {
        self.prepare_and_run_with_provider::<DefaultProvider>(inputs, input_parameters)
    }

    /// Preprocesses multiple input images and runs the service on them, using the input parameters and the given execution provider.
    pub fn prepare_and_run_with_provider<P: Provider>(
        &self,
        inputs: Vec<PathBuf>,
        input_parameters: Vec<(String, usize)>,
    ) -> Result<InferenceOutput, ServiceError> {
        let input_tensor = utility::read_and_prepare_images(inputs.as_slice())?.into_dyn();
        let output_tensor = self.run_with_provider::<P>(input_tensor, input_parameters)?;
        let TensorData::Float(output_tensor) = output_tensor else {
            return Err(ServiceError::UnexpectedOutputType {
                expected: String::from("Float"),
                actual: output_tensor.dtype().to_string(),
            });
        };

        let result = InferenceOutput::new(output_tensor)?;
        Ok(result)
    }

    /// Runs the service on the input data, using the input parameters and the default execution provider.
    pub fn run(
        &self,
        input: ArrayD<f32>,
        input_parameters: Vec<(String, usize)>,
    ) -> Result<TensorData, ServiceError> {
        self.run_with_provider::<DefaultProvider>(input, input_parameters)
    }

    /// Runs the service on the input data, using the input parameters and the chosen execution provider.
    pub fn run_with_provider<P>(
        &self,
        input: ArrayD<f32>,
        input_parameters: Vec<(String, usize)>,
    ) -> Result<TensorData, ServiceError>
    where
        P: Provider,
    {
        let mut final_output = None;
        let mut operations_graph =
            create_graph(self.model.clone()).map_err(ServiceError::CouldNotTranslateModel)?;
        let ordered_operation_list = toposort(&operations_graph, None)
            .map_err(|_| ServiceError::InvalidModel("The model's graph is not a DAG"))?;

        let execution_result = ordered_operation_list.into_iter()
            .try_for_each(|node| {
                let incoming_data = operations_graph
                    .edges_directed(node, Direction::Incoming)
                    .map(|e| {
                        e.weight()
                            .borrow()
                            .clone()
                            .expect("Trying to get data as an input for an operation, but the data is being used by another operation")
                    })
                    .collect::<Vec<TensorData>>();

                // if the incoming data is empty, it means that the current node is an input node
                // and we need to pass the input data to it
                let incoming_data = if incoming_data.is_empty() {
                    vec![TensorData::Float(input.clone())]
                } else {
                    incoming_data
                };

                let operation_result = execute_operation::<P>(incoming_data, &input_parameters, &operations_graph[node], &self.thread_pool);
                let outgoing_data = match operation_result {
                    Ok(res) => res,
                    Err(e) => return ControlFlow::Break(e),
                };

                // for each outgoing edge, set the data to the outgoing data
                operations_graph
                    .borrow_mut()
                    .edges_directed(node, Direction::Outgoing)
                    .for_each(|e| {
                        e.weight().replace(Some(outgoing_data.clone()));
                    });

                // check if the current node is an output node
                if let Operator::OutputCollector(_) = operations_graph[node] {
                    final_output = Some(outgoing_data);
                }

                ControlFlow::Continue(())
            });

        match execution_result {
            ControlFlow::Continue(_) => (),
            ControlFlow::Break(e) => return Err(ServiceError::CouldNotExecuteOperation(e)),
        };
        final_output.ok_or(ServiceError::OutputNodeNotFound)
    }
}

fn execute_operation<ChosenProvider>(
    inputs: Vec<TensorData>,
    input_parameters: &[(String, usize)],
    operator: &Operator,
    thread_pool: &ThreadPool,
) -> Result<TensorData, OperationError>
where
    ChosenProvider: Provider,
{
    match operator {
        Operator::InputFeed(required_shape) | Operator::OutputCollector(required_shape) => {
            let input_shape = inputs[0].shape();
            if required_shape.is_empty() {
                return Err(OperationError::WrongShape(
                    String::from("Non-empty"),
                    String::from("Empty"),
                ));
            }
            if required_shape.len() != input_shape.len() {
                return Err(OperationError::WrongDim(
                    required_shape.len(),
                    input_shape.len(),
                ));
            }
            // if the required shape is parameterized, replace the parameters
            // with the values from the input_parameters
            let required_shape = required_shape
                .iter()
                .map(|dim| match dim {
                    GraphDimension::Parameter(name) => {
                        let param = input_parameters
                            .iter()
                            .find(|(param_name, _)| param_name == name)
                            .ok_or_else(|| {
                                OperationError::MissingParamDimension(String::from(name))
                            })?;
                        Ok(param.1)
                    }
                    GraphDimension::Value(dim) => Ok(*dim),
                })
                .collect::<Result<Vec<usize>, OperationError>>()?;

            // check if the input shape matches the required shape
            if required_shape != input_shape {
                return Err(OperationError::UnexpectedInputShape {
                    expected: required_shape.to_vec(),
                    actual: input_shape.to_vec(),
                });
            }

            Ok(inputs[0].clone())
        }

        Operator::Convolution(inits, attrs) => {
            let TensorData::Float(operand) = inputs[0].clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("X"),
                ));
            };
            let TensorData::Float(weights) = inits.weights.clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("weights"),
                ));
            };

            let bias = inits
                .bias
                .clone()
                .map(|b| match b {
                    TensorData::Float(b) => {
                        if b.ndim() != 1 {
                            return Err(OperationError::WrongDim(1, b.ndim()));
                        };
                        Ok(b.into_dimensionality::<Ix1>().unwrap())
                    }
                    _ => Err(OperationError::InvalidTensorType(
                        operator.name(),
                        String::from("bias"),
                    )),
                })
                .transpose()?;

            let result = ChosenProvider::conv(thread_pool, operand, weights, bias, attrs.clone())?;
            Ok(TensorData::Float(result))
        }
        Operator::ReLU => {
            let TensorData::Float(operand) = inputs[0].clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("X"),
                ));
            };
            let result = ChosenProvider::relu(thread_pool, operand);
            Ok(TensorData::Float(result))
        }
        Operator::MaxPool(attrs) => {
            let TensorData::Float(operand) = inputs[0].clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("X"),
                ));
            };
            let result = ChosenProvider::max_pool(thread_pool, operand, attrs.clone())?;
            Ok(TensorData::Float(result))
        }
        Operator::Add(inits) => {
            let TensorData::Float(lhs) = inputs[0].clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("A"),
                ));
            };
            let rhs = match inits {
                Some(inits) => {
                    let TensorData::Float(rhs) = inits.operand.clone() else {
                        return Err(OperationError::InvalidTensorType(
                            operator.name(),
                            String::from("B"),
                        ));
                    };
                    rhs
                }
                None => {
                    let Some(TensorData::Float(rhs)) = inputs.get(1).cloned() else {
                        return Err(OperationError::InvalidTensorType(
                            operator.name(),
                            String::from("B"),
                        ));
                    };
                    rhs
                }
            };
            let result = ChosenProvider::add(thread_pool, lhs, rhs)?;
            Ok(TensorData::Float(result))
        }
        Operator::Reshape(inits) => {
            let TensorData::Float(operand) = inputs[0].clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("X"),
                ));
            };
            let shape = match inits.shape.clone() {
                TensorData::Int64(shape) => shape,
                TensorData::Int32(shape) => shape.mapv(i64::from),
                _ => {
                    return Err(OperationError::InvalidTensorType(
                        operator.name(),
                        String::from("shape"),
                    ))
                }
            };

            let result = ChosenProvider::reshape(thread_pool, operand, shape)?;
            Ok(TensorData::Float(result))
        }
        Operator::Flatten(attrs) => {
            let TensorData::Float(operand) = inputs[0].clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("X"),
                ));
            };
            let result = ChosenProvider::flatten(thread_pool, operand, attrs.clone())?;
            Ok(TensorData::Float(result))
        }
        Operator::MatMul(inits) => {
            let TensorData::Float(matrix_a) = inputs[0].clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("A"),
                ));
            };
            let TensorData::Float(matrix_b) = inits.b.clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("B"),
                ));
            };
            let result = ChosenProvider::matmul(thread_pool, matrix_a, matrix_b)?;
            Ok(TensorData::Float(result))
        }
        Operator::Gemm(inits, attrs) => {
            let TensorData::Float(matrix_a) = inputs[0].clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("A"),
                ));
            };
            let TensorData::Float(matrix_b) = inits.b.clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("B"),
                ));
            };
            let TensorData::Float(matrix_c) = inits.c.clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("C"),
                ));
            };

            let result =
                ChosenProvider::gemm(thread_pool, matrix_a, matrix_b, matrix_c, attrs.clone())?;
            Ok(TensorData::Float(result))
        }
        Operator::Softmax(attrs) => {
            let TensorData::Float(operand) = inputs[0].clone() else {
                return Err(OperationError::InvalidTensorType(
                    operator.name(),
                    String::from("X"),
                ));
            };
            let result = ChosenProvider::softmax(thread_pool, operand, attrs.clone())?;
            Ok(TensorData::Float(result))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onnx_format::{
        tensor_shape_proto, type_proto, AttributeProto, GraphProto, NodeProto, TensorProto,
        TensorShapeProto, TypeProto, ValueInfoProto,
    };
    use image::{GrayImage, Luma};
    use ndarray::Array4;
    use prost::Message;
    use std::fs::File;
    use std::io::Write;

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

    /// A tiny but complete digit network: the zeroed fully-connected
    /// weights and the bias on class 3 make the prediction independent of
    /// the image content, which keeps the expectations exact.
    fn digit_model() -> ModelProto {
        let mut fc_bias = vec![0.0_f32; 10];
        fc_bias[3] = 2.0;

        let graph = GraphProto {
            node: vec![
                node(
                    "Conv",
                    "conv",
                    &["image", "conv_weights", "conv_bias"],
                    &["conv_out"],
                    vec![
                        ints_attr("kernel_shape", &[3, 3]),
                        ints_attr("pads", &[1, 1, 1, 1]),
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
                float_initializer("conv_weights", &[2, 1, 3, 3], vec![0.1; 18]),
                float_initializer("conv_bias", &[2], vec![0.0, 0.1]),
                float_initializer("fc_weights", &[392, 10], vec![0.0; 3920]),
                float_initializer("fc_bias", &[10], fc_bias),
            ],
            input: vec![io_value_info("image", &[-1, 1, 28, 28])],
            output: vec![io_value_info("scores", &[-1, 10])],
            ..Default::default()
        };
        ModelProto {
            ir_version: Some(3),
            producer_name: Some(String::from("digit-runtime-tests")),
            graph: Some(graph),
            ..Default::default()
        }
    }

    fn save_test_digit(file_name: &str) -> PathBuf {
        let mut canvas = GrayImage::from_pixel(28, 28, Luma([255]));
        // a rough vertical stroke
        for y in 4..24 {
            for x in 12..16 {
                canvas.put_pixel(x, y, Luma([0]));
            }
        }
        let path = std::env::temp_dir().join(file_name);
        canvas.save(&path).expect("Could not save the test image");
        path
    }

    #[test]
    fn run_digit_model_emits_class_scores() {
        let service = Service::new(digit_model(), Config { num_threads: 1 });
        let input = Array4::<f32>::ones((1, 1, 28, 28)).into_dyn();
        let input_parameters = vec![(String::from("N"), 1_usize)];

        let result = service.run(input, input_parameters).unwrap();
        let TensorData::Float(result) = result else {
            panic!("Invalid result type")
        };
        let result = result
            .into_dimensionality::<ndarray::Ix2>()
            .expect("Invalid result dimensionality");

        assert_eq!(result.shape(), &[1, 10]);
        // the model ends with a softmax
        let row_sum: f32 = result.row(0).sum();
        assert!((row_sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn run_with_image_input_predicts_the_biased_class() {
        let image_path = save_test_digit("digit-runtime-service-single.png");

        let service = Service::new(digit_model(), Config { num_threads: 1 });
        let result = service
            .prepare_and_run(vec![image_path], vec![(String::from("N"), 1_usize)])
            .expect("Could not infer the model");

        assert_eq!(result.predicted_digits(), vec![3]);

        // softmax over [0, 0, 0, 2, 0, ...]: e^2 / (e^2 + 9)
        let top = &result.get_top_k_predictions(1)[0][0];
        assert_eq!(top.class, "3");
        assert!((top.probability - 0.450_8).abs() < 1e-3);
    }

    #[test]
    fn run_with_image_batch_predicts_every_element() {
        let batch_size = 2_usize;
        let image_path = save_test_digit("digit-runtime-service-batch.png");
        let batch = vec![image_path; batch_size];

        let service = Service::new(digit_model(), Config { num_threads: 2 });
        let result = service
            .prepare_and_run(batch, vec![(String::from("N"), batch_size)])
            .expect("Could not infer the model");

        assert_eq!(result.predicted_digits(), vec![3, 3]);
        assert_eq!(
            result.get_top_k_class_names(1),
            vec![vec![String::from("3")], vec![String::from("3")]]
        );
    }

    #[test]
    fn mismatched_batch_parameter_is_rejected() {
        let service = Service::new(digit_model(), Config { num_threads: 1 });
        let input = Array4::<f32>::ones((1, 1, 28, 28)).into_dyn();
        let input_parameters = vec![(String::from("N"), 2_usize)];

        let err = service.run(input, input_parameters).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::CouldNotExecuteOperation(OperationError::UnexpectedInputShape { .. })
        ));
    }

    #[test]
    fn missing_batch_parameter_is_rejected() {
        let service = Service::new(digit_model(), Config { num_threads: 1 });
        let input = Array4::<f32>::ones((1, 1, 28, 28)).into_dyn();

        let err = service.run(input, vec![]).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::CouldNotExecuteOperation(OperationError::MissingParamDimension(_))
        ));
    }

    #[test]
    fn builder_reports_missing_model_file() {
        let result = ServiceBuilder::new(PathBuf::from("no/such/model.onnx")).build();
        assert!(matches!(result, Err(ServiceError::CouldNotReadModel(_))));
    }

    #[test]
    fn builder_loads_an_encoded_model_from_disk() {
        let model_path = std::env::temp_dir().join("digit-runtime-service-model.onnx");
        let mut buffer = Vec::new();
        digit_model()
            .encode(&mut buffer)
            .expect("Could not encode the model");
        File::create(&model_path)
            .and_then(|mut f| f.write_all(&buffer))
            .expect("Could not write the model file");

        let image_path = save_test_digit("digit-runtime-service-from-disk.png");

        let service = ServiceBuilder::new(model_path)
            .config(Config { num_threads: 1 })
            .build()
            .expect("Could not build service");
        let result = service
            .prepare_and_run(vec![image_path], vec![(String::from("N"), 1_usize)])
            .expect("Could not infer the model");

        assert_eq!(result.predicted_digits(), vec![3]);
    }
}
