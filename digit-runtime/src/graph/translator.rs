use crate::onnx_format::{AttributeProto, ModelProto, NodeProto, TensorProto, ValueInfoProto};
use crate::operators::*;

use crate::tensor::{Tensor, TensorData, TensorParametrizedShape};

use petgraph::graph::NodeIndex;
use petgraph::Graph;
use std::cell::RefCell;
use std::collections::HashMap;

use super::GraphError;

pub type RuntimeGraph = Graph<Operator, RefCell<Option<TensorData>>>;

/// This function creates an executable graph from a parsed ONNX model.
/// It returns a [`RuntimeGraph`] that can be used to execute the model with
/// the [`Service`](crate::service::Service).
/// It returns a [`GraphError`] if the conversion fails.
///
/// Nodes are wired by the names of the tensors they produce and consume;
/// constant inputs are resolved against the graph initializer list and
/// stored inside the operator instead of becoming edges.
pub fn create_graph(model_proto: ModelProto) -> Result<RuntimeGraph, GraphError> {
    let graph_proto = model_proto.graph.ok_or_else(|| {
        GraphError::ConversionError("Unable to retrieve graph from parsed model".to_string())
    })?;

    let graph_input = graph_proto.input;
    let graph_output = graph_proto.output;
    let initializers = graph_proto.initializer;
    let nodes = graph_proto.node;

    let (input_node_name, input_shape) = parse_model_io_node(&graph_input, &initializers)
        .ok_or(GraphError::InputNodeParsingError)?;
    let (output_node_name, output_shape) =
        parse_model_io_node(&graph_output, &[]).ok_or(GraphError::OutputNodeParsingError)?;

    let mut model_graph = RuntimeGraph::new();
    let input_node = model_graph.add_node(Operator::InputFeed(input_shape));
    let output_node = model_graph.add_node(Operator::OutputCollector(output_shape));

    // producer of every tensor name that flows along an edge
    let mut producers: HashMap<String, NodeIndex> = HashMap::new();
    producers.insert(input_node_name, input_node);

    let mut wiring: Vec<(NodeIndex, String, Vec<String>, Vec<String>)> = Vec::new();

    for (position, node) in nodes.into_iter().enumerate() {
        let op_type = node.op_type().to_string();
        if op_type.is_empty() {
            return Err(GraphError::ConversionError(
                "Unable to convert op_type".to_string(),
            ));
        }
        let node_name = if node.name().is_empty() {
            // some exporters leave node names empty
            format!("{}_{}", op_type, position)
        } else {
            node.name().to_string()
        };
        let mut inputs = node.input.clone();
        if inputs.is_empty() {
            return Err(GraphError::ConversionError(format!(
                "operator {} has no inputs",
                node_name
            )));
        }
        let parents_names: Vec<String>;

        let operator: Operator = match op_type.as_str() {
            "Conv" => {
                if let Some(group) = int_attribute(&node, "group") {
                    if group != 1 {
                        return Err(GraphError::UnsupportedConfiguration {
                            operator: node_name,
                            reason: String::from("grouped convolutions"),
                        });
                    }
                }
                if let Some(dilations) = ints_attribute(&node, "dilations") {
                    if dilations.iter().any(|&d| d != 1) {
                        return Err(GraphError::UnsupportedConfiguration {
                            operator: node_name,
                            reason: String::from("dilated convolutions"),
                        });
                    }
                }
                if let Some(auto_pad) = attribute(&node, "auto_pad").and_then(|a| a.s.as_deref()) {
                    if auto_pad != b"NOTSET".as_slice() {
                        return Err(GraphError::UnsupportedConfiguration {
                            operator: node_name,
                            reason: String::from("auto_pad"),
                        });
                    }
                }

                if inputs.len() < 2 {
                    return Err(GraphError::ConversionError(
                        "Conv requires a data operand and a weight initializer".to_string(),
                    ));
                }
                parents_names = vec![inputs.remove(0)];

                let weights = initializer_data(&initializers, &inputs[0], &node_name)?;
                let bias = inputs
                    .get(1)
                    .map(|name| initializer_data(&initializers, name, &node_name))
                    .transpose()?;

                let kernel_shape = match ints_attribute(&node, "kernel_shape") {
                    Some(values) => shape_pair(&values).ok_or_else(|| {
                        GraphError::ConversionError(
                            "Conv kernel_shape must have two entries".to_string(),
                        )
                    })?,
                    None => {
                        // per the ONNX spec the kernel shape may be inferred
                        // from the weight tensor
                        let weight_shape = weights.shape();
                        if weight_shape.len() != 4 {
                            return Err(GraphError::ConversionError(
                                "Conv weights must be a 4D tensor".to_string(),
                            ));
                        }
                        [weight_shape[2], weight_shape[3]]
                    }
                };
                let pads = match ints_attribute(&node, "pads") {
                    Some(values) => shape_quad(&values).ok_or_else(|| {
                        GraphError::ConversionError("Conv pads must have four entries".to_string())
                    })?,
                    None => [0, 0, 0, 0],
                };
                let strides = match ints_attribute(&node, "strides") {
                    Some(values) => shape_pair(&values).ok_or_else(|| {
                        GraphError::ConversionError(
                            "Conv strides must have two entries".to_string(),
                        )
                    })?,
                    None => [1, 1],
                };

                let inits = ConvInits::new(weights, bias);
                inits.validate().map_err(GraphError::InvalidInitializer)?;

                Operator::Convolution(inits, ConvAttributes::new(kernel_shape, pads, strides))
            }
            "Relu" => {
                parents_names = vec![inputs.remove(0)];

                Operator::ReLU
            }
            "MaxPool" => {
                let kernel_shape = ints_attribute(&node, "kernel_shape")
                    .ok_or_else(|| GraphError::MissingAttribute {
                        attribute: String::from("kernel_shape"),
                        operator: node_name.clone(),
                        operator_type: String::from("MaxPool"),
                    })
                    .and_then(|values| {
                        shape_pair(&values).ok_or_else(|| {
                            GraphError::ConversionError(
                                "MaxPool kernel_shape must have two entries".to_string(),
                            )
                        })
                    })?;
                let pads = match ints_attribute(&node, "pads") {
                    Some(values) => shape_quad(&values).ok_or_else(|| {
                        GraphError::ConversionError(
                            "MaxPool pads must have four entries".to_string(),
                        )
                    })?,
                    None => [0, 0, 0, 0],
                };
                let strides = match ints_attribute(&node, "strides") {
                    Some(values) => shape_pair(&values).ok_or_else(|| {
                        GraphError::ConversionError(
                            "MaxPool strides must have two entries".to_string(),
                        )
                    })?,
                    None => [1, 1],
                };

                parents_names = vec![inputs.remove(0)];

                Operator::MaxPool(MaxPoolAttributes::new(kernel_shape, pads, strides))
            }
            "Add" => {
                if inputs.len() != 2 {
                    return Err(GraphError::ConversionError(
                        "Add requires exactly two operands".to_string(),
                    ));
                }
                // a constant operand (e.g. a broadcast bias) is stored in
                // the operator, a dynamic one becomes a second edge
                match inputs
                    .iter()
                    .position(|name| is_initializer(&initializers, name))
                {
                    Some(constant) => {
                        let data = initializer_data(&initializers, &inputs[constant], &node_name)?;
                        let inits = AddInits::new(data);
                        inits.validate().map_err(GraphError::InvalidInitializer)?;
                        parents_names = vec![inputs.swap_remove(1 - constant)];
                        Operator::Add(Some(inits))
                    }
                    None => {
                        parents_names = inputs.clone();
                        Operator::Add(None)
                    }
                }
            }
            "Reshape" => {
                if inputs.len() != 2 {
                    return Err(GraphError::ConversionError(
                        "Reshape requires a data operand and a shape initializer".to_string(),
                    ));
                }
                parents_names = vec![inputs.remove(0)];

                let shape = initializer_data(&initializers, &inputs[0], &node_name)?;
                let inits = ReshapeInits::new(shape);
                inits.validate().map_err(GraphError::InvalidInitializer)?;

                Operator::Reshape(inits)
            }
            "Flatten" => {
                let axis = int_attribute(&node, "axis").unwrap_or(1);
                if axis < 0 {
                    return Err(GraphError::UnsupportedConfiguration {
                        operator: node_name,
                        reason: String::from("negative Flatten axis"),
                    });
                }

                parents_names = vec![inputs.remove(0)];

                Operator::Flatten(FlattenAttributes::new(axis as usize))
            }
            "MatMul" => {
                if inputs.len() != 2 || !is_initializer(&initializers, &inputs[1]) {
                    return Err(GraphError::UnsupportedConfiguration {
                        operator: node_name,
                        reason: String::from("MatMul without a constant right operand"),
                    });
                }
                parents_names = vec![inputs.remove(0)];

                let b = initializer_data(&initializers, &inputs[0], &node_name)?;
                let inits = MatMulInits::new(b);
                inits.validate().map_err(GraphError::InvalidInitializer)?;

                Operator::MatMul(inits)
            }
            "Gemm" => {
                let alpha = float_attribute(&node, "alpha").unwrap_or(1.0);
                let beta = float_attribute(&node, "beta").unwrap_or(1.0);
                let trans_a = int_attribute(&node, "transA").unwrap_or(0);
                let trans_b = int_attribute(&node, "transB").unwrap_or(0);
                let attrs = GemmAttributes::new(alpha, beta, trans_a, trans_b);

                if inputs.len() != 3 {
                    return Err(GraphError::UnsupportedConfiguration {
                        operator: node_name,
                        reason: String::from("Gemm without a bias operand"),
                    });
                }
                parents_names = vec![inputs.remove(0)];

                let b = initializer_data(&initializers, &inputs[0], &node_name)?;
                let c = initializer_data(&initializers, &inputs[1], &node_name)?;
                let inits = GemmInits::new(b, c);
                inits.validate().map_err(GraphError::InvalidInitializer)?;

                Operator::Gemm(inits, attrs)
            }
            "Softmax" => {
                let axis = int_attribute(&node, "axis").unwrap_or(-1);

                parents_names = vec![inputs.remove(0)];

                Operator::Softmax(SoftmaxAttributes::new(axis))
            }
            op => return Err(GraphError::UnsupportedOperator(String::from(op))),
        };

        let n: NodeIndex = model_graph.add_node(operator);
        for output in &node.output {
            producers.insert(output.clone(), n);
        }
        wiring.push((n, node_name, parents_names, node.output));
    }

    for (node_index, node_name, parents, outputs) in &wiring {
        for p_name in parents {
            let parent_index = producers.get(p_name).ok_or(GraphError::ParentNotFound {
                child_name: (*node_name).clone(),
            })?;
            model_graph.add_edge(*parent_index, *node_index, RefCell::new(None));
        }

        // Add an edge to the model output node if this node generates the output
        if outputs.iter().any(|o| o.as_str() == output_node_name) {
            model_graph.add_edge(*node_index, output_node, RefCell::new(None));
        }
    }

    Ok(model_graph)
}

/// Picks the value info describing the actual graph input/output: the first
/// parameterized one, or the first one that is not an initializer (older
/// exporters list the weights among the graph inputs).
fn parse_model_io_node(
    io_value_infos: &[ValueInfoProto],
    initializers: &[TensorProto],
) -> Option<(String, TensorParametrizedShape)> {
    let candidates = io_value_infos
        .iter()
        .filter(|value_info| !is_initializer(initializers, value_info.name()))
        .collect::<Vec<_>>();

    candidates
        .iter()
        .find_map(|value_info| {
            let tensor = Tensor::try_from((*value_info).clone()).ok()?;
            if !tensor.is_parametrized_io() {
                return None;
            }
            if let Tensor::InOut(shape, _) = tensor {
                return Some((value_info.name().to_string(), shape));
            }
            None
        })
        .or_else(|| {
            let value_info = candidates.first()?;
            let tensor = Tensor::try_from((*value_info).clone()).ok()?;
            if let Tensor::InOut(shape, _) = tensor {
                return Some((value_info.name().to_string(), shape));
            }
            None
        })
}

fn is_initializer(initializers: &[TensorProto], name: &str) -> bool {
    initializers.iter().any(|tp| tp.name() == name)
}

fn initializer_data(
    initializers: &[TensorProto],
    name: &str,
    operator: &str,
) -> Result<TensorData, GraphError> {
    let proto = initializers
        .iter()
        .find(|tp| tp.name() == name)
        .ok_or_else(|| GraphError::MissingInitializer {
            initializer: name.to_string(),
            operator: operator.to_string(),
        })?;

    match Tensor::try_from(proto.clone()) {
        Ok(Tensor::Constant(data)) => Ok(data),
        Ok(_) => Err(GraphError::InvalidInitializer(format!(
            "initializer {} is not a constant",
            name
        ))),
        Err(e) => Err(GraphError::InvalidInitializer(e.to_string())),
    }
}

fn attribute<'a>(node: &'a NodeProto, name: &str) -> Option<&'a AttributeProto> {
    node.attribute.iter().find(|a| a.name() == name)
}

fn ints_attribute(node: &NodeProto, name: &str) -> Option<Vec<i64>> {
    attribute(node, name).map(|a| a.ints.clone())
}

fn int_attribute(node: &NodeProto, name: &str) -> Option<i64> {
    attribute(node, name).and_then(|a| a.i)
}

fn float_attribute(node: &NodeProto, name: &str) -> Option<f32> {
    attribute(node, name).and_then(|a| a.f)
}

fn shape_pair(values: &[i64]) -> Option<[usize; 2]> {
    match values {
        [a, b] => Some([*a as usize, *b as usize]),
        _ => None,
    }
}

fn shape_quad(values: &[i64]) -> Option<[usize; 4]> {
    match values {
        [a, b, c, d] => Some([*a as usize, *b as usize, *c as usize, *d as usize]),
        _ => None,
    }
}
