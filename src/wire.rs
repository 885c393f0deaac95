//! Import/export of graphs and results as serialized bundles.
//!
//! Wire buffers are 32-bit float; the per-node data-type tag selects the
//! element type the graph is instantiated and executed with (`f32` or `f64`),
//! with values widened on import and narrowed back on export.

use crate::array::NdArray;
use crate::config::ExecutorConfig;
use crate::errors::FxResult;
use crate::graph::{ExecutionResult, Graph, GraphExecutor, Node, Variable};
use crate::ops::OpFamily;
use crate::types::{DataType, Element, Order, VarId};
use serde::{Deserialize, Serialize};

/// Device id stamped on host-resident result buffers.
pub const HOST_DEVICE: i32 = -1;

/// A seeded input or returned output: id, optional name, shape and the flat
/// row-major buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireVariable {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
    #[serde(default = "host_device")]
    pub device: i32,
}

fn host_device() -> i32 {
    HOST_DEVICE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireNode {
    pub id: i32,
    pub family: OpFamily,
    pub op_num: i32,
    #[serde(default)]
    pub inputs: Vec<i32>,
    #[serde(default)]
    pub outputs: Vec<i32>,
    #[serde(default)]
    pub axes: Vec<i32>,
    #[serde(default)]
    pub scalar: f32,
    #[serde(default)]
    pub extra_params: Vec<f32>,
    #[serde(default = "float_tag")]
    pub data_type: DataType,
}

fn float_tag() -> DataType {
    DataType::Float
}

/// The submission bundle: a graph id, the nodes, and the seeded variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireGraph {
    pub id: i64,
    #[serde(default)]
    pub config: ExecutorConfig,
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub variables: Vec<WireVariable>,
}

impl WireGraph {
    /// The element type this bundle asks to run under: the tag of its first
    /// node (nodes of one graph share a type). Variable-only bundles default
    /// to float.
    pub fn data_type(&self) -> DataType {
        self.nodes
            .first()
            .map(|n| n.data_type)
            .unwrap_or(DataType::Float)
    }
}

/// The result bundle mirrored back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireResult {
    pub id: i64,
    pub variables: Vec<WireVariable>,
}

fn build_graph<T: Element>(flat: WireGraph) -> FxResult<Graph<T>> {
    let mut graph = Graph::with_config(flat.config);
    graph.set_id(flat.id);

    for seed in flat.variables {
        let values = seed.values.into_iter().map(<T as Element>::from_f32).collect();
        let array = NdArray::from_vec(&seed.shape, Order::RowMajor, values)?;
        let mut variable = Variable::with_array(VarId(seed.id), array);
        if !seed.name.is_empty() {
            variable.set_name(seed.name);
        }
        graph.variable_space().put_variable(VarId(seed.id), variable);
    }

    for node in flat.nodes {
        let extra = node.extra_params.into_iter().map(<T as Element>::from_f32).collect();
        graph.add_node(
            Node::new(node.family, node.op_num, node.id, &node.inputs, &node.outputs)
                .with_axes(&node.axes)
                .with_scalar(<T as Element>::from_f32(node.scalar))
                .with_extra_params(extra)
                .with_data_type(node.data_type),
        )?;
    }

    Ok(graph)
}

/// Rebuilds a graph from a serialized submission bundle, seeding every listed
/// variable under its (negative) id and re-declaring every node with its
/// ids, slots, axes, scalar and extra parameters intact.
pub fn from_wire<T: Element>(bytes: &[u8]) -> FxResult<Graph<T>> {
    build_graph(serde_json::from_slice(bytes)?)
}

/// Serializes the graph's externally observable outputs as a result bundle.
pub fn to_wire<T: Element>(graph: &Graph<T>) -> FxResult<Vec<u8>> {
    let outputs = ExecutionResult::from_graph(graph);
    let mut variables = Vec::new();
    for variable in outputs.iter() {
        let (shape, values) = match variable.array() {
            Some(array) => (
                array.shape().to_vec(),
                array.to_flat_vec().into_iter().map(Element::to_f32).collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };
        variables.push(WireVariable {
            id: variable.id().0,
            name: variable.name().unwrap_or_default().to_string(),
            shape,
            values,
            device: HOST_DEVICE,
        });
    }
    let result = WireResult {
        id: graph.id(),
        variables,
    };
    Ok(serde_json::to_vec(&result)?)
}

fn run_bundle<T: Element>(flat: WireGraph) -> FxResult<Vec<u8>> {
    let mut graph = build_graph::<T>(flat)?;
    GraphExecutor::execute(&mut graph)?;
    to_wire(&graph)
}

/// The wire entry point: deserialize, execute under the element type the
/// bundle's data-type tag names, serialize the outputs.
pub fn run_wire(bytes: &[u8]) -> FxResult<Vec<u8>> {
    let flat: WireGraph = serde_json::from_slice(bytes)?;
    match flat.data_type() {
        DataType::Float => run_bundle::<f32>(flat),
        DataType::Double => run_bundle::<f64>(flat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::TransformOp;

    #[test]
    fn graph_bundle_round_trip() {
        let bundle = WireGraph {
            id: 7,
            config: ExecutorConfig::default(),
            nodes: vec![WireNode {
                id: 1,
                family: OpFamily::Transform,
                op_num: TransformOp::Abs.as_num(),
                inputs: vec![-1],
                outputs: vec![],
                axes: vec![],
                scalar: 0.0,
                extra_params: vec![],
                data_type: DataType::Float,
            }],
            variables: vec![WireVariable {
                id: -1,
                name: "input".into(),
                shape: vec![2, 2],
                values: vec![-1.0, -2.0, -3.0, -4.0],
                device: HOST_DEVICE,
            }],
        };
        assert_eq!(bundle.data_type(), DataType::Float);
        let bytes = serde_json::to_vec(&bundle).unwrap();

        let graph = from_wire::<f32>(&bytes).unwrap();
        assert_eq!(graph.id(), 7);
        assert_eq!(graph.total_nodes(), 1);
        let seeded = graph.variable_space().by_name("input").unwrap();
        assert_eq!(seeded.array().unwrap().shape(), &[2, 2]);
    }

    #[test]
    fn double_tag_builds_an_f64_graph() {
        let json = br#"{
            "id": 2,
            "nodes": [
                {"id": 1, "family": "Transform", "op_num": 0, "inputs": [-1],
                 "data_type": "Double"}
            ],
            "variables": [
                {"id": -1, "shape": [1, 2], "values": [-5.0, 5.0]}
            ]
        }"#;
        let flat: WireGraph = serde_json::from_slice(json).unwrap();
        assert_eq!(flat.data_type(), DataType::Double);

        let graph = from_wire::<f64>(json).unwrap();
        let seeded = graph.variable_space().array(VarId(-1)).unwrap();
        assert_eq!(seeded.to_flat_vec(), vec![-5.0f64, 5.0]);
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = br#"{
            "id": 1,
            "nodes": [
                {"id": 1, "family": "Transform", "op_num": 0, "inputs": [-1]}
            ],
            "variables": [
                {"id": -1, "shape": [1, 2], "values": [-5.0, 5.0]}
            ]
        }"#;
        let result = run_wire(json).unwrap();
        let parsed: WireResult = serde_json::from_slice(&result).unwrap();
        assert_eq!(parsed.id, 1);
        assert_eq!(parsed.variables.len(), 1);
        assert_eq!(parsed.variables[0].id, -1);
        assert_eq!(parsed.variables[0].device, HOST_DEVICE);
        assert_eq!(parsed.variables[0].values, vec![5.0, 5.0]);
    }
}
