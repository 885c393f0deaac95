pub mod dsl;
pub mod executor;
pub mod node;
pub mod result;
pub mod variable;

pub use executor::GraphExecutor;
pub use node::Node;
pub use result::ExecutionResult;
pub use variable::{Variable, VariableSpace};

use crate::config::ExecutorConfig;
use crate::errors::{FxError, FxResult};
use crate::types::{Element, VarId};
use std::collections::HashMap;

/// The computation graph: its nodes, the variable space they read and write,
/// and, once built, the onion: the partition of nodes into dependency layers.
/// Layer 0 holds the nodes fed only by external slots; every other node sits
/// one layer above its deepest internal producer.
#[derive(Debug)]
pub struct Graph<T: Element> {
    id: i64,
    nodes: Vec<Node<T>>,
    index: HashMap<VarId, usize>,
    onion: Vec<Vec<usize>>,
    variables: VariableSpace<T>,
    config: ExecutorConfig,
    built: bool,
}

impl<T: Element> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Graph<T> {
    pub fn new() -> Self {
        Self {
            id: 0,
            nodes: Vec::new(),
            index: HashMap::new(),
            onion: Vec::new(),
            variables: VariableSpace::new(),
            config: ExecutorConfig::default(),
            built: false,
        }
    }

    pub fn with_config(config: ExecutorConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn variable_space(&self) -> &VariableSpace<T> {
        &self.variables
    }

    /// Declares a node. Ids must be positive and unique; inputs may reference
    /// external slots or any node declared before this one.
    pub fn add_node(&mut self, node: Node<T>) -> FxResult<()> {
        let id = node.id();
        if !id.is_internal() {
            return Err(FxError::UnknownId(id.0));
        }
        if self.index.contains_key(&id) {
            return Err(FxError::DuplicateId(id.0));
        }
        self.index.insert(id, self.nodes.len());
        self.nodes.push(node);
        self.built = false;
        Ok(())
    }

    pub fn nodes(&self) -> &[Node<T>] {
        &self.nodes
    }

    pub fn node(&self, id: VarId) -> Option<&Node<T>> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn total_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes on layer 0. Meaningful after `build`.
    pub fn root_nodes(&self) -> usize {
        self.onion.first().map_or(0, Vec::len)
    }

    /// The layer partition. Meaningful after `build`.
    pub fn onion(&self) -> &[Vec<usize>] {
        &self.onion
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Fan-out of a producer: how many internal consumers its output set
    /// lists. External slots have no producer and report zero.
    pub fn fan_out(&self, id: VarId) -> usize {
        self.node(id).map_or(0, Node::output_degree)
    }

    /// Assigns every node to its onion layer and prepares the variable space
    /// for execution. Nodes whose output list is empty are given an implicit
    /// external output under the negated node id; external output slots not
    /// seeded by the caller are pre-allocated empty so the mirroring pass has
    /// somewhere to write.
    pub fn build(&mut self) -> FxResult<()> {
        if self.built {
            return Ok(());
        }
        self.onion.clear();

        for i in 0..self.nodes.len() {
            let mut layer = 0usize;
            for k in 0..self.nodes[i].inputs().len() {
                let input = self.nodes[i].inputs()[k];
                if input.is_external() {
                    // make sure the slot exists, seeded or not
                    self.variables.get(input);
                    continue;
                }
                match self.index.get(&input) {
                    None => {
                        return Err(FxError::DanglingEdge {
                            node: self.nodes[i].id().0,
                            input: input.0,
                        })
                    }
                    Some(&j) if j >= i => {
                        return Err(FxError::NotDag {
                            node: self.nodes[i].id().0,
                            input: input.0,
                        })
                    }
                    Some(&j) => {
                        let producer_layer = self.nodes[j].layer().unwrap_or(0);
                        layer = layer.max(producer_layer + 1);
                    }
                }
            }
            self.nodes[i].set_layer(layer);
            if self.onion.len() <= layer {
                self.onion.resize(layer + 1, Vec::new());
            }
            self.onion[layer].push(i);
        }

        for node in &mut self.nodes {
            if node.outputs().is_empty() {
                node.pick_output(VarId(-node.id().0));
            }
        }

        // every external output slot has exactly one producer; without this,
        // two nodes of one layer could race their mirrors into the same slot
        let mut mirrored: HashMap<VarId, VarId> = HashMap::new();
        for node in &self.nodes {
            for &out in node.outputs() {
                if out.is_external() && mirrored.insert(out, node.id()).is_some() {
                    return Err(FxError::DuplicateId(out.0));
                }
            }
        }

        for node in &self.nodes {
            for &out in node.outputs() {
                if out.is_external() && !self.variables.has(out) {
                    self.variables.put_variable(out, Variable::empty(out));
                }
            }
        }

        self.built = true;
        Ok(())
    }

    /// The externally observable results: every variable some node mirrors
    /// into a negative slot, in node declaration order.
    pub fn fetch_outputs(&self) -> Vec<Variable<T>> {
        let mut seen = std::collections::HashSet::new();
        let mut outputs = Vec::new();
        for node in &self.nodes {
            for &out in node.outputs() {
                if out.is_external() && seen.insert(out) {
                    outputs.push(self.variables.get(out));
                }
            }
        }
        outputs
    }
}
