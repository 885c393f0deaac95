use super::{Graph, Variable};
use crate::errors::{FxError, FxResult};
use crate::types::{Element, VarId};
use std::collections::HashMap;

/// The ordered set of variables a finished run hands back, with lookups by
/// position, by id, by (id, index) pair and by name layered over the same
/// entries.
#[derive(Debug, Default)]
pub struct ExecutionResult<T: Element> {
    variables: Vec<Variable<T>>,
    by_name: HashMap<String, usize>,
    by_pair: HashMap<(VarId, i32), usize>,
}

impl<T: Element> ExecutionResult<T> {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            by_name: HashMap::new(),
            by_pair: HashMap::new(),
        }
    }

    /// Collects the externally observable outputs of a graph, in node
    /// declaration order.
    pub fn from_graph(graph: &Graph<T>) -> Self {
        let mut result = Self::new();
        for variable in graph.fetch_outputs() {
            result.push(variable);
        }
        result
    }

    pub fn push(&mut self, variable: Variable<T>) {
        let position = self.variables.len();
        if let Some(name) = variable.name() {
            self.by_name.insert(name.to_string(), position);
        }
        self.by_pair.insert((variable.id(), 0), position);
        self.variables.push(variable);
    }

    /// Variable by its position in the output order.
    pub fn at(&self, position: usize) -> FxResult<&Variable<T>> {
        self.variables
            .get(position)
            .ok_or(FxError::UnknownId(position as i32))
    }

    pub fn by_id(&self, id: VarId) -> FxResult<&Variable<T>> {
        self.by_pair(id, 0)
    }

    pub fn by_pair(&self, id: VarId, index: i32) -> FxResult<&Variable<T>> {
        self.by_pair
            .get(&(id, index))
            .map(|&i| &self.variables[i])
            .ok_or(FxError::UnknownId(id.0))
    }

    pub fn by_name(&self, name: &str) -> FxResult<&Variable<T>> {
        self.by_name
            .get(name)
            .map(|&i| &self.variables[i])
            .ok_or_else(|| FxError::UnknownName(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable<T>> {
        self.variables.iter()
    }
}
