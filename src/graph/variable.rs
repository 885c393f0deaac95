use crate::array::NdArray;
use crate::errors::{FxError, FxResult};
use crate::types::{Element, VarId};
use dashmap::DashMap;
use std::sync::Arc;

/// A named slot holding an array, or nothing yet. Arrays live behind `Arc`:
/// once a producer publishes one it is never written again, so readers share
/// it without locking.
#[derive(Debug, Clone)]
pub struct Variable<T: Element> {
    id: VarId,
    name: Option<String>,
    array: Option<Arc<NdArray<T>>>,
}

impl<T: Element> Variable<T> {
    pub fn empty(id: VarId) -> Self {
        Self {
            id,
            name: None,
            array: None,
        }
    }

    pub fn with_array(id: VarId, array: NdArray<T>) -> Self {
        Self {
            id,
            name: None,
            array: Some(Arc::new(array)),
        }
    }

    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_none()
    }

    pub fn array(&self) -> Option<&Arc<NdArray<T>>> {
        self.array.as_ref()
    }

    pub fn set_array(&mut self, array: Arc<NdArray<T>>) {
        self.array = Some(array);
    }
}

/// The typed slot table every graph run reads and writes. Lookups by id, by
/// name, and by (id, index) pair resolve to the same set of variables. The
/// map is sharded, so nodes of one layer may insert at distinct ids
/// concurrently.
#[derive(Debug, Default)]
pub struct VariableSpace<T: Element> {
    slots: DashMap<VarId, Variable<T>>,
    names: DashMap<String, VarId>,
    paired: DashMap<(VarId, i32), Variable<T>>,
}

impl<T: Element> VariableSpace<T> {
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
            names: DashMap::new(),
            paired: DashMap::new(),
        }
    }

    /// Inserts or replaces the canonical variable for an id.
    pub fn put_variable(&self, id: VarId, variable: Variable<T>) {
        if let Some(name) = variable.name() {
            self.names.insert(name.to_string(), id);
        }
        self.slots.insert(id, variable);
    }

    /// Publishes an array under an id, keeping any name already registered.
    pub fn put_array(&self, id: VarId, array: NdArray<T>) {
        self.put_shared(id, Arc::new(array));
    }

    pub fn put_shared(&self, id: VarId, array: Arc<NdArray<T>>) {
        self.slots
            .entry(id)
            .or_insert_with(|| Variable::empty(id))
            .set_array(array);
    }

    /// The variable under an id; a miss creates an empty placeholder so
    /// downstream code can fill it.
    pub fn get(&self, id: VarId) -> Variable<T> {
        self.slots
            .entry(id)
            .or_insert_with(|| Variable::empty(id))
            .clone()
    }

    /// The variable under an (id, index) pair; index 0 is the canonical slot.
    pub fn get_paired(&self, id: VarId, index: i32) -> Variable<T> {
        if index == 0 {
            return self.get(id);
        }
        self.paired
            .entry((id, index))
            .or_insert_with(|| Variable::empty(id))
            .clone()
    }

    pub fn put_paired(&self, id: VarId, index: i32, variable: Variable<T>) {
        if index == 0 {
            self.put_variable(id, variable);
        } else {
            self.paired.insert((id, index), variable);
        }
    }

    /// The array under an id; empty or missing slots are a lookup failure.
    pub fn array(&self, id: VarId) -> FxResult<Arc<NdArray<T>>> {
        self.slots
            .get(&id)
            .and_then(|v| v.array().cloned())
            .ok_or(FxError::UnknownId(id.0))
    }

    pub fn by_name(&self, name: &str) -> FxResult<Variable<T>> {
        let id = self
            .names
            .get(name)
            .map(|e| *e.value())
            .ok_or_else(|| FxError::UnknownName(name.to_string()))?;
        Ok(self.get(id))
    }

    pub fn has(&self, id: VarId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Mirrors a produced array into an external slot: an empty slot takes a
    /// deep copy preserving the source order, a filled one is assigned into.
    pub fn mirror(&self, id: VarId, source: &Arc<NdArray<T>>) -> FxResult<()> {
        let mut entry = self.slots.entry(id).or_insert_with(|| Variable::empty(id));
        match entry.array.as_mut() {
            None => entry.set_array(Arc::new(source.dup(source.order()))),
            Some(existing) => {
                if !Arc::ptr_eq(existing, source) {
                    Arc::make_mut(existing).assign(source)?;
                }
            }
        }
        Ok(())
    }

    /// Snapshot of the registered ids.
    pub fn ids(&self) -> Vec<VarId> {
        self.slots.iter().map(|e| *e.key()).collect()
    }
}
