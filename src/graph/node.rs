use crate::ops::OpFamily;
use crate::types::{DataType, Element, VarId};

/// One operation in the graph: an op family and number, the slots it reads
/// and writes, and the optional reduction axes / scalar / extra parameters
/// some families consume. The layer is assigned when the graph is built.
#[derive(Debug, Clone)]
pub struct Node<T: Element> {
    family: OpFamily,
    op_num: i32,
    id: VarId,
    inputs: Vec<VarId>,
    outputs: Vec<VarId>,
    axes: Vec<i32>,
    scalar: T,
    extra_params: Vec<T>,
    layer: Option<usize>,
    has_external_inputs: bool,
    has_external_outputs: bool,
    has_internal_inputs: bool,
    has_internal_outputs: bool,
    data_type: DataType,
}

impl<T: Element> Node<T> {
    pub fn new(family: OpFamily, op_num: i32, id: i32, inputs: &[i32], outputs: &[i32]) -> Self {
        let mut node = Self {
            family,
            op_num,
            id: VarId(id),
            inputs: Vec::with_capacity(inputs.len()),
            outputs: Vec::with_capacity(outputs.len()),
            axes: Vec::new(),
            scalar: T::zero(),
            extra_params: Vec::new(),
            layer: None,
            has_external_inputs: false,
            has_external_outputs: false,
            has_internal_inputs: false,
            has_internal_outputs: false,
            data_type: T::DATA_TYPE,
        };
        for &i in inputs {
            node.pick_input(VarId(i));
        }
        for &o in outputs {
            node.pick_output(VarId(o));
        }
        node
    }

    pub fn with_axes(mut self, axes: &[i32]) -> Self {
        self.axes = axes.to_vec();
        self
    }

    pub fn with_scalar(mut self, scalar: T) -> Self {
        self.scalar = scalar;
        self
    }

    pub fn with_extra_params(mut self, extra: Vec<T>) -> Self {
        self.extra_params = extra;
        self
    }

    /// Overrides the element-type tag, normally inferred from `T`. The wire
    /// importer stamps the tag the submission carried.
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Appends an input slot, recording whether it is external or internal.
    pub fn pick_input(&mut self, id: VarId) {
        self.inputs.push(id);
        if id.is_external() {
            self.has_external_inputs = true;
        } else {
            self.has_internal_inputs = true;
        }
    }

    /// Appends an output slot, recording whether it is external or internal.
    pub fn pick_output(&mut self, id: VarId) {
        self.outputs.push(id);
        if id.is_external() {
            self.has_external_outputs = true;
        } else {
            self.has_internal_outputs = true;
        }
    }

    pub fn family(&self) -> OpFamily {
        self.family
    }

    pub fn op_num(&self) -> i32 {
        self.op_num
    }

    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn inputs(&self) -> &[VarId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[VarId] {
        &self.outputs
    }

    pub fn axes(&self) -> &[i32] {
        &self.axes
    }

    pub fn scalar(&self) -> T {
        self.scalar
    }

    pub fn extra_params(&self) -> &[T] {
        &self.extra_params
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn layer(&self) -> Option<usize> {
        self.layer
    }

    pub(crate) fn set_layer(&mut self, layer: usize) {
        self.layer = Some(layer);
    }

    pub fn is_multi_input(&self) -> bool {
        self.inputs.len() > 1
    }

    pub fn is_multi_output(&self) -> bool {
        self.outputs.len() > 1
    }

    /// Number of internal consumers listed in the output set; the fan-out the
    /// executor's duplication rule is keyed on.
    pub fn output_degree(&self) -> usize {
        self.outputs.iter().filter(|o| o.is_internal()).count()
    }

    pub fn has_external_inputs(&self) -> bool {
        self.has_external_inputs
    }

    pub fn has_external_outputs(&self) -> bool {
        self.has_external_outputs
    }

    pub fn has_internal_inputs(&self) -> bool {
        self.has_internal_inputs
    }

    pub fn has_internal_outputs(&self) -> bool {
        self.has_internal_outputs
    }

    /// Two nodes are equal when they run the same operation over the same
    /// element type; slots and parameters are not part of the comparison.
    pub fn equals(&self, other: &Self) -> bool {
        self.family == other.family
            && self.op_num == other.op_num
            && self.data_type == other.data_type
    }
}
