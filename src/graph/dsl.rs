use super::{Graph, Node, Variable};
use crate::array::NdArray;
use crate::errors::FxResult;
use crate::ops::{
    BroadcastOp, IndexReduceOp, OpFamily, PairwiseOp, Reduce3Op, ReduceOp, ScalarOp,
    SummaryStatsOp, TransformOp,
};
use crate::types::{Element, VarId};

/// Thin convenience layer for wiring graphs by hand; tests and demos use it,
/// the wire importer does not.
pub struct GraphBuilder<'a, T: Element> {
    graph: &'a mut Graph<T>,
}

impl<'a, T: Element> GraphBuilder<'a, T> {
    pub fn new(graph: &'a mut Graph<T>) -> Self {
        Self { graph }
    }

    /// Seeds an external slot with a caller-owned array.
    pub fn seed(&mut self, id: i32, array: NdArray<T>) -> &mut Self {
        self.graph
            .variable_space()
            .put_variable(VarId(id), Variable::with_array(VarId(id), array));
        self
    }

    /// Declares an empty external slot for a result the caller wants back.
    pub fn slot(&mut self, id: i32) -> &mut Self {
        self.graph
            .variable_space()
            .put_variable(VarId(id), Variable::empty(VarId(id)));
        self
    }

    pub fn transform(
        &mut self,
        id: i32,
        op: TransformOp,
        inputs: &[i32],
        outputs: &[i32],
    ) -> FxResult<&mut Self> {
        self.graph
            .add_node(Node::new(OpFamily::Transform, op.as_num(), id, inputs, outputs))?;
        Ok(self)
    }

    pub fn pairwise(
        &mut self,
        id: i32,
        op: PairwiseOp,
        inputs: &[i32],
        outputs: &[i32],
    ) -> FxResult<&mut Self> {
        self.graph
            .add_node(Node::new(OpFamily::Pairwise, op.as_num(), id, inputs, outputs))?;
        Ok(self)
    }

    pub fn scalar(
        &mut self,
        id: i32,
        op: ScalarOp,
        value: T,
        inputs: &[i32],
        outputs: &[i32],
    ) -> FxResult<&mut Self> {
        self.graph.add_node(
            Node::new(OpFamily::Scalar, op.as_num(), id, inputs, outputs).with_scalar(value),
        )?;
        Ok(self)
    }

    pub fn reduce(
        &mut self,
        id: i32,
        op: ReduceOp,
        axes: &[i32],
        inputs: &[i32],
        outputs: &[i32],
    ) -> FxResult<&mut Self> {
        self.graph.add_node(
            Node::new(OpFamily::Accumulation, op.as_num(), id, inputs, outputs).with_axes(axes),
        )?;
        Ok(self)
    }

    pub fn index_reduce(
        &mut self,
        id: i32,
        op: IndexReduceOp,
        axes: &[i32],
        inputs: &[i32],
        outputs: &[i32],
    ) -> FxResult<&mut Self> {
        self.graph.add_node(
            Node::new(OpFamily::IndexAccumulation, op.as_num(), id, inputs, outputs)
                .with_axes(axes),
        )?;
        Ok(self)
    }

    pub fn summary_stats(
        &mut self,
        id: i32,
        op: SummaryStatsOp,
        bias_corrected: bool,
        axes: &[i32],
        inputs: &[i32],
        outputs: &[i32],
    ) -> FxResult<&mut Self> {
        let flag = if bias_corrected { T::one() } else { T::zero() };
        self.graph.add_node(
            Node::new(OpFamily::SummaryStats, op.as_num(), id, inputs, outputs)
                .with_axes(axes)
                .with_scalar(flag),
        )?;
        Ok(self)
    }

    pub fn reduce3(
        &mut self,
        id: i32,
        op: Reduce3Op,
        axes: &[i32],
        inputs: &[i32],
        outputs: &[i32],
    ) -> FxResult<&mut Self> {
        self.graph.add_node(
            Node::new(OpFamily::Reduce3, op.as_num(), id, inputs, outputs).with_axes(axes),
        )?;
        Ok(self)
    }

    pub fn broadcast(
        &mut self,
        id: i32,
        op: BroadcastOp,
        axes: &[i32],
        inputs: &[i32],
        outputs: &[i32],
    ) -> FxResult<&mut Self> {
        self.graph.add_node(
            Node::new(OpFamily::Broadcast, op.as_num(), id, inputs, outputs).with_axes(axes),
        )?;
        Ok(self)
    }
}
