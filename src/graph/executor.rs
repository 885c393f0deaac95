use super::{Graph, Node};
use crate::array::NdArray;
use crate::config::{CancelToken, ExecutionMode};
use crate::errors::{FxError, FxResult};
use crate::ops::{
    broadcast, index_reduce, normalized_axes, pairwise, reduce, reduce3, scalar, summary_stats,
    transform, BroadcastOp, IndexReduceOp, OpFamily, PairwiseOp, Reduce3Op, ReduceOp, ScalarOp,
    SummaryStatsOp, TransformOp,
};
use crate::types::Element;
use std::sync::Arc;
use tracing::{debug, trace};

/// Walks the onion layer by layer and dispatches every node to its family
/// kernel. Layers form barriers: all writes of layer k are visible before any
/// node of layer k+1 starts. Within a layer nodes are independent by
/// construction and may run in parallel.
///
/// Every kernel writes into a freshly owned array and the result is published
/// behind an `Arc`, so a producer's value survives any number of downstream
/// consumers; consumers only ever borrow shared views.
pub struct GraphExecutor;

impl GraphExecutor {
    pub fn execute<T: Element>(graph: &mut Graph<T>) -> FxResult<()> {
        Self::execute_with(graph, &CancelToken::new())
    }

    /// Executes with a cancellation token, polled at layer boundaries only:
    /// the current layer always runs to completion.
    #[tracing::instrument(skip_all, fields(graph_id = graph.id()))]
    pub fn execute_with<T: Element>(graph: &mut Graph<T>, cancel: &CancelToken) -> FxResult<()> {
        graph.build()?;

        #[cfg(feature = "rayon")]
        let pool = match graph.config().workers {
            Some(workers) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .build()
                    .map_err(|e| FxError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?,
            ),
            None => None,
        };
        let parallel = graph.config().mode == ExecutionMode::Auto;

        for (depth, members) in graph.onion().iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(FxError::Cancelled);
            }
            trace!(layer = depth, nodes = members.len(), "running layer");

            #[cfg(feature = "rayon")]
            let results: Vec<FxResult<()>> = if parallel && members.len() > 1 {
                use rayon::prelude::*;
                let scatter = || {
                    members
                        .par_iter()
                        .map(|&i| Self::run_node(graph, &graph.nodes()[i]))
                        .collect::<Vec<_>>()
                };
                match &pool {
                    Some(pool) => pool.install(scatter),
                    None => scatter(),
                }
            } else {
                members
                    .iter()
                    .map(|&i| Self::run_node(graph, &graph.nodes()[i]))
                    .collect()
            };

            #[cfg(not(feature = "rayon"))]
            let results: Vec<FxResult<()>> = {
                let _ = parallel;
                members
                    .iter()
                    .map(|&i| Self::run_node(graph, &graph.nodes()[i]))
                    .collect()
            };

            // a failed node aborts the run, but only after its whole layer
            // has finished
            if let Some(err) = results.into_iter().find_map(Result::err) {
                return Err(err);
            }
        }

        Ok(())
    }

    fn run_node<T: Element>(graph: &Graph<T>, node: &Node<T>) -> FxResult<()> {
        if graph.config().verbose {
            debug!(node = node.id().0, family = ?node.family(), op = node.op_num(), "executing node");
        } else {
            trace!(node = node.id().0, family = ?node.family(), op = node.op_num(), "executing node");
        }

        let produced = Self::dispatch(graph, node)?;
        Self::publish(graph, node, produced)
    }

    /// Maps the node onto its family kernel and returns the produced array.
    fn dispatch<T: Element>(graph: &Graph<T>, node: &Node<T>) -> FxResult<NdArray<T>> {
        let unknown = || FxError::UnknownOp {
            family: node.family(),
            op_num: node.op_num(),
        };

        match node.family() {
            OpFamily::Transform => {
                let op = TransformOp::from_num(node.op_num()).ok_or_else(unknown)?;
                let x = Self::input_array(graph, node, 0)?;
                transform::exec(op, &x, node.extra_params())
            }
            OpFamily::Pairwise => {
                let op = PairwiseOp::from_num(node.op_num()).ok_or_else(unknown)?;
                let x = Self::input_array(graph, node, 0)?;
                let y = Self::input_array(graph, node, 1)?;
                pairwise::exec(op, &x, &y, node.extra_params())
            }
            OpFamily::Scalar => {
                let op = ScalarOp::from_num(node.op_num()).ok_or_else(unknown)?;
                let x = Self::input_array(graph, node, 0)?;
                scalar::exec(op, &x, node.scalar(), node.extra_params())
            }
            OpFamily::Broadcast => {
                let op = BroadcastOp::from_num(node.op_num()).ok_or_else(unknown)?;
                let x = Self::input_array(graph, node, 0)?;
                let y = Self::input_array(graph, node, 1)?;
                let axes = normalized_axes(node.axes(), x.rank())?
                    .ok_or_else(|| FxError::InvalidShape(x.shape().to_vec()))?;
                broadcast::exec(op, &x, &y, &axes)
            }
            // a two-input accumulation is a paired reduction
            OpFamily::Accumulation if node.inputs().len() > 1 => Self::dispatch_reduce3(graph, node),
            OpFamily::Accumulation => {
                let op = ReduceOp::from_num(node.op_num()).ok_or_else(unknown)?;
                let x = Self::input_array(graph, node, 0)?;
                match normalized_axes(node.axes(), x.rank())? {
                    None => {
                        let value = reduce::exec_scalar(op, &x, node.extra_params())?;
                        Ok(NdArray::scalar(value))
                    }
                    Some(axes) => reduce::exec(op, &x, &axes, node.extra_params()),
                }
            }
            OpFamily::IndexAccumulation => {
                let op = IndexReduceOp::from_num(node.op_num()).ok_or_else(unknown)?;
                let x = Self::input_array(graph, node, 0)?;
                match normalized_axes(node.axes(), x.rank())? {
                    None => {
                        let winner = index_reduce::exec_scalar(op, &x, node.extra_params())?;
                        Ok(NdArray::scalar(
                            T::from_usize(winner).unwrap_or_else(T::zero),
                        ))
                    }
                    Some(axes) => index_reduce::exec(op, &x, &axes, node.extra_params()),
                }
            }
            OpFamily::SummaryStats => {
                let op = SummaryStatsOp::from_num(node.op_num()).ok_or_else(unknown)?;
                let bias_corrected = node.scalar() != T::zero();
                let x = Self::input_array(graph, node, 0)?;
                match normalized_axes(node.axes(), x.rank())? {
                    None => {
                        let value =
                            summary_stats::exec_scalar(op, bias_corrected, &x, node.extra_params())?;
                        Ok(NdArray::scalar(value))
                    }
                    Some(axes) => {
                        summary_stats::exec(op, bias_corrected, &x, &axes, node.extra_params())
                    }
                }
            }
            OpFamily::Reduce3 => Self::dispatch_reduce3(graph, node),
        }
    }

    fn dispatch_reduce3<T: Element>(graph: &Graph<T>, node: &Node<T>) -> FxResult<NdArray<T>> {
        let op = Reduce3Op::from_num(node.op_num()).ok_or(FxError::UnknownOp {
            family: node.family(),
            op_num: node.op_num(),
        })?;
        let x = Self::input_array(graph, node, 0)?;
        let y = Self::input_array(graph, node, 1)?;
        match normalized_axes(node.axes(), x.rank())? {
            None => {
                let value = reduce3::exec_scalar(op, &x, &y, node.extra_params())?;
                Ok(NdArray::scalar(value))
            }
            Some(axes) => reduce3::exec(op, &x, &y, &axes, node.extra_params()),
        }
    }

    /// Shared view of the node's input at `position`. Missing inputs and
    /// empty slots are lookup failures.
    fn input_array<T: Element>(
        graph: &Graph<T>,
        node: &Node<T>,
        position: usize,
    ) -> FxResult<Arc<NdArray<T>>> {
        let id = *node
            .inputs()
            .get(position)
            .ok_or(FxError::UnknownId(node.id().0))?;
        graph.variable_space().array(id)
    }

    /// Publishes the produced array under the node's id, then mirrors it into
    /// every external slot the node lists. Only negative output ids are
    /// mirrored; positive entries name downstream consumers.
    fn publish<T: Element>(graph: &Graph<T>, node: &Node<T>, produced: NdArray<T>) -> FxResult<()> {
        let space = graph.variable_space();
        let shared = Arc::new(produced);
        space.put_shared(node.id(), shared.clone());

        for &out in node.outputs() {
            if out.is_external() {
                space.mirror(out, &shared)?;
            }
        }
        Ok(())
    }
}
