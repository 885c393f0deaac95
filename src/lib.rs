pub mod array;
pub mod config;
pub mod errors;
pub mod graph;
pub mod ops;
pub mod shape;
pub mod types;
pub mod wire;

pub use array::NdArray;
pub use config::{CancelToken, ExecutionMode, ExecutorConfig};
pub use errors::{FxError, FxResult};
pub use graph::{
    dsl::GraphBuilder, ExecutionResult, Graph, GraphExecutor, Node, Variable, VariableSpace,
};
pub use ops::{
    BroadcastOp, IndexReduceOp, OpFamily, PairwiseOp, Reduce3Op, ReduceOp, ScalarOp,
    SummaryStatsOp, TransformOp,
};
pub use types::{DataType, Element, Order, VarId, ALL_AXES};
