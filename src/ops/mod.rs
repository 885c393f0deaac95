pub mod broadcast;
pub mod index_reduce;
pub mod pairwise;
pub mod reduce;
pub mod reduce3;
pub mod scalar;
pub mod summary_stats;
pub mod transform;

pub use broadcast::BroadcastOp;
pub use index_reduce::IndexReduceOp;
pub use pairwise::PairwiseOp;
pub use reduce::ReduceOp;
pub use reduce3::Reduce3Op;
pub use scalar::ScalarOp;
pub use summary_stats::SummaryStatsOp;
pub use transform::TransformOp;

use crate::errors::{FxError, FxResult};
use crate::types::ALL_AXES;
use serde::{Deserialize, Serialize};

/// The operation families a node can dispatch to. Concrete operations within
/// a family are closed enums selected by op number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpFamily {
    Transform,
    Pairwise,
    Scalar,
    Broadcast,
    Accumulation,
    IndexAccumulation,
    SummaryStats,
    Reduce3,
}

/// Interprets a node's axis list against an array rank. `None` means
/// reduce-to-scalar: an empty list, the all-axes sentinel, or a list covering
/// every axis.
pub fn normalized_axes(axes: &[i32], rank: usize) -> FxResult<Option<Vec<usize>>> {
    if axes.is_empty() || axes.iter().any(|&a| a == ALL_AXES) {
        return Ok(None);
    }
    let mut dims: Vec<usize> = Vec::with_capacity(axes.len());
    for &a in axes {
        if a < 0 || a as usize >= rank {
            return Err(FxError::InvalidShape(
                axes.iter().map(|&x| x.unsigned_abs() as usize).collect(),
            ));
        }
        dims.push(a as usize);
    }
    dims.sort_unstable();
    dims.dedup();
    if dims.len() == rank {
        return Ok(None);
    }
    Ok(Some(dims))
}
