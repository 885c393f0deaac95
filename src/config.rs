use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How nodes within one onion layer are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Nodes run one after another, in insertion order.
    Sequential,
    /// Layers with more than one node are scattered across worker threads.
    #[default]
    Auto,
}

/// Per-run executor configuration, supplied with the graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub mode: ExecutionMode,
    /// Worker count for parallel layers; `None` uses the rayon default.
    pub workers: Option<usize>,
    /// Raises per-node execution logging to debug level.
    pub verbose: bool,
}

/// Cooperative cancellation handle, polled at layer boundaries only.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
