use crate::ops::OpFamily;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FxError {
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch { expected: Vec<usize>, found: Vec<usize> },
    #[error("invalid shape: {0:?}")]
    InvalidShape(Vec<usize>),
    #[error("node {node} references input {input}, which is neither an external slot nor a declared node")]
    DanglingEdge { node: i32, input: i32 },
    #[error("node {node} depends on node {input}, declared after it; graphs must be acyclic")]
    NotDag { node: i32, input: i32 },
    #[error("unknown operation {op_num} in family {family:?}")]
    UnknownOp { family: OpFamily, op_num: i32 },
    #[error("no variable registered under name {0:?}")]
    UnknownName(String),
    #[error("no array available under id {0}")]
    UnknownId(i32),
    #[error("id {0} is already owned by another node")]
    DuplicateId(i32),
    #[error("random source failure: {0}")]
    BadRng(String),
    #[error("execution cancelled")]
    Cancelled,
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FxResult<T> = Result<T, FxError>;
