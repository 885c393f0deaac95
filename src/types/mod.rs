use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Identifier of a slot in the variable space.
///
/// Negative ids are external slots (caller-provided inputs or caller-observable
/// outputs). Positive ids are internal slots, equal to the producing node's id.
/// Zero is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarId(pub i32);

impl VarId {
    pub fn is_external(self) -> bool {
        self.0 < 0
    }

    pub fn is_internal(self) -> bool {
        self.0 > 0
    }
}

impl From<i32> for VarId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Element type of a graph instance. One per graph; carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Float,
    Double,
}

/// Memory order of a dense array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Order {
    #[default]
    RowMajor,
    ColumnMajor,
}

impl Order {
    pub fn as_char(self) -> char {
        match self {
            Order::RowMajor => 'c',
            Order::ColumnMajor => 'f',
        }
    }
}

/// Numeric element type the executor is instantiated with.
pub trait Element:
    num_traits::Float
    + num_traits::FromPrimitive
    + std::fmt::Debug
    + std::fmt::Display
    + Default
    + Send
    + Sync
    + Serialize
    + DeserializeOwned
    + 'static
{
    const DATA_TYPE: DataType;

    /// Widens a wire-buffer value into this element type.
    fn from_f32(v: f32) -> Self;

    /// Narrows a value back into the wire-buffer type.
    fn to_f32(self) -> f32;
}

impl Element for f32 {
    const DATA_TYPE: DataType = DataType::Float;

    fn from_f32(v: f32) -> Self {
        v
    }

    fn to_f32(self) -> f32 {
        self
    }
}

impl Element for f64 {
    const DATA_TYPE: DataType = DataType::Double;

    fn from_f32(v: f32) -> Self {
        f64::from(v)
    }

    fn to_f32(self) -> f32 {
        self as f32
    }
}

/// Axis sentinel meaning "reduce over every axis".
pub const ALL_AXES: i32 = i32::MAX;
