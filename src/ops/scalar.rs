use crate::array::NdArray;
use crate::errors::FxResult;
use crate::types::Element;
use ndarray::Zip;

/// Scalar-broadcast operations: `Z[i] = f(X[i], s, extra)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarOp {
    Add,
    Sub,
    Mul,
    Div,
    ReverseSub,
    ReverseDiv,
    Max,
    Min,
    Set,
}

impl ScalarOp {
    pub fn from_num(num: i32) -> Option<Self> {
        Some(match num {
            0 => Self::Add,
            1 => Self::Sub,
            2 => Self::Mul,
            3 => Self::Div,
            4 => Self::ReverseSub,
            5 => Self::ReverseDiv,
            6 => Self::Max,
            7 => Self::Min,
            8 => Self::Set,
            _ => return None,
        })
    }

    pub fn as_num(self) -> i32 {
        match self {
            Self::Add => 0,
            Self::Sub => 1,
            Self::Mul => 2,
            Self::Div => 3,
            Self::ReverseSub => 4,
            Self::ReverseDiv => 5,
            Self::Max => 6,
            Self::Min => 7,
            Self::Set => 8,
        }
    }

    pub const ALL: [ScalarOp; 9] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::ReverseSub,
        Self::ReverseDiv,
        Self::Max,
        Self::Min,
        Self::Set,
    ];

    pub fn apply<T: Element>(self, x: T, s: T, _extra: &[T]) -> T {
        match self {
            Self::Add => x + s,
            Self::Sub => x - s,
            Self::Mul => x * s,
            Self::Div => x / s,
            Self::ReverseSub => s - x,
            Self::ReverseDiv => s / x,
            Self::Max => x.max(s),
            Self::Min => x.min(s),
            Self::Set => s,
        }
    }
}

/// Runs the scalar op into a fresh copy of `x`.
pub fn exec<T: Element>(
    op: ScalarOp,
    x: &NdArray<T>,
    s: T,
    extra: &[T],
) -> FxResult<NdArray<T>> {
    let mut z = x.dup(x.order());
    {
        let mut zv = z.view_mut()?;
        #[cfg(feature = "rayon")]
        Zip::from(&mut zv).par_for_each(|v| *v = op.apply(*v, s, extra));
        #[cfg(not(feature = "rayon"))]
        Zip::from(&mut zv).for_each(|v| *v = op.apply(*v, s, extra));
    }
    Ok(z)
}
