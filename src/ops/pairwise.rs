use crate::array::NdArray;
use crate::errors::{FxError, FxResult};
use crate::types::Element;
use ndarray::Zip;

/// Binary elementwise operations: `Z[i] = f(X[i], Y[i], extra)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairwiseOp {
    Add,
    Sub,
    Mul,
    Div,
    Copy,
    Max,
    Min,
}

impl PairwiseOp {
    pub fn from_num(num: i32) -> Option<Self> {
        Some(match num {
            0 => Self::Add,
            1 => Self::Sub,
            2 => Self::Mul,
            3 => Self::Div,
            4 => Self::Copy,
            5 => Self::Max,
            6 => Self::Min,
            _ => return None,
        })
    }

    pub fn as_num(self) -> i32 {
        match self {
            Self::Add => 0,
            Self::Sub => 1,
            Self::Mul => 2,
            Self::Div => 3,
            Self::Copy => 4,
            Self::Max => 5,
            Self::Min => 6,
        }
    }

    pub const ALL: [PairwiseOp; 7] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Copy,
        Self::Max,
        Self::Min,
    ];

    pub fn apply<T: Element>(self, x: T, y: T, _extra: &[T]) -> T {
        match self {
            Self::Add => x + y,
            Self::Sub => x - y,
            Self::Mul => x * y,
            Self::Div => x / y,
            Self::Copy => y,
            Self::Max => x.max(y),
            Self::Min => x.min(y),
        }
    }
}

/// Runs the pairwise op into a fresh copy of `x`. Shapes must match exactly.
pub fn exec<T: Element>(
    op: PairwiseOp,
    x: &NdArray<T>,
    y: &NdArray<T>,
    extra: &[T],
) -> FxResult<NdArray<T>> {
    if x.shape() != y.shape() {
        return Err(FxError::ShapeMismatch {
            expected: x.shape().to_vec(),
            found: y.shape().to_vec(),
        });
    }
    let mut z = x.dup(x.order());
    {
        let mut zv = z.view_mut()?;
        let yv = y.view()?;
        #[cfg(feature = "rayon")]
        Zip::from(&mut zv)
            .and(&yv)
            .par_for_each(|v, &y| *v = op.apply(*v, y, extra));
        #[cfg(not(feature = "rayon"))]
        Zip::from(&mut zv)
            .and(&yv)
            .for_each(|v, &y| *v = op.apply(*v, y, extra));
    }
    Ok(z)
}
