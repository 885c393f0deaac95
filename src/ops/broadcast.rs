use crate::array::NdArray;
use crate::errors::{FxError, FxResult};
use crate::types::Element;

/// Broadcast-along-axis: a lower-rank operand applied to every TAD of the
/// base array over the chosen axes: `Z[t][i] = f(X[t][i], Y[i])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOp {
    Add,
    Sub,
    Mul,
    Div,
    Copy,
}

impl BroadcastOp {
    pub fn from_num(num: i32) -> Option<Self> {
        Some(match num {
            0 => Self::Add,
            1 => Self::Sub,
            2 => Self::Mul,
            3 => Self::Div,
            4 => Self::Copy,
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
        }
    }

    pub const ALL: [BroadcastOp; 5] = [Self::Add, Self::Sub, Self::Mul, Self::Div, Self::Copy];

    pub fn apply<T: Element>(self, x: T, y: T) -> T {
        match self {
            Self::Add => x + y,
            Self::Sub => x - y,
            Self::Mul => x * y,
            Self::Div => x / y,
            Self::Copy => y,
        }
    }
}

/// Applies `y` along the TADs of `x` over `axes` into a fresh copy of `x`.
/// The operand must have exactly one TAD's worth of elements; vectors are
/// matched by length, so a `[1, n]` row operand fits an n-element TAD.
pub fn exec<T: Element>(
    op: BroadcastOp,
    x: &NdArray<T>,
    y: &NdArray<T>,
    axes: &[usize],
) -> FxResult<NdArray<T>> {
    let mut z = x.dup(x.order());
    let tad = crate::shape::Tad::build(z.shape_info(), axes)?;
    if y.len() != tad.tad_len() {
        return Err(FxError::ShapeMismatch {
            expected: tad.shape_info().shape().to_vec(),
            found: y.shape().to_vec(),
        });
    }
    let operand = y.to_flat_vec();
    let region = tad.shape_info().clone();
    let buf = z.buf_mut();
    for &base in tad.offsets() {
        region.for_each_offset(base, |pos, off| {
            buf[off] = op.apply(buf[off], operand[pos]);
        });
    }
    Ok(z)
}
