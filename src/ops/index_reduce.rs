use crate::array::NdArray;
use crate::errors::FxResult;
use crate::shape::{ShapeInfo, Tad};
use crate::types::{Element, Order};

/// Index reductions: the fold runs over (value, index) pairs and the stored
/// result is the winning index, cast to the array element type. Indices are
/// logical positions within the reduced region, first occurrence wins ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexReduceOp {
    IndexMax,
    IndexMin,
}

impl IndexReduceOp {
    pub fn from_num(num: i32) -> Option<Self> {
        Some(match num {
            0 => Self::IndexMax,
            1 => Self::IndexMin,
            _ => return None,
        })
    }

    pub fn as_num(self) -> i32 {
        match self {
            Self::IndexMax => 0,
            Self::IndexMin => 1,
        }
    }

    pub const ALL: [IndexReduceOp; 2] = [Self::IndexMax, Self::IndexMin];

    fn beats<T: Element>(self, candidate: T, best: T) -> bool {
        match self {
            Self::IndexMax => candidate > best,
            Self::IndexMin => candidate < best,
        }
    }
}

fn fold_region<T: Element>(
    op: IndexReduceOp,
    buf: &[T],
    region: &ShapeInfo,
    base: usize,
) -> usize {
    let mut best = buf[base];
    let mut winner = 0usize;
    region.for_each_offset(base, |pos, off| {
        if op.beats(buf[off], best) {
            best = buf[off];
            winner = pos;
        }
    });
    winner
}

/// Winning index over the whole array.
pub fn exec_scalar<T: Element>(op: IndexReduceOp, x: &NdArray<T>, _extra: &[T]) -> FxResult<usize> {
    Ok(fold_region(op, x.buf(), x.shape_info(), 0))
}

/// Winning index per TAD, as a `[1, R]` row vector of indices cast to `T`.
pub fn exec<T: Element>(
    op: IndexReduceOp,
    x: &NdArray<T>,
    axes: &[usize],
    _extra: &[T],
) -> FxResult<NdArray<T>> {
    let tad = Tad::build(x.shape_info(), axes)?;
    let mut z = NdArray::new(&[1, tad.num_tads()], Order::RowMajor)?;
    for (j, &base) in tad.offsets().iter().enumerate() {
        let winner = fold_region(op, x.buf(), tad.shape_info(), base);
        z.set_at(j, T::from_usize(winner).unwrap_or_else(T::zero));
    }
    Ok(z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_index_max_and_min() {
        let x = NdArray::row_vector(vec![1.0f32, 9.0, -4.0, 9.0]).unwrap();
        assert_eq!(exec_scalar(IndexReduceOp::IndexMax, &x, &[]).unwrap(), 1);
        assert_eq!(exec_scalar(IndexReduceOp::IndexMin, &x, &[]).unwrap(), 2);
    }

    #[test]
    fn per_row_argmax() {
        let x = NdArray::from_vec(
            &[2, 3],
            Order::RowMajor,
            vec![0.0f32, 5.0, 1.0, 7.0, 2.0, 3.0],
        )
        .unwrap();
        let z = exec(IndexReduceOp::IndexMax, &x, &[1], &[]).unwrap();
        assert_eq!(z.shape(), &[1, 2]);
        assert_eq!(z.to_flat_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn first_occurrence_wins() {
        let x = NdArray::row_vector(vec![3.0f32, 3.0, 3.0]).unwrap();
        assert_eq!(exec_scalar(IndexReduceOp::IndexMax, &x, &[]).unwrap(), 0);
    }
}
