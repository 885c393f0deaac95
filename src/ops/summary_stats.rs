use crate::array::NdArray;
use crate::errors::FxResult;
use crate::shape::{ShapeInfo, Tad};
use crate::types::{Element, Order};

/// Summary statistics: variance and standard deviation with a bias-correction
/// switch. On a node the switch travels as the scalar field, non-zero meaning
/// corrected (divisor n−1 instead of n).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStatsOp {
    Variance,
    StandardDeviation,
}

impl SummaryStatsOp {
    pub fn from_num(num: i32) -> Option<Self> {
        Some(match num {
            0 => Self::Variance,
            1 => Self::StandardDeviation,
            _ => return None,
        })
    }

    pub fn as_num(self) -> i32 {
        match self {
            Self::Variance => 0,
            Self::StandardDeviation => 1,
        }
    }

    pub const ALL: [SummaryStatsOp; 2] = [Self::Variance, Self::StandardDeviation];
}

fn stat_region<T: Element>(
    op: SummaryStatsOp,
    bias_corrected: bool,
    buf: &[T],
    region: &ShapeInfo,
    base: usize,
) -> T {
    let n = region.len();
    let count = T::from_usize(n).unwrap_or_else(T::one);

    let mut sum = T::zero();
    region.for_each_offset(base, |_, off| sum = sum + buf[off]);
    let mean = sum / count;

    let mut m2 = T::zero();
    region.for_each_offset(base, |_, off| {
        let d = buf[off] - mean;
        m2 = m2 + d * d;
    });

    let divisor = if bias_corrected { count - T::one() } else { count };
    let variance = m2 / divisor;
    match op {
        SummaryStatsOp::Variance => variance,
        SummaryStatsOp::StandardDeviation => variance.sqrt(),
    }
}

/// Statistic over the whole array.
pub fn exec_scalar<T: Element>(
    op: SummaryStatsOp,
    bias_corrected: bool,
    x: &NdArray<T>,
    _extra: &[T],
) -> FxResult<T> {
    Ok(stat_region(op, bias_corrected, x.buf(), x.shape_info(), 0))
}

/// Statistic per TAD, collapsed into a `[1, R]` row vector.
pub fn exec<T: Element>(
    op: SummaryStatsOp,
    bias_corrected: bool,
    x: &NdArray<T>,
    axes: &[usize],
    _extra: &[T],
) -> FxResult<NdArray<T>> {
    let tad = Tad::build(x.shape_info(), axes)?;
    let mut z = NdArray::new(&[1, tad.num_tads()], Order::RowMajor)?;
    for (j, &base) in tad.offsets().iter().enumerate() {
        z.set_at(
            j,
            stat_region(op, bias_corrected, x.buf(), tad.shape_info(), base),
        );
    }
    Ok(z)
}
