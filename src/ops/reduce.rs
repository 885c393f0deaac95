use crate::array::NdArray;
use crate::errors::FxResult;
use crate::shape::{ShapeInfo, Tad};
use crate::types::{Element, Order};

/// Reductions over one input array. Each op is a monoid (identity, combine)
/// plus a per-element map and a post-process hook; Variance, StandardDeviation
/// and Bias run a first pass that stages the mean (and bias term) into the
/// extra-parameter slots [0] and [1] before the fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    Mean,
    Sum,
    Prod,
    Max,
    Min,
    Norm1,
    Norm2,
    NormMax,
    Variance,
    StandardDeviation,
    Bias,
}

impl ReduceOp {
    pub fn from_num(num: i32) -> Option<Self> {
        Some(match num {
            0 => Self::Mean,
            1 => Self::Sum,
            2 => Self::Prod,
            3 => Self::Max,
            4 => Self::Min,
            5 => Self::Norm1,
            6 => Self::Norm2,
            7 => Self::NormMax,
            8 => Self::Variance,
            9 => Self::StandardDeviation,
            10 => Self::Bias,
            _ => return None,
        })
    }

    pub fn as_num(self) -> i32 {
        match self {
            Self::Mean => 0,
            Self::Sum => 1,
            Self::Prod => 2,
            Self::Max => 3,
            Self::Min => 4,
            Self::Norm1 => 5,
            Self::Norm2 => 6,
            Self::NormMax => 7,
            Self::Variance => 8,
            Self::StandardDeviation => 9,
            Self::Bias => 10,
        }
    }

    pub const ALL: [ReduceOp; 11] = [
        Self::Mean,
        Self::Sum,
        Self::Prod,
        Self::Max,
        Self::Min,
        Self::Norm1,
        Self::Norm2,
        Self::NormMax,
        Self::Variance,
        Self::StandardDeviation,
        Self::Bias,
    ];

    pub fn starting_value<T: Element>(self, first: T) -> T {
        match self {
            Self::Prod => T::one(),
            Self::Max | Self::Min => first,
            _ => T::zero(),
        }
    }

    pub fn map<T: Element>(self, x: T, extra: &[T]) -> T {
        match self {
            Self::Norm1 => x.abs(),
            Self::Norm2 => x * x,
            Self::Bias => x - extra[0],
            Self::Variance | Self::StandardDeviation => {
                let d = x - extra[0];
                d * d
            }
            _ => x,
        }
    }

    pub fn combine<T: Element>(self, a: T, b: T) -> T {
        match self {
            Self::Prod => a * b,
            Self::Max => a.max(b),
            Self::Min => a.min(b),
            Self::NormMax => a.abs().max(b.abs()),
            _ => a + b,
        }
    }

    pub fn post<T: Element>(self, acc: T, n: usize, extra: &[T]) -> T {
        let count = T::from_usize(n).unwrap_or_else(T::one);
        match self {
            Self::Mean => acc / count,
            Self::Norm2 => acc.sqrt(),
            Self::Variance => {
                let bias = extra[1];
                (acc - bias * bias / count) / (count - T::one())
            }
            Self::StandardDeviation => {
                let bias = extra[1];
                ((acc - bias * bias / count) / (count - T::one())).sqrt()
            }
            _ => acc,
        }
    }

    /// Whether the op needs the mean/bias staging pass.
    pub fn two_pass(self) -> bool {
        matches!(
            self,
            Self::Variance | Self::StandardDeviation | Self::Bias
        )
    }

    /// Stages the mean into `extra[0]` and the bias term into `extra[1]`.
    pub fn prepare<T: Element>(self, values: &[T], extra: &mut [T]) {
        let count = T::from_usize(values.len()).unwrap_or_else(T::one);
        let mean = values.iter().fold(T::zero(), |a, &v| a + v) / count;
        let bias = values.iter().fold(T::zero(), |a, &v| a + (v - mean));
        extra[0] = mean;
        extra[1] = bias;
    }
}

/// Extra-parameter vector padded out to the two staging slots.
pub(crate) fn staged_extra<T: Element>(extra: &[T]) -> Vec<T> {
    let mut out = extra.to_vec();
    if out.len() < 2 {
        out.resize(2, T::zero());
    }
    out
}

fn fold_region<T: Element>(
    op: ReduceOp,
    buf: &[T],
    region: &ShapeInfo,
    base: usize,
    extra: &[T],
) -> T {
    let mut acc = op.starting_value(buf[base]);
    if let Some(ews) = region.elementwise_stride() {
        let mut off = base;
        for _ in 0..region.len() {
            acc = op.combine(acc, op.map(buf[off], extra));
            off += ews;
        }
    } else {
        region.for_each_offset(base, |_, off| {
            acc = op.combine(acc, op.map(buf[off], extra));
        });
    }
    acc
}

fn collect_region<T: Element>(buf: &[T], region: &ShapeInfo, base: usize) -> Vec<T> {
    let mut out = vec![T::zero(); region.len()];
    region.for_each_offset(base, |pos, off| out[pos] = buf[off]);
    out
}

fn reduce_region<T: Element>(
    op: ReduceOp,
    buf: &[T],
    region: &ShapeInfo,
    base: usize,
    extra: &[T],
) -> T {
    let n = region.len();
    if op.two_pass() {
        let values = collect_region(buf, region, base);
        let mut staged = staged_extra(extra);
        op.prepare(&values, &mut staged);
        let mut acc = op.starting_value(values[0]);
        for &v in &values {
            acc = op.combine(acc, op.map(v, &staged));
        }
        op.post(acc, n, &staged)
    } else {
        let acc = fold_region(op, buf, region, base, extra);
        op.post(acc, n, extra)
    }
}

/// Reduce-to-scalar over the whole array.
pub fn exec_scalar<T: Element>(op: ReduceOp, x: &NdArray<T>, extra: &[T]) -> FxResult<T> {
    Ok(reduce_region(op, x.buf(), x.shape_info(), 0, extra))
}

/// Dimensional reduction: one result per TAD of the given axes, collapsed
/// into a `[1, R]` row vector.
pub fn exec<T: Element>(
    op: ReduceOp,
    x: &NdArray<T>,
    axes: &[usize],
    extra: &[T],
) -> FxResult<NdArray<T>> {
    let tad = Tad::build(x.shape_info(), axes)?;
    let mut z = NdArray::new(&[1, tad.num_tads()], Order::RowMajor)?;
    for (j, &base) in tad.offsets().iter().enumerate() {
        z.set_at(j, reduce_region(op, x.buf(), tad.shape_info(), base, extra));
    }
    Ok(z)
}
