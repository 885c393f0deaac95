use crate::array::NdArray;
use crate::errors::{FxError, FxResult};
use crate::shape::{ShapeInfo, Tad};
use crate::types::{Element, Order};

/// Paired reductions over two same-shaped arrays. The per-pair map may
/// mutate the extra-parameter state as it goes (cosine similarity accumulates
/// the squared norms into slots [0] and [1]); the post-process reads the
/// final state. The state is rebuilt for every reduced region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce3Op {
    CosineSimilarity,
    EuclideanDistance,
    ManhattanDistance,
}

impl Reduce3Op {
    pub fn from_num(num: i32) -> Option<Self> {
        Some(match num {
            0 => Self::CosineSimilarity,
            1 => Self::EuclideanDistance,
            2 => Self::ManhattanDistance,
            _ => return None,
        })
    }

    pub fn as_num(self) -> i32 {
        match self {
            Self::CosineSimilarity => 0,
            Self::EuclideanDistance => 1,
            Self::ManhattanDistance => 2,
        }
    }

    pub const ALL: [Reduce3Op; 3] = [
        Self::CosineSimilarity,
        Self::EuclideanDistance,
        Self::ManhattanDistance,
    ];

    pub fn map<T: Element>(self, d1: T, d2: T, extra: &mut [T]) -> T {
        match self {
            Self::CosineSimilarity => {
                extra[0] = extra[0] + d1 * d1;
                extra[1] = extra[1] + d2 * d2;
                d1 * d2
            }
            Self::EuclideanDistance => {
                let d = d1 - d2;
                d * d
            }
            Self::ManhattanDistance => (d1 - d2).abs(),
        }
    }

    pub fn post<T: Element>(self, acc: T, _n: usize, extra: &[T]) -> T {
        match self {
            Self::CosineSimilarity => acc / (extra[0].sqrt() * extra[1].sqrt()),
            Self::EuclideanDistance => acc.sqrt(),
            Self::ManhattanDistance => acc,
        }
    }
}

fn fresh_state<T: Element>(seed: &[T]) -> Vec<T> {
    let mut state = seed.to_vec();
    if state.len() < 2 {
        state.resize(2, T::zero());
    }
    state[0] = T::zero();
    state[1] = T::zero();
    state
}

fn fold_pair<T: Element>(
    op: Reduce3Op,
    x: &[T],
    y: &[T],
    region: &ShapeInfo,
    base: usize,
    seed: &[T],
) -> T {
    let mut state = fresh_state(seed);
    let mut acc = T::zero();
    region.for_each_offset(base, |_, off| {
        acc = acc + op.map(x[off], y[off], &mut state);
    });
    op.post(acc, region.len(), &state)
}

fn check_shapes<T: Element>(x: &NdArray<T>, y: &NdArray<T>) -> FxResult<()> {
    if x.shape() != y.shape() || x.order() != y.order() {
        return Err(FxError::ShapeMismatch {
            expected: x.shape().to_vec(),
            found: y.shape().to_vec(),
        });
    }
    Ok(())
}

/// Paired reduce-to-scalar.
pub fn exec_scalar<T: Element>(
    op: Reduce3Op,
    x: &NdArray<T>,
    y: &NdArray<T>,
    extra: &[T],
) -> FxResult<T> {
    check_shapes(x, y)?;
    Ok(fold_pair(op, x.buf(), y.buf(), x.shape_info(), 0, extra))
}

/// Paired dimensional reduction: both arrays are cut into TADs along the same
/// axes and folded at matching offsets.
pub fn exec<T: Element>(
    op: Reduce3Op,
    x: &NdArray<T>,
    y: &NdArray<T>,
    axes: &[usize],
    extra: &[T],
) -> FxResult<NdArray<T>> {
    check_shapes(x, y)?;
    let tad = Tad::build(x.shape_info(), axes)?;
    let mut z = NdArray::new(&[1, tad.num_tads()], Order::RowMajor)?;
    for (j, &base) in tad.offsets().iter().enumerate() {
        z.set_at(
            j,
            fold_pair(op, x.buf(), y.buf(), tad.shape_info(), base, extra),
        );
    }
    Ok(z)
}
