pub mod tad;
pub use tad::Tad;

use crate::errors::{FxError, FxResult};
use crate::types::Order;
use serde::{Deserialize, Serialize};

/// Describes how an array buffer is addressed: rank, shape, strides and
/// memory order. Strides are expressed in elements, never bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeInfo {
    shape: Vec<usize>,
    strides: Vec<usize>,
    order: Order,
}

impl ShapeInfo {
    /// Dense descriptor for the given shape and order.
    pub fn dense(shape: &[usize], order: Order) -> FxResult<Self> {
        if shape.is_empty() || shape.iter().any(|&d| d == 0) {
            return Err(FxError::InvalidShape(shape.to_vec()));
        }
        Ok(Self::dense_unchecked(shape.to_vec(), order))
    }

    pub(crate) fn dense_unchecked(shape: Vec<usize>, order: Order) -> Self {
        let strides = Self::dense_strides(&shape, order);
        Self { shape, strides, order }
    }

    /// Descriptor with explicit strides, used for sub-tensor views.
    pub fn strided(shape: Vec<usize>, strides: Vec<usize>, order: Order) -> FxResult<Self> {
        if shape.is_empty() || shape.iter().any(|&d| d == 0) || shape.len() != strides.len() {
            return Err(FxError::InvalidShape(shape));
        }
        Ok(Self { shape, strides, order })
    }

    pub fn dense_strides(shape: &[usize], order: Order) -> Vec<usize> {
        let mut strides = vec![1usize; shape.len()];
        match order {
            Order::RowMajor => {
                for i in (0..shape.len().saturating_sub(1)).rev() {
                    strides[i] = strides[i + 1] * shape[i + 1];
                }
            }
            Order::ColumnMajor => {
                for i in 1..shape.len() {
                    strides[i] = strides[i - 1] * shape[i - 1];
                }
            }
        }
        strides
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn is_dense(&self) -> bool {
        self.strides == Self::dense_strides(&self.shape, self.order)
    }

    /// The fixed linear stride of a logical (row-major) traversal, when the
    /// buffer admits one. `None` is the "no uniform stride" sentinel.
    pub fn elementwise_stride(&self) -> Option<usize> {
        if self.len() == 1 {
            return Some(1);
        }
        let wide: Vec<usize> = (0..self.rank()).filter(|&i| self.shape[i] > 1).collect();
        if let [only] = wide[..] {
            return Some(self.strides[only]);
        }
        if self.order == Order::RowMajor && self.is_dense() {
            return Some(1);
        }
        None
    }

    /// Buffer offset of a multi-index.
    pub fn offset(&self, index: &[usize]) -> usize {
        index
            .iter()
            .zip(&self.strides)
            .map(|(&i, &s)| i * s)
            .sum()
    }

    /// Walks every element in logical (row-major) order, yielding the logical
    /// position and the buffer offset relative to `base`.
    pub fn for_each_offset<F: FnMut(usize, usize)>(&self, base: usize, mut f: F) {
        let rank = self.rank();
        let n = self.len();
        let mut idx = vec![0usize; rank];
        let mut off = base;
        for pos in 0..n {
            f(pos, off);
            for ax in (0..rank).rev() {
                idx[ax] += 1;
                off += self.strides[ax];
                if idx[ax] < self.shape[ax] {
                    break;
                }
                off -= self.strides[ax] * self.shape[ax];
                idx[ax] = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_strides_row_major() {
        let si = ShapeInfo::dense(&[2, 3, 4], Order::RowMajor).unwrap();
        assert_eq!(si.strides(), &[12, 4, 1]);
        assert_eq!(si.len(), 24);
        assert_eq!(si.elementwise_stride(), Some(1));
    }

    #[test]
    fn dense_strides_column_major() {
        let si = ShapeInfo::dense(&[2, 3, 4], Order::ColumnMajor).unwrap();
        assert_eq!(si.strides(), &[1, 2, 6]);
        assert_eq!(si.elementwise_stride(), None);
    }

    #[test]
    fn vector_elementwise_stride() {
        let si = ShapeInfo::strided(vec![1, 5], vec![5, 1], Order::RowMajor).unwrap();
        assert_eq!(si.elementwise_stride(), Some(1));
        let col = ShapeInfo::strided(vec![5, 1], vec![5, 1], Order::RowMajor).unwrap();
        assert_eq!(col.elementwise_stride(), Some(5));
    }

    #[test]
    fn rejects_zero_dims() {
        assert!(ShapeInfo::dense(&[2, 0], Order::RowMajor).is_err());
        assert!(ShapeInfo::dense(&[], Order::RowMajor).is_err());
    }

    #[test]
    fn offsets_follow_strides() {
        let si = ShapeInfo::dense(&[2, 3], Order::ColumnMajor).unwrap();
        let mut seen = Vec::new();
        si.for_each_offset(0, |_, off| seen.push(off));
        // logical row-major walk over a column-major buffer
        assert_eq!(seen, vec![0, 2, 4, 1, 3, 5]);
    }
}
