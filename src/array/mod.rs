use crate::errors::{FxError, FxResult};
use crate::ops::reduce::{self, ReduceOp};
use crate::shape::ShapeInfo;
use crate::types::{Element, Order};
use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, IxDyn, ShapeBuilder};
use serde::{Deserialize, Serialize};

/// A dense N-dimensional array: one owned contiguous buffer plus the shape
/// descriptor addressing it. Scalars are stored rank-2 as `[1, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Element"))]
pub struct NdArray<T: Element> {
    buf: Vec<T>,
    shape_info: ShapeInfo,
}

impl<T: Element> NdArray<T> {
    /// Zero-initialized array with the given shape and order.
    pub fn new(shape: &[usize], order: Order) -> FxResult<Self> {
        let shape_info = ShapeInfo::dense(shape, order)?;
        let buf = vec![T::zero(); shape_info.len()];
        Ok(Self { buf, shape_info })
    }

    /// Zero-initialized row-major array.
    pub fn zeros(shape: &[usize]) -> FxResult<Self> {
        Self::new(shape, Order::RowMajor)
    }

    /// Row-major rank-2 matrix, the shape most graph tests trade in.
    pub fn matrix(rows: usize, cols: usize) -> FxResult<Self> {
        Self::zeros(&[rows, cols])
    }

    /// A `[1, 1]` array holding a single value.
    pub fn scalar(value: T) -> Self {
        Self {
            buf: vec![value],
            shape_info: ShapeInfo::dense_unchecked(vec![1, 1], Order::RowMajor),
        }
    }

    /// A `[1, n]` row vector over the given values.
    pub fn row_vector(values: Vec<T>) -> FxResult<Self> {
        let n = values.len();
        Self::from_vec(&[1, n], Order::RowMajor, values)
    }

    /// Array over an existing buffer; `values` are laid out in the order the
    /// strides of `order` imply.
    pub fn from_vec(shape: &[usize], order: Order, values: Vec<T>) -> FxResult<Self> {
        let shape_info = ShapeInfo::dense(shape, order)?;
        if shape_info.len() != values.len() {
            return Err(FxError::ShapeMismatch {
                expected: shape.to_vec(),
                found: vec![values.len()],
            });
        }
        Ok(Self { buf: values, shape_info })
    }

    /// Uniformly random row-major array in `[low, high)`.
    pub fn random(shape: &[usize], low: T, high: T) -> FxResult<Self>
    where
        T: rand::distributions::uniform::SampleUniform,
    {
        use ndarray_rand::RandomExt;
        use rand::distributions::Uniform;

        if low >= high {
            return Err(FxError::BadRng(format!(
                "empty sample interval [{low}, {high})"
            )));
        }
        let data: ArrayD<T> = ArrayD::random(IxDyn(shape), Uniform::new(low, high));
        Self::from_vec(shape, Order::RowMajor, data.into_raw_vec())
    }

    pub fn shape_info(&self) -> &ShapeInfo {
        &self.shape_info
    }

    pub fn shape(&self) -> &[usize] {
        self.shape_info.shape()
    }

    pub fn strides(&self) -> &[usize] {
        self.shape_info.strides()
    }

    pub fn rank(&self) -> usize {
        self.shape_info.rank()
    }

    pub fn len(&self) -> usize {
        self.shape_info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn order(&self) -> Order {
        self.shape_info.order()
    }

    /// Row count of a rank-2 array, 0 otherwise.
    pub fn rows(&self) -> usize {
        if self.rank() == 2 {
            self.shape()[0]
        } else {
            0
        }
    }

    /// Column count of a rank-2 array, 0 otherwise.
    pub fn columns(&self) -> usize {
        if self.rank() == 2 {
            self.shape()[1]
        } else {
            0
        }
    }

    pub fn buf(&self) -> &[T] {
        &self.buf
    }

    pub fn buf_mut(&mut self) -> &mut [T] {
        &mut self.buf
    }

    /// Scalar read at a linear buffer offset.
    pub fn at(&self, i: usize) -> T {
        self.buf[i]
    }

    /// Scalar write at a linear buffer offset.
    pub fn set_at(&mut self, i: usize, value: T) {
        self.buf[i] = value;
    }

    /// Scalar read at a multi-index.
    pub fn at_index(&self, index: &[usize]) -> T {
        self.buf[self.shape_info.offset(index)]
    }

    pub fn set_index(&mut self, index: &[usize], value: T) {
        let off = self.shape_info.offset(index);
        self.buf[off] = value;
    }

    /// Deep copy, re-laid-out in the requested order.
    pub fn dup(&self, order: Order) -> Self {
        if order == self.order() && self.shape_info.is_dense() {
            return self.clone();
        }
        let shape_info = ShapeInfo::dense_unchecked(self.shape().to_vec(), order);
        let flat = self.to_flat_vec();
        let mut buf = vec![T::zero(); flat.len()];
        shape_info.for_each_offset(0, |pos, off| buf[off] = flat[pos]);
        Self { buf, shape_info }
    }

    /// Elementwise copy from `other`. Shapes must match exactly; no implicit
    /// broadcasting here.
    pub fn assign(&mut self, other: &Self) -> FxResult<()> {
        if self.shape() != other.shape() {
            return Err(FxError::ShapeMismatch {
                expected: self.shape().to_vec(),
                found: other.shape().to_vec(),
            });
        }
        if self.order() == other.order()
            && self.shape_info.is_dense()
            && other.shape_info.is_dense()
        {
            self.buf.copy_from_slice(&other.buf);
            return Ok(());
        }
        let src = other.to_flat_vec();
        let shape_info = self.shape_info.clone();
        shape_info.for_each_offset(0, |pos, off| self.buf[off] = src[pos]);
        Ok(())
    }

    /// Fills every element with `value`.
    pub fn assign_scalar(&mut self, value: T) {
        self.buf.fill(value);
    }

    /// Values in logical (row-major) order, the layout wire buffers use.
    pub fn to_flat_vec(&self) -> Vec<T> {
        if self.order() == Order::RowMajor && self.shape_info.is_dense() {
            return self.buf.clone();
        }
        let mut out = vec![T::zero(); self.len()];
        self.shape_info
            .for_each_offset(0, |pos, off| out[pos] = self.buf[off]);
        out
    }

    /// Borrowed ndarray view for elementwise kernels.
    pub fn view(&self) -> FxResult<ArrayViewD<'_, T>> {
        ArrayViewD::from_shape(
            IxDyn(self.shape()).strides(IxDyn(self.strides())),
            &self.buf,
        )
        .map_err(|_| FxError::InvalidShape(self.shape().to_vec()))
    }

    pub fn view_mut(&mut self) -> FxResult<ArrayViewMutD<'_, T>> {
        let shape = self.shape().to_vec();
        let strides = self.strides().to_vec();
        ArrayViewMutD::from_shape(IxDyn(&shape).strides(IxDyn(&strides)), &mut self.buf)
            .map_err(|_| FxError::InvalidShape(shape))
    }

    /// Folds the whole array down to one number with the given reduction.
    pub fn reduce_number(&self, op: ReduceOp) -> FxResult<T> {
        reduce::exec_scalar(op, self, &[])
    }

    pub fn mean(&self) -> FxResult<T> {
        self.reduce_number(ReduceOp::Mean)
    }

    /// Elementwise comparison within an absolute tolerance.
    pub fn approx_eq(&self, other: &Self, tol: T) -> bool {
        self.shape() == other.shape()
            && self
                .to_flat_vec()
                .into_iter()
                .zip(other.to_flat_vec())
                .all(|(a, b)| (a - b).abs() <= tol)
    }
}

impl<T: Element> PartialEq for NdArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.to_flat_vec() == other.to_flat_vec()
    }
}
