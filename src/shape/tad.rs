use super::ShapeInfo;
use crate::errors::{FxError, FxResult};

/// Tensor-Along-Dimension descriptor: the maximal sub-tensors spanning a
/// chosen axis subset of a base array, each addressed by a start offset into
/// the base buffer. Dimensional reductions and axis broadcasts fold over one
/// TAD at a time.
#[derive(Debug, Clone)]
pub struct Tad {
    tad_shape: ShapeInfo,
    offsets: Vec<usize>,
}

impl Tad {
    /// Builds the descriptor for `base` along `axes`. Axes are treated as a
    /// set and enumerated ascending; every axis must be within the base rank.
    pub fn build(base: &ShapeInfo, axes: &[usize]) -> FxResult<Self> {
        let rank = base.rank();
        let mut dims = axes.to_vec();
        dims.sort_unstable();
        dims.dedup();
        if dims.is_empty() || dims.iter().any(|&d| d >= rank) {
            return Err(FxError::InvalidShape(dims));
        }

        let tad_shape = ShapeInfo::strided(
            dims.iter().map(|&d| base.shape()[d]).collect(),
            dims.iter().map(|&d| base.strides()[d]).collect(),
            base.order(),
        )?;

        let keep: Vec<usize> = (0..rank).filter(|d| !dims.contains(d)).collect();
        let offsets = if keep.is_empty() {
            vec![0]
        } else {
            let outer = ShapeInfo::strided(
                keep.iter().map(|&d| base.shape()[d]).collect(),
                keep.iter().map(|&d| base.strides()[d]).collect(),
                base.order(),
            )?;
            let mut offsets = Vec::with_capacity(outer.len());
            outer.for_each_offset(0, |_, off| offsets.push(off));
            offsets
        };

        Ok(Self { tad_shape, offsets })
    }

    /// Shape info shared by every sub-tensor.
    pub fn shape_info(&self) -> &ShapeInfo {
        &self.tad_shape
    }

    /// Start offsets of the sub-tensors, in logical order of the retained axes.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn num_tads(&self) -> usize {
        self.offsets.len()
    }

    pub fn tad_len(&self) -> usize {
        self.tad_shape.len()
    }
}
