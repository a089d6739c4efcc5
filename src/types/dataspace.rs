//! Data spaces
//!
//! Shape of a dataset or attribute element grid.

use serde::{Deserialize, Serialize};

use crate::error::{H5Error, Result};

/// Marks a dimension that may grow without bound
pub const UNLIMITED: usize = usize::MAX;

/// Largest element count a dataset or attribute may hold. Elements live in
/// memory and are journaled whole.
pub const MAX_ELEMENTS: usize = u32::MAX as usize;

/// Ordered dimension sizes. Rank 0 is the scalar space (one element).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataSpace {
    dims: Vec<usize>,
    max_dims: Option<Vec<usize>>,
}

impl DataSpace {
    /// Fixed-size space with the given dimensions
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Self {
            dims: dims.into(),
            max_dims: None,
        }
    }

    /// Rank-0 space holding exactly one element
    pub fn scalar() -> Self {
        Self::new(Vec::new())
    }

    /// Space that `DataSet::resize` may grow up to `max_dims`
    /// (use [`UNLIMITED`] for an unbounded dimension)
    pub fn extensible(dims: impl Into<Vec<usize>>, max_dims: impl Into<Vec<usize>>) -> Result<Self> {
        let dims = dims.into();
        let max_dims = max_dims.into();

        if dims.len() != max_dims.len() {
            return Err(H5Error::invalid_argument(format!(
                "rank of dims ({}) and max dims ({}) differ",
                dims.len(),
                max_dims.len()
            )));
        }
        if let Some((d, m)) = dims.iter().zip(&max_dims).find(|(d, m)| d > m) {
            return Err(H5Error::invalid_argument(format!(
                "dimension {} exceeds its maximum {}",
                d, m
            )));
        }

        Ok(Self {
            dims,
            max_dims: Some(max_dims),
        })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Maximum dims; `None` for a fixed-size space
    pub fn max_dims(&self) -> Option<&[usize]> {
        self.max_dims.as_deref()
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Product of the dimensions (1 for the scalar space), saturating at
    /// `usize::MAX`
    pub fn element_count(&self) -> usize {
        self.dims.iter().fold(1usize, |acc, &d| acc.saturating_mul(d))
    }

    /// Fail with `InvalidArgument` if the element count overflows or
    /// exceeds [`MAX_ELEMENTS`]
    pub fn validate(&self) -> Result<()> {
        validate_dims(&self.dims)
    }

    /// Fail with `ShapeMismatch` unless `actual` equals the element count
    pub fn check_count(&self, actual: usize) -> Result<()> {
        let expected = self.element_count();
        if expected != actual {
            return Err(H5Error::ShapeMismatch { expected, actual });
        }
        Ok(())
    }

    /// Flat row-major indices of the block at `offset` with extent `count`
    pub(crate) fn hyperslab(&self, offset: &[usize], count: &[usize]) -> Result<Vec<usize>> {
        if offset.len() != self.rank() || count.len() != self.rank() {
            return Err(H5Error::invalid_argument(format!(
                "selection rank ({}, {}) does not match dataspace rank {}",
                offset.len(),
                count.len(),
                self.rank()
            )));
        }
        for axis in 0..self.rank() {
            let end = offset[axis].checked_add(count[axis]);
            if end.map_or(true, |end| end > self.dims[axis]) {
                return Err(H5Error::invalid_argument(format!(
                    "selection {}+{} exceeds dimension {} of size {}",
                    offset[axis], count[axis], axis, self.dims[axis]
                )));
            }
        }

        let strides = super::buffer::row_major_strides(&self.dims);
        let total: usize = count.iter().product();
        let mut coord = vec![0usize; count.len()];
        let mut indices = Vec::with_capacity(total);

        for _ in 0..total {
            let flat: usize = coord
                .iter()
                .zip(offset)
                .zip(&strides)
                .map(|((c, o), s)| (c + o) * s)
                .sum();
            indices.push(flat);
            super::buffer::advance(&mut coord, count);
        }
        Ok(indices)
    }

    /// Same space with new current dims, checked against the max dims
    pub(crate) fn resized(&self, dims: &[usize]) -> Result<Self> {
        let max_dims = self.max_dims.as_ref().ok_or_else(|| {
            H5Error::invalid_argument("dataspace is not extensible")
        })?;

        if dims.len() != self.rank() {
            return Err(H5Error::invalid_argument(format!(
                "cannot resize a rank-{} dataspace to rank {}",
                self.rank(),
                dims.len()
            )));
        }
        if let Some((d, m)) = dims.iter().zip(max_dims).find(|(d, m)| d > m) {
            return Err(H5Error::invalid_argument(format!(
                "dimension {} exceeds its maximum {}",
                d, m
            )));
        }

        validate_dims(dims)?;

        Ok(Self {
            dims: dims.to_vec(),
            max_dims: Some(max_dims.clone()),
        })
    }
}

fn validate_dims(dims: &[usize]) -> Result<()> {
    let count = dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d));
    match count {
        Some(count) if count <= MAX_ELEMENTS => Ok(()),
        Some(count) => Err(H5Error::invalid_argument(format!(
            "{} elements exceed the limit of {}",
            count, MAX_ELEMENTS
        ))),
        None => Err(H5Error::invalid_argument(format!(
            "element count of {:?} overflows",
            dims
        ))),
    }
}

impl From<usize> for DataSpace {
    fn from(count: usize) -> Self {
        Self::new(vec![count])
    }
}

impl From<Vec<usize>> for DataSpace {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for DataSpace {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for DataSpace {
    fn from(dims: [usize; N]) -> Self {
        Self::new(dims.to_vec())
    }
}

impl From<&DataSpace> for DataSpace {
    fn from(space: &DataSpace) -> Self {
        space.clone()
    }
}
