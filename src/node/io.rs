//! Typed element transfer shared by datasets and attributes

use ndarray::{ArrayD, IxDyn};

use crate::error::{H5Error, Result};
use crate::types::{DataSpace, Element, ElementBuffer, TypeDescriptor};

/// `read_<type>` shorthands for `read::<T>()`, one per element class
macro_rules! typed_readers {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&self) -> Result<ArrayD<$ty>> {
                self.read()
            }
        )*
    };
}

pub(crate) use typed_readers;

/// Unwrap a stored buffer as `T`, `TypeMismatch` for any other class
pub(crate) fn to_vec<T: Element>(dtype: &TypeDescriptor, data: ElementBuffer) -> Result<Vec<T>> {
    let mismatch = || H5Error::TypeMismatch {
        stored: dtype.class(),
        requested: T::CLASS,
    };
    if dtype.class() != T::CLASS {
        return Err(mismatch());
    }
    T::from_buffer(data).ok_or_else(mismatch)
}

/// Stored buffer shaped by `dims` (empty dims give a 0-d array)
pub(crate) fn to_array<T: Element>(
    dtype: &TypeDescriptor,
    dims: &[usize],
    data: ElementBuffer,
) -> Result<ArrayD<T>> {
    let values = to_vec(dtype, data)?;
    ArrayD::from_shape_vec(IxDyn(dims), values)
        .map_err(|e| H5Error::Storage(format!("stored data does not fit its dataspace: {}", e)))
}

/// Validate a buffer for a whole-object write
pub(crate) fn conform(
    dtype: &TypeDescriptor,
    space: &DataSpace,
    data: ElementBuffer,
) -> Result<ElementBuffer> {
    data.conform(dtype, space.element_count())
}
