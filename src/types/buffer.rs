//! Element buffers
//!
//! Flat, typed element storage in row-major order, plus the traits that
//! turn caller values into buffers.
//!
//! ## Logical vs raw order
//! - [`IntoElements`] walks a value in logical (row-major index) order, so a
//!   row-major and a column-major `ndarray` holding the same logical values
//!   produce the same buffer.
//! - [`IntoRawElements`] copies the backing memory verbatim. A column-major
//!   array therefore lands on disk in column-major order; the caller owns
//!   matching the memory layout to the declared dataspace.

use ndarray::{ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

use super::{Complex32, Complex64, Element, TypeClass, TypeDescriptor};
use crate::error::{H5Error, Result};

/// Flat element storage for one dataset or attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementBuffer {
    Bool(Vec<bool>),
    Char(Vec<i8>),
    UChar(Vec<u8>),
    Short(Vec<i16>),
    UShort(Vec<u16>),
    Int(Vec<i32>),
    UInt(Vec<u32>),
    LLong(Vec<i64>),
    ULLong(Vec<u64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    CFloat(Vec<Complex32>),
    CDouble(Vec<Complex64>),
    Str(Vec<String>),
}

/// Evaluate an expression against the inner vector, whatever its type
macro_rules! with_buffer {
    ($buffer:expr, $values:ident => $body:expr) => {
        match $buffer {
            ElementBuffer::Bool($values) => $body,
            ElementBuffer::Char($values) => $body,
            ElementBuffer::UChar($values) => $body,
            ElementBuffer::Short($values) => $body,
            ElementBuffer::UShort($values) => $body,
            ElementBuffer::Int($values) => $body,
            ElementBuffer::UInt($values) => $body,
            ElementBuffer::LLong($values) => $body,
            ElementBuffer::ULLong($values) => $body,
            ElementBuffer::Float($values) => $body,
            ElementBuffer::Double($values) => $body,
            ElementBuffer::CFloat($values) => $body,
            ElementBuffer::CDouble($values) => $body,
            ElementBuffer::Str($values) => $body,
        }
    };
}

/// Apply an expression to the inner vector, keeping the variant
macro_rules! map_buffer {
    ($buffer:expr, $values:ident => $body:expr) => {
        match $buffer {
            ElementBuffer::Bool($values) => ElementBuffer::Bool($body),
            ElementBuffer::Char($values) => ElementBuffer::Char($body),
            ElementBuffer::UChar($values) => ElementBuffer::UChar($body),
            ElementBuffer::Short($values) => ElementBuffer::Short($body),
            ElementBuffer::UShort($values) => ElementBuffer::UShort($body),
            ElementBuffer::Int($values) => ElementBuffer::Int($body),
            ElementBuffer::UInt($values) => ElementBuffer::UInt($body),
            ElementBuffer::LLong($values) => ElementBuffer::LLong($body),
            ElementBuffer::ULLong($values) => ElementBuffer::ULLong($body),
            ElementBuffer::Float($values) => ElementBuffer::Float($body),
            ElementBuffer::Double($values) => ElementBuffer::Double($body),
            ElementBuffer::CFloat($values) => ElementBuffer::CFloat($body),
            ElementBuffer::CDouble($values) => ElementBuffer::CDouble($body),
            ElementBuffer::Str($values) => ElementBuffer::Str($body),
        }
    };
}

impl ElementBuffer {
    /// Default-filled buffer (zeros, `false`, empty strings) for a new object.
    ///
    /// Fails with `InvalidArgument` if the elements cannot be allocated.
    pub fn filled(dtype: &TypeDescriptor, count: usize) -> Result<Self> {
        Ok(match dtype.class() {
            TypeClass::Bool => ElementBuffer::Bool(defaults(count)?),
            TypeClass::Char => ElementBuffer::Char(defaults(count)?),
            TypeClass::UChar => ElementBuffer::UChar(defaults(count)?),
            TypeClass::Short => ElementBuffer::Short(defaults(count)?),
            TypeClass::UShort => ElementBuffer::UShort(defaults(count)?),
            TypeClass::Int => ElementBuffer::Int(defaults(count)?),
            TypeClass::UInt => ElementBuffer::UInt(defaults(count)?),
            TypeClass::LLong => ElementBuffer::LLong(defaults(count)?),
            TypeClass::ULLong => ElementBuffer::ULLong(defaults(count)?),
            TypeClass::Float => ElementBuffer::Float(defaults(count)?),
            TypeClass::Double => ElementBuffer::Double(defaults(count)?),
            TypeClass::CFloat => ElementBuffer::CFloat(defaults(count)?),
            TypeClass::CDouble => ElementBuffer::CDouble(defaults(count)?),
            TypeClass::Str => ElementBuffer::Str(defaults(count)?),
        })
    }

    pub fn class(&self) -> TypeClass {
        match self {
            ElementBuffer::Bool(_) => TypeClass::Bool,
            ElementBuffer::Char(_) => TypeClass::Char,
            ElementBuffer::UChar(_) => TypeClass::UChar,
            ElementBuffer::Short(_) => TypeClass::Short,
            ElementBuffer::UShort(_) => TypeClass::UShort,
            ElementBuffer::Int(_) => TypeClass::Int,
            ElementBuffer::UInt(_) => TypeClass::UInt,
            ElementBuffer::LLong(_) => TypeClass::LLong,
            ElementBuffer::ULLong(_) => TypeClass::ULLong,
            ElementBuffer::Float(_) => TypeClass::Float,
            ElementBuffer::Double(_) => TypeClass::Double,
            ElementBuffer::CFloat(_) => TypeClass::CFloat,
            ElementBuffer::CDouble(_) => TypeClass::CDouble,
            ElementBuffer::Str(_) => TypeClass::Str,
        }
    }

    pub fn len(&self) -> usize {
        with_buffer!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes occupied by the elements under `dtype`.
    /// Variable-length strings count their UTF-8 payload.
    pub fn storage_size(&self, dtype: &TypeDescriptor) -> usize {
        match self {
            ElementBuffer::Str(v) if dtype.is_variable_str() => v.iter().map(String::len).sum(),
            _ => self.len() * dtype.size(),
        }
    }

    /// Validate a buffer about to be stored under `dtype` and `expected` count.
    ///
    /// Fixed-length strings are cut to the element size at a character
    /// boundary, like the library's string conversion does.
    pub(crate) fn conform(self, dtype: &TypeDescriptor, expected: usize) -> Result<Self> {
        if self.class() != dtype.class() {
            return Err(H5Error::TypeMismatch {
                stored: dtype.class(),
                requested: self.class(),
            });
        }
        if self.len() != expected {
            return Err(H5Error::ShapeMismatch {
                expected,
                actual: self.len(),
            });
        }

        Ok(match self {
            ElementBuffer::Str(mut values) if !dtype.is_variable_str() => {
                for value in &mut values {
                    truncate_utf8(value, dtype.size());
                }
                ElementBuffer::Str(values)
            }
            other => other,
        })
    }

    /// Elements at the given flat indices, in index order
    pub(crate) fn gather(&self, indices: &[usize]) -> Self {
        map_buffer!(self, v => indices.iter().map(|&i| v[i].clone()).collect())
    }

    /// Overwrite the elements at `indices` with `values` (same class, same length)
    pub(crate) fn scatter(&mut self, indices: &[usize], values: ElementBuffer) -> Result<()> {
        if indices.len() != values.len() {
            return Err(H5Error::ShapeMismatch {
                expected: indices.len(),
                actual: values.len(),
            });
        }

        fn put<T>(dst: &mut [T], indices: &[usize], src: Vec<T>) {
            for (&i, value) in indices.iter().zip(src) {
                dst[i] = value;
            }
        }

        match (self, values) {
            (ElementBuffer::Bool(d), ElementBuffer::Bool(s)) => put(d, indices, s),
            (ElementBuffer::Char(d), ElementBuffer::Char(s)) => put(d, indices, s),
            (ElementBuffer::UChar(d), ElementBuffer::UChar(s)) => put(d, indices, s),
            (ElementBuffer::Short(d), ElementBuffer::Short(s)) => put(d, indices, s),
            (ElementBuffer::UShort(d), ElementBuffer::UShort(s)) => put(d, indices, s),
            (ElementBuffer::Int(d), ElementBuffer::Int(s)) => put(d, indices, s),
            (ElementBuffer::UInt(d), ElementBuffer::UInt(s)) => put(d, indices, s),
            (ElementBuffer::LLong(d), ElementBuffer::LLong(s)) => put(d, indices, s),
            (ElementBuffer::ULLong(d), ElementBuffer::ULLong(s)) => put(d, indices, s),
            (ElementBuffer::Float(d), ElementBuffer::Float(s)) => put(d, indices, s),
            (ElementBuffer::Double(d), ElementBuffer::Double(s)) => put(d, indices, s),
            (ElementBuffer::CFloat(d), ElementBuffer::CFloat(s)) => put(d, indices, s),
            (ElementBuffer::CDouble(d), ElementBuffer::CDouble(s)) => put(d, indices, s),
            (ElementBuffer::Str(d), ElementBuffer::Str(s)) => put(d, indices, s),
            (dst, src) => {
                return Err(H5Error::TypeMismatch {
                    stored: dst.class(),
                    requested: src.class(),
                })
            }
        }
        Ok(())
    }

    /// Re-lay the buffer from `old_dims` to `new_dims` keeping every element
    /// at its coordinates; cells outside the old extent get the default value
    pub(crate) fn remap(&self, old_dims: &[usize], new_dims: &[usize]) -> Self {
        map_buffer!(self, v => remap_vec(v, old_dims, new_dims))
    }
}

fn defaults<T: Clone + Default>(count: usize) -> Result<Vec<T>> {
    let mut values = Vec::new();
    values.try_reserve_exact(count).map_err(|_| {
        H5Error::invalid_argument(format!("cannot allocate {} elements", count))
    })?;
    values.resize(count, T::default());
    Ok(values)
}

fn remap_vec<T: Clone + Default>(old: &[T], old_dims: &[usize], new_dims: &[usize]) -> Vec<T> {
    let count: usize = new_dims.iter().product();
    let old_strides = row_major_strides(old_dims);
    let mut coord = vec![0usize; new_dims.len()];
    let mut out = Vec::with_capacity(count);

    for _ in 0..count {
        let inside = coord.iter().zip(old_dims).all(|(c, d)| c < d);
        if inside {
            let flat: usize = coord.iter().zip(&old_strides).map(|(c, s)| c * s).sum();
            out.push(old[flat].clone());
        } else {
            out.push(T::default());
        }
        advance(&mut coord, new_dims);
    }
    out
}

/// Row-major strides (in elements) for `dims`
pub(crate) fn row_major_strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1];
    }
    strides
}

/// Step a coordinate to the next cell in row-major order
pub(crate) fn advance(coord: &mut [usize], dims: &[usize]) {
    for axis in (0..coord.len()).rev() {
        coord[axis] += 1;
        if coord[axis] < dims[axis] {
            return;
        }
        coord[axis] = 0;
    }
}

fn truncate_utf8(value: &mut String, max: usize) {
    if value.len() <= max {
        return;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value.truncate(end);
}

// =============================================================================
// Logical-order conversion
// =============================================================================

/// Values accepted by `write`: taken in logical row-major order
pub trait IntoElements {
    fn into_elements(self) -> ElementBuffer;
}

macro_rules! impl_scalar_into_elements {
    ($($ty:ty),*) => {
        $(
            impl IntoElements for $ty {
                fn into_elements(self) -> ElementBuffer {
                    <$ty as Element>::into_buffer(vec![self])
                }
            }
        )*
    };
}

impl_scalar_into_elements!(
    bool, i8, u8, i16, u16, i32, u32, i64, u64, f32, f64, Complex32, Complex64, String
);

impl IntoElements for &str {
    fn into_elements(self) -> ElementBuffer {
        ElementBuffer::Str(vec![self.to_string()])
    }
}

impl IntoElements for &String {
    fn into_elements(self) -> ElementBuffer {
        ElementBuffer::Str(vec![self.clone()])
    }
}

impl<T: Element> IntoElements for Vec<T> {
    fn into_elements(self) -> ElementBuffer {
        T::into_buffer(self)
    }
}

impl<T: Element> IntoElements for &Vec<T> {
    fn into_elements(self) -> ElementBuffer {
        T::into_buffer(self.clone())
    }
}

impl<T: Element> IntoElements for &[T] {
    fn into_elements(self) -> ElementBuffer {
        T::into_buffer(self.to_vec())
    }
}

impl<T: Element, const N: usize> IntoElements for [T; N] {
    fn into_elements(self) -> ElementBuffer {
        T::into_buffer(self.to_vec())
    }
}

impl IntoElements for Vec<&str> {
    fn into_elements(self) -> ElementBuffer {
        ElementBuffer::Str(self.into_iter().map(str::to_string).collect())
    }
}

impl IntoElements for &[&str] {
    fn into_elements(self) -> ElementBuffer {
        ElementBuffer::Str(self.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> IntoElements for [&str; N] {
    fn into_elements(self) -> ElementBuffer {
        ElementBuffer::Str(self.iter().map(|s| s.to_string()).collect())
    }
}

impl<S, D> IntoElements for ArrayBase<S, D>
where
    S: Data,
    S::Elem: Element,
    D: Dimension,
{
    fn into_elements(self) -> ElementBuffer {
        (&self).into_elements()
    }
}

impl<S, D> IntoElements for &ArrayBase<S, D>
where
    S: Data,
    S::Elem: Element,
    D: Dimension,
{
    fn into_elements(self) -> ElementBuffer {
        <S::Elem as Element>::into_buffer(self.iter().cloned().collect())
    }
}

// =============================================================================
// Memory-order conversion
// =============================================================================

/// Values accepted by `write_raw`: the backing memory, copied verbatim
pub trait IntoRawElements {
    fn into_raw_elements(self) -> Result<ElementBuffer>;
}

impl<T: Element> IntoRawElements for Vec<T> {
    fn into_raw_elements(self) -> Result<ElementBuffer> {
        Ok(T::into_buffer(self))
    }
}

impl<T: Element> IntoRawElements for &Vec<T> {
    fn into_raw_elements(self) -> Result<ElementBuffer> {
        Ok(T::into_buffer(self.clone()))
    }
}

impl<T: Element> IntoRawElements for &[T] {
    fn into_raw_elements(self) -> Result<ElementBuffer> {
        Ok(T::into_buffer(self.to_vec()))
    }
}

impl<S, D> IntoRawElements for ArrayBase<S, D>
where
    S: Data,
    S::Elem: Element,
    D: Dimension,
{
    fn into_raw_elements(self) -> Result<ElementBuffer> {
        (&self).into_raw_elements()
    }
}

impl<S, D> IntoRawElements for &ArrayBase<S, D>
where
    S: Data,
    S::Elem: Element,
    D: Dimension,
{
    fn into_raw_elements(self) -> Result<ElementBuffer> {
        let memory = self.as_slice_memory_order().ok_or_else(|| {
            H5Error::invalid_argument("raw write needs a contiguous array")
        })?;
        Ok(<S::Elem as Element>::into_buffer(memory.to_vec()))
    }
}
