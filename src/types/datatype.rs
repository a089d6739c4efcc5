//! Type descriptors
//!
//! Atomic element types and their byte layout.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ElementBuffer;
use crate::error::{H5Error, Result};

/// Width reported for variable-length strings (pointer + length)
const VARIABLE_STR_SIZE: usize = 16;

/// Class of an atomic element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeClass {
    /// Boolean stored as one byte
    Bool,
    /// 8-bit signed integer
    Char,
    /// 8-bit unsigned integer
    UChar,
    /// 16-bit signed integer
    Short,
    /// 16-bit unsigned integer
    UShort,
    /// 32-bit signed integer
    Int,
    /// 32-bit unsigned integer
    UInt,
    /// 64-bit signed integer
    LLong,
    /// 64-bit unsigned integer
    ULLong,
    /// 32-bit IEEE float
    Float,
    /// 64-bit IEEE float
    Double,
    /// Complex number made of two 32-bit floats
    CFloat,
    /// Complex number made of two 64-bit floats
    CDouble,
    /// String, variable or fixed length
    Str,
}

impl TypeClass {
    /// Element size in bytes; `None` for strings, whose size is declared
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            TypeClass::Bool | TypeClass::Char | TypeClass::UChar => Some(1),
            TypeClass::Short | TypeClass::UShort => Some(2),
            TypeClass::Int | TypeClass::UInt | TypeClass::Float => Some(4),
            TypeClass::LLong | TypeClass::ULLong | TypeClass::Double | TypeClass::CFloat => {
                Some(8)
            }
            TypeClass::CDouble => Some(16),
            TypeClass::Str => None,
        }
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeClass::Bool => "Bool",
            TypeClass::Char => "Char",
            TypeClass::UChar => "UChar",
            TypeClass::Short => "Short",
            TypeClass::UShort => "UShort",
            TypeClass::Int => "Int",
            TypeClass::UInt => "UInt",
            TypeClass::LLong => "LLong",
            TypeClass::ULLong => "ULLong",
            TypeClass::Float => "Float",
            TypeClass::Double => "Double",
            TypeClass::CFloat => "CFloat",
            TypeClass::CDouble => "CDouble",
            TypeClass::Str => "Str",
        };
        f.write_str(name)
    }
}

/// Describes an atomic element type and its byte layout.
///
/// Immutable once built; datasets and attributes keep the descriptor they
/// were declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    class: TypeClass,
    size: usize,
    variable: bool,
}

impl TypeDescriptor {
    /// Build a descriptor from a class and element size.
    ///
    /// A `Str` built this way is fixed-length with `size` bytes per element.
    /// Use [`TypeDescriptor::validate`] (called by every create operation) to
    /// reject inconsistent sizes.
    pub const fn new(class: TypeClass, size: usize) -> Self {
        Self {
            class,
            size,
            variable: false,
        }
    }

    pub const fn bool() -> Self {
        Self::new(TypeClass::Bool, 1)
    }

    pub const fn char() -> Self {
        Self::new(TypeClass::Char, 1)
    }

    pub const fn uchar() -> Self {
        Self::new(TypeClass::UChar, 1)
    }

    pub const fn short() -> Self {
        Self::new(TypeClass::Short, 2)
    }

    pub const fn ushort() -> Self {
        Self::new(TypeClass::UShort, 2)
    }

    pub const fn int() -> Self {
        Self::new(TypeClass::Int, 4)
    }

    pub const fn uint() -> Self {
        Self::new(TypeClass::UInt, 4)
    }

    /// 64-bit signed integer (C `long` on LP64 and `long long`)
    pub const fn llong() -> Self {
        Self::new(TypeClass::LLong, 8)
    }

    pub const fn ullong() -> Self {
        Self::new(TypeClass::ULLong, 8)
    }

    pub const fn float() -> Self {
        Self::new(TypeClass::Float, 4)
    }

    pub const fn double() -> Self {
        Self::new(TypeClass::Double, 8)
    }

    pub const fn cfloat() -> Self {
        Self::new(TypeClass::CFloat, 8)
    }

    pub const fn cdouble() -> Self {
        Self::new(TypeClass::CDouble, 16)
    }

    /// Variable-length UTF-8 string
    pub fn str() -> Self {
        Self {
            class: TypeClass::Str,
            size: VARIABLE_STR_SIZE,
            variable: true,
        }
    }

    /// Fixed-length string of `len` bytes per element
    pub fn fixed_str(len: usize) -> Self {
        Self::new(TypeClass::Str, len)
    }

    /// Descriptor matching a Rust element type
    pub fn of<T: Element>() -> Self {
        match T::CLASS.fixed_size() {
            Some(size) => Self::new(T::CLASS, size),
            None => Self::str(),
        }
    }

    pub fn class(&self) -> TypeClass {
        self.class
    }

    /// Size in bytes of one element
    pub fn size(&self) -> usize {
        self.size
    }

    /// True for variable-length strings
    pub fn is_variable_str(&self) -> bool {
        self.variable
    }

    /// Check that the element size is one the class supports
    pub fn validate(&self) -> Result<()> {
        match self.class.fixed_size() {
            Some(size) if size != self.size => Err(H5Error::InvalidType(format!(
                "{} elements are {} bytes, descriptor says {}",
                self.class, size, self.size
            ))),
            None if !self.variable && self.size == 0 => Err(H5Error::InvalidType(
                "fixed-length string of zero bytes".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.class, self.variable) {
            (TypeClass::Str, true) => f.write_str("Str(variable)"),
            (TypeClass::Str, false) => write!(f, "Str({})", self.size),
            (class, _) => write!(f, "{}{}", class, self.size * 8),
        }
    }
}

// =============================================================================
// Complex numbers
// =============================================================================

/// Complex number stored as two floats of the same width
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

/// Complex number made of two 32-bit floats
pub type Complex32 = Complex<f32>;

/// Complex number made of two 64-bit floats
pub type Complex64 = Complex<f64>;

impl<T> Complex<T> {
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

impl<T> From<(T, T)> for Complex<T> {
    fn from((re, im): (T, T)) -> Self {
        Self { re, im }
    }
}

// =============================================================================
// Element trait
// =============================================================================

/// A Rust type that maps onto one [`TypeClass`]
pub trait Element: Clone + Default + Sized {
    const CLASS: TypeClass;

    /// Wrap a flat vector of elements
    fn into_buffer(values: Vec<Self>) -> ElementBuffer;

    /// Unwrap a buffer of the matching class, `None` otherwise
    fn from_buffer(buffer: ElementBuffer) -> Option<Vec<Self>>;
}

macro_rules! impl_element {
    ($ty:ty, $class:ident) => {
        impl Element for $ty {
            const CLASS: TypeClass = TypeClass::$class;

            fn into_buffer(values: Vec<Self>) -> ElementBuffer {
                ElementBuffer::$class(values)
            }

            fn from_buffer(buffer: ElementBuffer) -> Option<Vec<Self>> {
                match buffer {
                    ElementBuffer::$class(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(bool, Bool);
impl_element!(i8, Char);
impl_element!(u8, UChar);
impl_element!(i16, Short);
impl_element!(u16, UShort);
impl_element!(i32, Int);
impl_element!(u32, UInt);
impl_element!(i64, LLong);
impl_element!(u64, ULLong);
impl_element!(f32, Float);
impl_element!(f64, Double);
impl_element!(Complex32, CFloat);
impl_element!(Complex64, CDouble);
impl_element!(String, Str);
