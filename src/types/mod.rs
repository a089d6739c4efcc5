//! Types Module
//!
//! Element type descriptors, dataspaces and the typed element buffers that
//! datasets and attributes store.
//!
//! ## Responsibilities
//! - Describe atomic element types and their byte layout
//! - Describe the shape of an element grid
//! - Convert caller values into flat element buffers (logical or memory order)
//! - Convert stored buffers back into typed values

mod buffer;
mod dataspace;
mod datatype;

pub use buffer::{ElementBuffer, IntoElements, IntoRawElements};
pub use dataspace::{DataSpace, MAX_ELEMENTS, UNLIMITED};
pub use datatype::{Complex, Complex32, Complex64, Element, TypeClass, TypeDescriptor};
