//! Datasets
//!
//! Bulk typed element storage. Elements are stored flat in row-major order
//! of the dataspace.

use std::ops::Deref;

use ndarray::ArrayD;

use crate::error::{H5Error, Result};
use crate::storage::ObjectBody;
use crate::types::{
    Complex32, Complex64, DataSpace, Element, ElementBuffer, IntoElements, IntoRawElements,
    TypeDescriptor,
};

use super::io::{self, typed_readers};
use super::resolve::Location;
use super::{Object, ObjectId, ObjectType};

/// Handle to a dataset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataSet(Object);

impl DataSet {
    pub(crate) fn from_location(loc: &Location) -> Result<Self> {
        match loc.object_type()? {
            ObjectType::Dataset => Ok(Self(Object::from_location(loc))),
            _ => Err(H5Error::invalid_argument(format!(
                "{} is a group, not a dataset",
                loc.path
            ))),
        }
    }

    pub(crate) fn from_object(object: Object) -> Result<Self> {
        Self::from_location(&object.location()?)
    }

    /// Reopen a dataset from an id returned by `get_id`
    pub fn from_id(id: ObjectId) -> Result<Self> {
        Self::from_object(Object::from_id(id)?)
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    pub fn dtype(&self) -> Result<TypeDescriptor> {
        self.with_body(|dtype, _, _| Ok(*dtype))
    }

    pub fn space(&self) -> Result<DataSpace> {
        self.with_body(|_, space, _| Ok(space.clone()))
    }

    pub fn dimensions(&self) -> Result<Vec<usize>> {
        self.with_body(|_, space, _| Ok(space.dims().to_vec()))
    }

    pub fn element_count(&self) -> Result<usize> {
        self.with_body(|_, space, _| Ok(space.element_count()))
    }

    /// Bytes the stored elements occupy
    pub fn storage_size(&self) -> Result<usize> {
        self.with_body(|dtype, _, data| Ok(data.storage_size(dtype)))
    }

    // =========================================================================
    // Whole-dataset I/O
    // =========================================================================

    /// Write `value` in its logical (row-major) element order.
    ///
    /// The element count must match the dataspace; a single string only
    /// fits a one-element dataset.
    pub fn write(&self, value: impl IntoElements) -> Result<()> {
        self.store(value.into_elements())
    }

    /// Write the backing memory of `value` verbatim. A column-major array
    /// lands transposed relative to `write`.
    pub fn write_raw(&self, value: impl IntoRawElements) -> Result<()> {
        self.store(value.into_raw_elements()?)
    }

    /// Read all elements shaped by the dataspace
    pub fn read<T: Element>(&self) -> Result<ArrayD<T>> {
        let (dtype, space, data) = self.load()?;
        io::to_array(&dtype, space.dims(), data)
    }

    /// Read all elements as stored, flat
    pub fn read_raw<T: Element>(&self) -> Result<Vec<T>> {
        let (dtype, _, data) = self.load()?;
        io::to_vec(&dtype, data)
    }

    typed_readers! {
        read_bool => bool,
        read_char => i8,
        read_uchar => u8,
        read_short => i16,
        read_ushort => u16,
        read_int => i32,
        read_uint => u32,
        read_llong => i64,
        read_ullong => u64,
        read_float => f32,
        read_double => f64,
        read_cfloat => Complex32,
        read_cdouble => Complex64,
        read_str => String,
    }

    // =========================================================================
    // Shape changes and partial I/O
    // =========================================================================

    /// Change the current dims of an extensible dataset. Elements keep their
    /// coordinates; new cells are default-valued.
    pub fn resize(&self, dims: &[usize]) -> Result<()> {
        self.update(|_, space, data| {
            let resized = space.resized(dims)?;
            *data = data.remap(space.dims(), resized.dims());
            *space = resized;
            Ok(())
        })
    }

    /// Block of `count` elements per axis starting at `offset`
    pub fn select(&self, offset: &[usize], count: &[usize]) -> Result<Selection> {
        // Fail early on a selection that does not fit
        self.with_body(|_, space, _| space.hyperslab(offset, count).map(|_| ()))?;
        Ok(Selection {
            dataset: self.clone(),
            offset: offset.to_vec(),
            count: count.to_vec(),
        })
    }

    fn with_body<R>(
        &self,
        f: impl FnOnce(&TypeDescriptor, &DataSpace, &ElementBuffer) -> Result<R>,
    ) -> Result<R> {
        let address = self.id().address();
        self.inner()?.read(|container| match &container.record(address)?.body {
            ObjectBody::Dataset { dtype, space, data } => f(dtype, space, data),
            ObjectBody::Group { .. } => Err(self.not_a_dataset()),
        })
    }

    fn load(&self) -> Result<(TypeDescriptor, DataSpace, ElementBuffer)> {
        self.with_body(|dtype, space, data| Ok((*dtype, space.clone(), data.clone())))
    }

    fn update(
        &self,
        f: impl FnOnce(&TypeDescriptor, &mut DataSpace, &mut ElementBuffer) -> Result<()>,
    ) -> Result<()> {
        let address = self.id().address();
        self.inner()?.write(|batch| {
            let mut record = batch.record(address)?;
            match &mut record.body {
                ObjectBody::Dataset { dtype, space, data } => f(dtype, space, data)?,
                ObjectBody::Group { .. } => return Err(self.not_a_dataset()),
            }
            batch.put(record);
            Ok(())
        })
    }

    fn store(&self, values: ElementBuffer) -> Result<()> {
        self.update(|dtype, space, data| {
            *data = io::conform(dtype, space, values)?;
            Ok(())
        })
    }

    fn not_a_dataset(&self) -> H5Error {
        H5Error::invalid_argument(format!("{} is not a dataset", self.path()))
    }
}

impl Deref for DataSet {
    type Target = Object;

    fn deref(&self) -> &Object {
        &self.0
    }
}

/// A rectangular block of a dataset
#[derive(Clone, Debug)]
pub struct Selection {
    dataset: DataSet,
    offset: Vec<usize>,
    count: Vec<usize>,
}

impl Selection {
    pub fn offset(&self) -> &[usize] {
        &self.offset
    }

    pub fn count(&self) -> &[usize] {
        &self.count
    }

    /// Elements of the block, shaped by `count`
    pub fn read<T: Element>(&self) -> Result<ArrayD<T>> {
        let (dtype, block) = self.dataset.with_body(|dtype, space, data| {
            let indices = space.hyperslab(&self.offset, &self.count)?;
            Ok((*dtype, data.gather(&indices)))
        })?;
        io::to_array(&dtype, &self.count, block)
    }

    /// Overwrite the block with `value` in logical order
    pub fn write(&self, value: impl IntoElements) -> Result<()> {
        let values = value.into_elements();
        self.dataset.update(|dtype, space, data| {
            let indices = space.hyperslab(&self.offset, &self.count)?;
            let values = values.conform(dtype, indices.len())?;
            data.scatter(&indices, values)
        })
    }
}
