//! Attributes
//!
//! Small named values attached to a group, dataset or file root.

use ndarray::ArrayD;

use crate::error::{H5Error, Result};
use crate::storage::AttributeRecord;
use crate::types::{
    Complex32, Complex64, DataSpace, Element, ElementBuffer, IntoElements, IntoRawElements,
    TypeDescriptor,
};

use super::io::{self, typed_readers};
use super::Object;

/// Handle to one attribute of an object
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    owner: Object,
    name: String,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Object the attribute is attached to
    pub fn owner(&self) -> &Object {
        &self.owner
    }

    pub fn dtype(&self) -> Result<TypeDescriptor> {
        Ok(self.load()?.dtype)
    }

    pub fn space(&self) -> Result<DataSpace> {
        Ok(self.load()?.space)
    }

    /// Bytes the stored elements occupy
    pub fn storage_size(&self) -> Result<usize> {
        let record = self.load()?;
        Ok(record.data.storage_size(&record.dtype))
    }

    /// Write `value` in its logical (row-major) element order
    pub fn write(&self, value: impl IntoElements) -> Result<()> {
        self.store(value.into_elements())
    }

    /// Write the backing memory of `value` verbatim
    pub fn write_raw(&self, value: impl IntoRawElements) -> Result<()> {
        self.store(value.into_raw_elements()?)
    }

    /// Read all elements shaped by the dataspace
    pub fn read<T: Element>(&self) -> Result<ArrayD<T>> {
        let record = self.load()?;
        io::to_array(&record.dtype, record.space.dims(), record.data)
    }

    /// Read all elements as stored, flat
    pub fn read_raw<T: Element>(&self) -> Result<Vec<T>> {
        let record = self.load()?;
        io::to_vec(&record.dtype, record.data)
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

    fn load(&self) -> Result<AttributeRecord> {
        self.owner
            .record()?
            .find_attribute(&self.name)
            .cloned()
            .ok_or_else(|| self.missing())
    }

    fn store(&self, data: ElementBuffer) -> Result<()> {
        let address = self.owner.id().address();
        self.owner.inner()?.write(|batch| {
            let mut record = batch.record(address)?;
            let attr = record
                .find_attribute_mut(&self.name)
                .ok_or_else(|| self.missing())?;
            attr.data = io::conform(&attr.dtype, &attr.space, data)?;
            batch.put(record);
            Ok(())
        })
    }

    fn missing(&self) -> H5Error {
        H5Error::not_found(format!("attribute {} of {}", self.name, self.owner.path()))
    }
}

impl Object {
    /// Attach a new attribute; elements start out default-valued
    pub fn create_attribute(
        &self,
        name: &str,
        space: impl Into<DataSpace>,
        dtype: TypeDescriptor,
    ) -> Result<Attribute> {
        dtype.validate()?;
        if name.is_empty() {
            return Err(H5Error::invalid_argument("attribute name is empty"));
        }
        let space = space.into();
        space.validate()?;
        let address = self.id().address();

        self.inner()?.write(|batch| {
            let mut record = batch.record(address)?;
            if record.find_attribute(name).is_some() {
                return Err(H5Error::already_exists(format!(
                    "attribute {} of {}",
                    name,
                    self.path()
                )));
            }
            record.attributes.push(AttributeRecord {
                name: name.to_string(),
                data: ElementBuffer::filled(&dtype, space.element_count())?,
                dtype,
                space,
            });
            batch.put(record);
            Ok(())
        })?;

        Ok(self.attribute_handle(name))
    }

    pub fn get_attribute(&self, name: &str) -> Result<Attribute> {
        if !self.has_attribute(name)? {
            return Err(H5Error::not_found(format!(
                "attribute {} of {}",
                name,
                self.path()
            )));
        }
        Ok(self.attribute_handle(name))
    }

    pub fn has_attribute(&self, name: &str) -> Result<bool> {
        Ok(self.record()?.find_attribute(name).is_some())
    }

    pub fn delete_attribute(&self, name: &str) -> Result<()> {
        let address = self.id().address();
        self.inner()?.write(|batch| {
            let mut record = batch.record(address)?;
            let before = record.attributes.len();
            record.attributes.retain(|attr| attr.name != name);
            if record.attributes.len() == before {
                return Err(H5Error::not_found(format!(
                    "attribute {} of {}",
                    name,
                    self.path()
                )));
            }
            batch.put(record);
            Ok(())
        })
    }

    /// Attribute names in creation order
    pub fn list_attribute_names(&self) -> Result<Vec<String>> {
        Ok(self
            .record()?
            .attributes
            .into_iter()
            .map(|attr| attr.name)
            .collect())
    }

    pub fn number_attributes(&self) -> Result<usize> {
        Ok(self.record()?.attributes.len())
    }

    fn attribute_handle(&self, name: &str) -> Attribute {
        Attribute {
            owner: self.clone(),
            name: name.to_string(),
        }
    }
}
