//! Object records
//!
//! The persisted form of every object in a file: groups, datasets, their
//! attributes and links. Records are addressed by a stable per-file
//! [`Address`] that never changes for the lifetime of the object.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{DataSpace, ElementBuffer, TypeDescriptor};

/// Stable per-file object address
pub type Address = u64;

/// Address of the root group of every file
pub const ROOT_ADDRESS: Address = 1;

/// One stored object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub address: Address,

    pub body: ObjectBody,

    /// Attributes in creation order (names unique)
    pub attributes: Vec<AttributeRecord>,

    /// Number of hard links naming this object (the root counts one for the file)
    pub hard_links: u32,
}

/// Kind-specific payload of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectBody {
    Group {
        /// Child links in creation order (names unique)
        links: Vec<LinkRecord>,
        /// Creation order assigned to the next link
        next_order: u64,
    },
    Dataset {
        dtype: TypeDescriptor,
        space: DataSpace,
        data: ElementBuffer,
    },
}

/// A named edge from a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub name: String,
    pub target: LinkTarget,
    pub creation_order: u64,
}

/// Where a link points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkTarget {
    /// Second name for an object in the same file
    Hard(Address),
    /// Path resolved on every access; may dangle
    Soft(String),
    /// Path inside another file, opened on access
    External { file: String, path: String },
}

/// A named typed value attached to an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub name: String,
    pub dtype: TypeDescriptor,
    pub space: DataSpace,
    pub data: ElementBuffer,
}

impl ObjectRecord {
    /// Empty group record
    pub fn group(address: Address) -> Self {
        Self {
            address,
            body: ObjectBody::Group {
                links: Vec::new(),
                next_order: 0,
            },
            attributes: Vec::new(),
            hard_links: 1,
        }
    }

    /// Default-filled dataset record
    pub fn dataset(address: Address, dtype: TypeDescriptor, space: DataSpace) -> Result<Self> {
        let data = ElementBuffer::filled(&dtype, space.element_count())?;
        Ok(Self {
            address,
            body: ObjectBody::Dataset { dtype, space, data },
            attributes: Vec::new(),
            hard_links: 1,
        })
    }

    pub fn is_group(&self) -> bool {
        matches!(self.body, ObjectBody::Group { .. })
    }

    /// Child links, `None` for datasets
    pub fn links(&self) -> Option<&[LinkRecord]> {
        match &self.body {
            ObjectBody::Group { links, .. } => Some(links),
            ObjectBody::Dataset { .. } => None,
        }
    }

    pub fn find_link(&self, name: &str) -> Option<&LinkRecord> {
        self.links()?.iter().find(|link| link.name == name)
    }

    /// Append a link; the caller has checked that the name is free
    pub fn push_link(&mut self, name: &str, target: LinkTarget) {
        if let ObjectBody::Group { links, next_order } = &mut self.body {
            links.push(LinkRecord {
                name: name.to_string(),
                target,
                creation_order: *next_order,
            });
            *next_order += 1;
        }
    }

    /// Remove and return the named link
    pub fn take_link(&mut self, name: &str) -> Option<LinkRecord> {
        match &mut self.body {
            ObjectBody::Group { links, .. } => {
                let pos = links.iter().position(|link| link.name == name)?;
                Some(links.remove(pos))
            }
            ObjectBody::Dataset { .. } => None,
        }
    }

    pub fn find_attribute(&self, name: &str) -> Option<&AttributeRecord> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn find_attribute_mut(&mut self, name: &str) -> Option<&mut AttributeRecord> {
        self.attributes.iter_mut().find(|attr| attr.name == name)
    }
}
