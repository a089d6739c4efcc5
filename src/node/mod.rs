//! Node Module
//!
//! The object model: files, groups, datasets, attributes and links.
//!
//! ## Handles
//! Every handle is a cheap value holding a weak reference to its file, the
//! address of its object and the path it was reached by. Handles compare by
//! object identity (`ObjectId`), so two paths aliasing one object through
//! hard or soft links yield equal handles. Once the file is closed or
//! dropped every operation fails with `InvalidHandle`.

mod attribute;
mod batch;
mod dataset;
mod file;
mod flags;
mod group;
mod io;
mod link;
mod object;
mod path;
mod registry;
mod resolve;

use std::fmt;

use crate::storage::Address;

pub use attribute::Attribute;
pub use dataset::{DataSet, Selection};
pub use file::File;
pub use flags::OpenFlags;
pub use group::Group;
pub use link::{LinkInfo, Linkable};
pub use object::Object;

/// Kind of object a path or handle refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// The root group seen through a `File` handle
    File,
    Group,
    Dataset,
}

/// Kind of link naming an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    Hard,
    Soft,
    External,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkType::Hard => "hard",
            LinkType::Soft => "soft",
            LinkType::External => "external",
        };
        f.write_str(name)
    }
}

/// Stable identity of an object: file number plus address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    file_no: u64,
    address: Address,
}

impl ObjectId {
    pub(crate) fn new(file_no: u64, address: Address) -> Self {
        Self { file_no, address }
    }

    /// Process-unique number of the open file
    pub fn file_no(&self) -> u64 {
        self.file_no
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_no, self.address)
    }
}

/// Summary of an object's record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectInfo {
    pub address: Address,
    /// Hard links naming the object (the root counts one for the file)
    pub hard_link_count: u32,
    pub attribute_count: usize,
}
