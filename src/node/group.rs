//! Groups
//!
//! A group holds named links to other objects, in creation order. Every
//! path argument is relative to the group unless it starts with `/`.

use std::ops::Deref;

use crate::error::{H5Error, Result};
use crate::storage::{LinkTarget, ObjectRecord};
use crate::types::{DataSpace, TypeDescriptor};

use super::link::{self, LinkInfo, Linkable};
use super::path::components;
use super::resolve::{self, create_child, ensure_parent, is_absent, Location};
use super::{DataSet, LinkType, Object, ObjectId, ObjectType};

/// Handle to a group
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group(Object);

impl Group {
    pub(crate) fn from_location(loc: &Location) -> Result<Self> {
        match loc.object_type()? {
            ObjectType::Dataset => Err(H5Error::invalid_argument(format!(
                "{} is a dataset, not a group",
                loc.path
            ))),
            _ => Ok(Self(Object::from_location(loc))),
        }
    }

    /// Root group handle, built without touching storage
    pub(crate) fn from_root(object: Object) -> Self {
        Self(object)
    }

    pub(crate) fn from_object(object: Object) -> Result<Self> {
        Self::from_location(&object.location()?)
    }

    /// Reopen a group from an id returned by `get_id`
    pub fn from_id(id: ObjectId) -> Result<Self> {
        Self::from_object(Object::from_id(id)?)
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a group at `path`, creating missing intermediate groups.
    ///
    /// Fails with `AlreadyExists` if `path` is taken.
    pub fn create_group(&self, path: &str) -> Result<Group> {
        let (parent, name) = ensure_parent(&self.location()?, path)?;
        let loc = create_child(&parent, &name, |address| Ok(ObjectRecord::group(address)))?;
        Self::from_location(&loc)
    }

    /// Create a dataset at `path` with the given shape and element type;
    /// elements start out default-valued
    pub fn create_dataset(
        &self,
        path: &str,
        space: impl Into<DataSpace>,
        dtype: TypeDescriptor,
    ) -> Result<DataSet> {
        dtype.validate()?;
        let space = space.into();
        space.validate()?;

        let (parent, name) = ensure_parent(&self.location()?, path)?;
        let loc = create_child(&parent, &name, |address| {
            ObjectRecord::dataset(address, dtype, space)
        })?;
        DataSet::from_location(&loc)
    }

    /// Add a link `name` to `target` and return the object opened through it.
    ///
    /// Hard and soft links must stay inside this file; external links must
    /// leave it.
    pub fn create_link<T: Linkable>(
        &self,
        target: &T,
        name: &str,
        link_type: LinkType,
    ) -> Result<T::Output> {
        let loc = link::create(&self.location()?, target.as_object(), name, link_type)?;
        T::reopen(Object::from_location(&loc))
    }

    /// Remove the link at `path`. The object is reclaimed once its last
    /// hard link is gone.
    pub fn unlink(&self, path: &str) -> Result<()> {
        link::unlink(&self.location()?, path)
    }

    /// Move the link at `src` to `dst`, creating missing groups for `dst`
    pub fn rename(&self, src: &str, dst: &str) -> Result<()> {
        link::rename(&self.location()?, src, dst)
    }

    /// Deep-copy a group or dataset (from any open file) to `name`
    pub fn copy(&self, source: &Object, name: &str) -> Result<Object> {
        let loc = link::copy(&self.location()?, source, name)?;
        Ok(Object::from_location(&loc))
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Open the existing group at `path`
    pub fn get_group(&self, path: &str) -> Result<Group> {
        Self::from_location(&resolve::resolve(&self.location()?, path)?)
    }

    /// Open the existing dataset at `path`
    pub fn get_dataset(&self, path: &str) -> Result<DataSet> {
        DataSet::from_location(&resolve::resolve(&self.location()?, path)?)
    }

    /// Child link names in creation order
    pub fn list_object_names(&self) -> Result<Vec<String>> {
        Ok(self
            .links()?
            .into_iter()
            .map(|link| link.name)
            .collect())
    }

    pub fn number_objects(&self) -> Result<usize> {
        Ok(self.links()?.len())
    }

    /// Name of the `index`-th child in creation order
    pub fn object_name(&self, index: usize) -> Result<String> {
        let links = self.links()?;
        let count = links.len();
        links
            .into_iter()
            .nth(index)
            .map(|link| link.name)
            .ok_or_else(|| {
                H5Error::invalid_argument(format!(
                    "index {} out of range for {} objects",
                    index, count
                ))
            })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn link_type(&self, path: &str) -> Result<LinkType> {
        Ok(self.get_link_info(path)?.link_type)
    }

    pub fn get_link_info(&self, path: &str) -> Result<LinkInfo> {
        link::link_info(&self.location()?, path)
    }

    /// True if `path` leads to an existing object (a dangling soft link
    /// exists but does not resolve)
    pub fn resolved(&self, path: &str) -> Result<bool> {
        match resolve::resolve(&self.location()?, path) {
            Ok(_) => Ok(true),
            Err(e) if is_absent(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn exist_and_resolved(&self, path: &str) -> Result<bool> {
        Ok(self.exist(path)? && self.resolved(path)?)
    }

    /// Type of the object `path` resolves to
    pub fn object_type_of(&self, path: &str) -> Result<ObjectType> {
        resolve::resolve(&self.location()?, path)?.object_type()
    }

    /// True if `path` exists, resolves and is of type `object_type`
    pub fn has_object(&self, path: &str, object_type: ObjectType) -> Result<bool> {
        if components(path).next().is_none() {
            return Ok(matches!(object_type, ObjectType::Group | ObjectType::File));
        }
        if !self.exist_and_resolved(path)? {
            return Ok(false);
        }
        let actual = self.object_type_of(path)?;
        Ok(actual == object_type)
    }

    /// Target path of the soft link at `path`
    pub fn unpack_soft_link(&self, path: &str) -> Result<String> {
        match self.get_link_info(path)?.target {
            LinkTarget::Soft(target) => Ok(target),
            _ => Err(H5Error::invalid_argument(format!("{} is not a soft link", path))),
        }
    }

    /// `(file, path)` of the external link at `path`
    pub fn unpack_external_link(&self, path: &str) -> Result<(String, String)> {
        match self.get_link_info(path)?.target {
            LinkTarget::External { file, path } => Ok((file, path)),
            _ => Err(H5Error::invalid_argument(format!("{} is not an external link", path))),
        }
    }

    fn links(&self) -> Result<Vec<crate::storage::LinkRecord>> {
        let record = self.record()?;
        Ok(record.links().unwrap_or_default().to_vec())
    }
}

impl Deref for Group {
    type Target = Object;

    fn deref(&self) -> &Object {
        &self.0
    }
}
