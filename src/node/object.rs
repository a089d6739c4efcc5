//! Object handles
//!
//! `Object` is the part every node shares: identity, path and the way back
//! to the owning file.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::{H5Error, Result};
use crate::storage::{Address, Container, LinkTarget, ObjectRecord, ROOT_ADDRESS};

use super::link::{self, LinkInfo};
use super::path::{components, join, split_parent};
use super::registry::FileInner;
use super::resolve::{self, is_absent, Location};
use super::{File, Group, ObjectId, ObjectInfo, ObjectType};

/// Handle to any object in a file
#[derive(Clone)]
pub struct Object {
    file: Weak<FileInner>,
    file_no: u64,
    address: Address,
    path: String,
}

impl Object {
    pub(crate) fn from_location(loc: &Location) -> Self {
        Self {
            file: Arc::downgrade(&loc.file),
            file_no: loc.file.file_no,
            address: loc.address,
            path: loc.path.clone(),
        }
    }

    /// Handle for an id from `get_id`
    pub(crate) fn from_id(id: ObjectId) -> Result<Self> {
        let inner = FileInner::by_number(id.file_no())
            .ok_or_else(|| H5Error::InvalidHandle(format!("no open file for id {}", id)))?;

        let path = inner.read(|container| {
            if !container.contains(id.address()) {
                return Err(H5Error::InvalidHandle(format!("no object for id {}", id)));
            }
            Ok(find_path(container, id.address()))
        })?;

        Ok(Self::from_location(&Location {
            address: id.address(),
            path: path.unwrap_or_else(|| "/".to_string()),
            file: inner,
        }))
    }

    /// The owning file, if it is still open
    pub(crate) fn inner(&self) -> Result<Arc<FileInner>> {
        self.file
            .upgrade()
            .filter(|inner| inner.is_open())
            .ok_or_else(|| H5Error::InvalidHandle(format!("file of {} is closed", self.path)))
    }

    /// Where this handle points, checked to still exist
    pub(crate) fn location(&self) -> Result<Location> {
        let inner = self.inner()?;
        if !inner.read(|container| Ok(container.contains(self.address)))? {
            return Err(H5Error::InvalidHandle(format!("{} no longer exists", self.path)));
        }
        Ok(Location {
            file: inner,
            address: self.address,
            path: self.path.clone(),
        })
    }

    /// Copy of this object's record
    pub(crate) fn record(&self) -> Result<ObjectRecord> {
        self.inner()?.read(|container| {
            container
                .get(self.address)
                .cloned()
                .ok_or_else(|| H5Error::InvalidHandle(format!("{} no longer exists", self.path)))
        })
    }

    /// Absolute path this handle was opened by
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn id(&self) -> ObjectId {
        ObjectId::new(self.file_no, self.address)
    }

    /// Identifier usable with `DataSet::from_id` / `Group::from_id`.
    ///
    /// With `retain` the file stays open for the id even after every `File`
    /// handle is dropped, until the file is closed explicitly.
    pub fn get_id(&self, retain: bool) -> Result<ObjectId> {
        let inner = self.inner()?;
        if retain {
            inner.pin();
        }
        Ok(self.id())
    }

    /// True while the file is open and the object exists
    pub fn is_valid(&self) -> bool {
        self.location().is_ok()
    }

    /// True if a link exists at `path` (relative to this object or
    /// absolute). A dangling soft link exists; `"/"` always exists.
    pub fn exist(&self, path: &str) -> Result<bool> {
        let start = self.location()?;
        if components(path).next().is_none() {
            return Ok(true);
        }

        let (parent, name) = match resolve::resolve_parent(&start, path) {
            Ok(found) => found,
            Err(e) if is_absent(&e) => return Ok(false),
            Err(e) => return Err(e),
        };
        match parent.child_link(&name) {
            Ok(link) => Ok(link.is_some()),
            Err(e) if is_absent(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn object_type(&self) -> Result<ObjectType> {
        self.location()?.object_type()
    }

    pub fn info(&self) -> Result<ObjectInfo> {
        let record = self.record()?;
        Ok(ObjectInfo {
            address: record.address,
            hard_link_count: record.hard_links,
            attribute_count: record.attributes.len(),
        })
    }

    /// Handle to the file holding this object
    pub fn file(&self) -> Result<File> {
        Ok(File::from_inner(self.inner()?))
    }

    /// Name the holding file was opened with
    pub fn file_name(&self) -> Result<String> {
        Ok(self.inner()?.name.clone())
    }

    /// Force the file's journal to disk
    pub fn flush(&self) -> Result<()> {
        self.inner()?.flush()
    }

    /// The link this handle's path ends in
    pub fn link_info(&self) -> Result<LinkInfo> {
        let root = Location::root(self.inner()?);
        link::link_info(&root, &self.path)
    }

    /// A path to this object that crosses hard links only
    pub fn target_path(&self) -> Result<String> {
        let address = self.address;
        self.inner()?.read(|container| {
            find_path(container, address)
                .ok_or_else(|| H5Error::not_found(format!("no hard-link path to {}", self.path)))
        })
    }

    /// Group holding the link this handle's path ends in
    pub fn parent(&self) -> Result<Group> {
        let (parent, _) = split_parent(&self.path).ok_or_else(|| {
            H5Error::invalid_argument("the root group has no parent")
        })?;
        let root = Location::root(self.inner()?);
        Group::from_location(&resolve::resolve(&root, parent)?)
    }

    /// Remove the link this handle's path ends in
    pub fn remove(&self) -> Result<()> {
        let root = Location::root(self.inner()?);
        link::unlink(&root, &self.path)
    }

    /// Move the link this handle's path ends in to `dest` (relative to the
    /// parent group, or absolute)
    pub fn move_to(&self, dest: &str) -> Result<()> {
        let (parent, _) = split_parent(&self.path).ok_or_else(|| {
            H5Error::invalid_argument("the root group cannot be moved")
        })?;
        let root = Location::root(self.inner()?);
        link::rename(&root, &self.path, &join(parent, dest))
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Object {}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("path", &self.path)
            .field("id", &self.id())
            .finish()
    }
}

/// First hard-link path from the root to `target`, breadth first in
/// creation order
pub(crate) fn find_path(container: &Container, target: Address) -> Option<String> {
    let mut queue = VecDeque::from([(ROOT_ADDRESS, "/".to_string())]);
    let mut seen = BTreeSet::new();

    while let Some((address, path)) = queue.pop_front() {
        if address == target {
            return Some(path);
        }
        if !seen.insert(address) {
            continue;
        }
        let Some(links) = container.get(address).and_then(ObjectRecord::links) else {
            continue;
        };
        for link in links {
            if let LinkTarget::Hard(child) = link.target {
                queue.push_back((child, join(&path, &link.name)));
            }
        }
    }
    None
}
