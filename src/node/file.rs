//! Files
//!
//! A `File` is the root group plus the lifecycle of the storage behind it.
//! Handles to the same open file are shared: opening a path that is already
//! open returns a handle equal to the existing one.

use std::fmt;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;

use super::registry::FileInner;
use super::resolve::Location;
use super::{Group, Object, ObjectType, OpenFlags};

/// An open file
#[derive(Clone)]
pub struct File {
    inner: Arc<FileInner>,
    root: Group,
}

impl File {
    /// Open `path` with the default configuration
    pub fn open(path: impl AsRef<Path>, flags: OpenFlags) -> Result<Self> {
        Self::open_with_config(path, flags, Config::default())
    }

    /// Open `path`. The configuration applies only if this call opens the
    /// storage; a shared handle keeps the configuration it was opened with.
    pub fn open_with_config(path: impl AsRef<Path>, flags: OpenFlags, config: Config) -> Result<Self> {
        let inner = FileInner::open(path.as_ref(), flags, config)?;
        Ok(Self::from_inner(inner))
    }

    /// Create `path`, discarding any existing contents
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(
            path,
            OpenFlags::READ_WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
        )
    }

    pub(crate) fn from_inner(inner: Arc<FileInner>) -> Self {
        let root = Group::from_root(Object::from_location(&Location::root(Arc::clone(&inner))));
        Self { inner, root }
    }

    /// Always `ObjectType::File` for a file handle
    pub fn object_type(&self) -> Result<ObjectType> {
        self.root.location()?;
        Ok(ObjectType::File)
    }

    /// Checkpoint and release the storage. Every handle into the file
    /// becomes invalid, including other `File` handles sharing it.
    pub fn close(&self) -> Result<()> {
        self.inner.close()
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    pub fn is_read_only(&self) -> bool {
        !self.inner.writable
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Canonical path of the storage on disk
    pub fn disk_path(&self) -> &Path {
        &self.inner.path
    }

    /// Process-unique number of this open file
    pub fn file_no(&self) -> u64 {
        self.inner.file_no
    }
}

impl Deref for File {
    type Target = Group;

    fn deref(&self) -> &Group {
        &self.root
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.inner.file_no == other.inner.file_no
    }
}

impl Eq for File {}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("name", &self.inner.name)
            .field("file_no", &self.inner.file_no)
            .field("writable", &self.inner.writable)
            .field("open", &self.is_open())
            .finish()
    }
}
