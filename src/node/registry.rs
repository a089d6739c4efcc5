//! Open files
//!
//! `FileInner` owns the container of one open file. A process-wide registry
//! maps canonical paths and file numbers to the live files, so that opening
//! a path that is already open shares its handle and `from_id` can find the
//! file behind an id.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{H5Error, Result};
use crate::storage::Container;

use super::batch::Batch;
use super::OpenFlags;

/// Source of process-unique file numbers
static NEXT_FILE_NO: AtomicU64 = AtomicU64::new(1);

static REGISTRY: Mutex<Registry> = parking_lot::const_mutex(Registry::new());

struct Registry {
    /// Canonical path → (file number, file)
    by_path: BTreeMap<PathBuf, (u64, Weak<FileInner>)>,
    by_number: BTreeMap<u64, Weak<FileInner>>,
    /// Files kept open by `get_id(true)` until closed explicitly
    pinned: BTreeMap<u64, Arc<FileInner>>,
}

impl Registry {
    const fn new() -> Self {
        Self {
            by_path: BTreeMap::new(),
            by_number: BTreeMap::new(),
            pinned: BTreeMap::new(),
        }
    }
}

/// Shared state of one open file
pub(crate) struct FileInner {
    pub(crate) file_no: u64,
    /// Canonical path on disk
    pub(crate) path: PathBuf,
    /// Path as the caller gave it
    pub(crate) name: String,
    pub(crate) writable: bool,
    pub(crate) config: Config,
    /// `None` once closed
    container: RwLock<Option<Container>>,
    /// Files opened while following external links from this one
    mounts: Mutex<Vec<Arc<FileInner>>>,
}

impl FileInner {
    /// Open or create the file at `path`, sharing the live handle if the
    /// path is already open
    pub(crate) fn open(path: &Path, flags: OpenFlags, config: Config) -> Result<Arc<Self>> {
        flags.validate()?;
        let canonical = canonical_path(path)?;

        if let Some(live) = lookup_path(&canonical) {
            if flags.contains(OpenFlags::EXCL) {
                return Err(H5Error::already_exists(path.display().to_string()));
            }
            if flags.contains(OpenFlags::TRUNCATE) {
                return Err(H5Error::invalid_argument(format!(
                    "cannot truncate {} while it is open",
                    path.display()
                )));
            }
            if flags.is_writable() && !live.writable {
                return Err(H5Error::invalid_argument(format!(
                    "{} is already open read-only",
                    path.display()
                )));
            }
            debug!(path = %canonical.display(), file_no = live.file_no, "Sharing open file");
            return Ok(live);
        }

        let exists = canonical.exists();
        if flags.contains(OpenFlags::EXCL) && exists {
            return Err(H5Error::already_exists(path.display().to_string()));
        }

        let writable = flags.is_writable();
        let creates = flags.contains(OpenFlags::TRUNCATE)
            || flags.contains(OpenFlags::EXCL)
            || (!exists && flags.contains(OpenFlags::CREATE));

        let container = if creates {
            Container::create(&canonical, config.clone())?
        } else if !exists {
            return Err(missing(path));
        } else {
            Container::open(&canonical, writable, config.clone())?
        };

        let inner = Arc::new(Self {
            file_no: NEXT_FILE_NO.fetch_add(1, Ordering::Relaxed),
            path: canonical,
            name: path.display().to_string(),
            writable,
            config,
            container: RwLock::new(Some(container)),
            mounts: Mutex::new(Vec::new()),
        });

        {
            let mut registry = REGISTRY.lock();
            registry
                .by_path
                .insert(inner.path.clone(), (inner.file_no, Arc::downgrade(&inner)));
            registry
                .by_number
                .insert(inner.file_no, Arc::downgrade(&inner));
        }

        info!(path = %inner.path.display(), file_no = inner.file_no, writable, "Opened file");
        Ok(inner)
    }

    /// Live, open file with the given number
    pub(crate) fn by_number(file_no: u64) -> Option<Arc<Self>> {
        let registry = REGISTRY.lock();
        let pinned = registry.pinned.get(&file_no).cloned();
        let live = registry.by_number.get(&file_no).and_then(Weak::upgrade);
        drop(registry);
        live.or(pinned).filter(|inner| inner.is_open())
    }

    /// Keep this file open until it is closed explicitly
    pub(crate) fn pin(self: &Arc<Self>) {
        let previous = REGISTRY.lock().pinned.insert(self.file_no, Arc::clone(self));
        drop(previous);
    }

    /// Open the target file of an external link: the live handle if there is
    /// one, otherwise a fresh open in this file's mode, kept alive by this file
    pub(crate) fn open_external(&self, file: &str) -> Result<Arc<Self>> {
        let target = self.external_path(file);
        if let Some(live) = canonical_path(&target).ok().and_then(|p| lookup_path(&p)) {
            return Ok(live);
        }

        let flags = if self.writable {
            OpenFlags::READ_WRITE
        } else {
            OpenFlags::READ_ONLY
        };
        let inner = Self::open(&target, flags, self.config.clone())?;
        debug!(from = %self.path.display(), to = %inner.path.display(), "Mounted external file");
        self.mounts.lock().push(Arc::clone(&inner));
        Ok(inner)
    }

    /// External link paths are taken relative to this file's directory
    fn external_path(&self, file: &str) -> PathBuf {
        let target = Path::new(file);
        match self.path.parent() {
            Some(dir) if target.is_relative() => dir.join(target),
            _ => target.to_path_buf(),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.container.read().is_some()
    }

    /// Run `f` against the container under a read lock
    pub(crate) fn read<R>(&self, f: impl FnOnce(&Container) -> Result<R>) -> Result<R> {
        let guard = self.container.read();
        let container = guard.as_ref().ok_or_else(|| self.closed())?;
        f(container)
    }

    /// Run `f` against a batch and commit it as one journal entry
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Batch<'_>) -> Result<R>) -> Result<R> {
        let mut guard = self.container.write();
        let container = guard.as_mut().ok_or_else(|| self.closed())?;
        if !self.writable {
            return Err(H5Error::ReadOnly(self.name.clone()));
        }

        let mut batch = Batch::new(container);
        let out = f(&mut batch)?;
        batch.commit()?;
        Ok(out)
    }

    pub(crate) fn flush(&self) -> Result<()> {
        let mut guard = self.container.write();
        let container = guard.as_mut().ok_or_else(|| self.closed())?;
        container.flush()
    }

    /// Close the container. Handles into this file become invalid.
    pub(crate) fn close(&self) -> Result<()> {
        let container = self.container.write().take();
        let mounts = std::mem::take(&mut *self.mounts.lock());
        let pinned = REGISTRY.lock().pinned.remove(&self.file_no);

        drop(mounts);
        drop(pinned);

        match container {
            Some(container) => {
                info!(path = %self.path.display(), file_no = self.file_no, "Closing file");
                container.close()
            }
            None => Ok(()),
        }
    }

    pub(crate) fn closed(&self) -> H5Error {
        H5Error::InvalidHandle(format!("{} is closed", self.name))
    }
}

impl Drop for FileInner {
    fn drop(&mut self) {
        if let Some(container) = self.container.get_mut().take() {
            if let Err(e) = container.close() {
                error!(path = %self.path.display(), error = %e, "Failed to close file");
            }
        }

        let mut registry = REGISTRY.lock();
        if matches!(registry.by_path.get(&self.path), Some((no, _)) if *no == self.file_no) {
            registry.by_path.remove(&self.path);
        }
        registry.by_number.remove(&self.file_no);
    }
}

fn lookup_path(path: &Path) -> Option<Arc<FileInner>> {
    let live = REGISTRY
        .lock()
        .by_path
        .get(path)
        .and_then(|(_, weak)| weak.upgrade());
    live.filter(|inner| inner.is_open())
}

/// Absolute path with the directory resolved; the file itself may not exist
fn canonical_path(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        H5Error::invalid_argument(format!("{} does not name a file", path.display()))
    })?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.canonicalize()?,
        _ => std::env::current_dir()?,
    };
    Ok(dir.join(name))
}

fn missing(path: &Path) -> H5Error {
    H5Error::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    ))
}
