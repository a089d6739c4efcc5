//! Path resolution
//!
//! Walks a path one link at a time. Soft links resolve relative to the group
//! holding them; external links continue at the root of the foreign file.
//! Every soft or external hop counts against `Config::max_link_depth`.

use std::io;
use std::sync::Arc;

use crate::error::{H5Error, Result};
use crate::storage::{Address, LinkRecord, LinkTarget, ObjectRecord, ROOT_ADDRESS};

use super::path::{components, join};
use super::registry::FileInner;
use super::ObjectType;

/// A resolved object: the file it lives in, its address and the path it
/// was reached by
#[derive(Clone)]
pub(crate) struct Location {
    pub(crate) file: Arc<FileInner>,
    pub(crate) address: Address,
    pub(crate) path: String,
}

impl Location {
    pub(crate) fn root(file: Arc<FileInner>) -> Self {
        Self {
            file,
            address: ROOT_ADDRESS,
            path: "/".to_string(),
        }
    }

    /// The link `name` in this group, `None` if there is no such link
    pub(crate) fn link_record(&self, name: &str) -> Result<Option<LinkRecord>> {
        self.file.read(|container| {
            let record = container.record(self.address)?;
            if !record.is_group() {
                return Err(H5Error::invalid_argument(format!(
                    "{} is not a group",
                    self.path
                )));
            }
            Ok(record.find_link(name).cloned())
        })
    }

    pub(crate) fn child_link(&self, name: &str) -> Result<Option<LinkTarget>> {
        Ok(self.link_record(name)?.map(|link| link.target))
    }

    pub(crate) fn object_type(&self) -> Result<ObjectType> {
        self.file.read(|container| {
            Ok(if container.record(self.address)?.is_group() {
                ObjectType::Group
            } else {
                ObjectType::Dataset
            })
        })
    }
}

/// Resolve `path` from `start`; absolute paths start at the root of
/// `start`'s file
pub(crate) fn resolve(start: &Location, path: &str) -> Result<Location> {
    let mut hops = 0;
    resolve_from(start, path, &mut hops)
}

/// Resolve the parent group of `path` and return it with the final name
pub(crate) fn resolve_parent(start: &Location, path: &str) -> Result<(Location, String)> {
    let (parent, name) = split_last(start, path)?;
    Ok((resolve(start, &parent)?, name))
}

/// Like `resolve`, creating every missing group along the way
pub(crate) fn ensure_group(start: &Location, path: &str) -> Result<Location> {
    let mut hops = 0;
    let mut loc = origin(start, path);

    for name in components(path) {
        loc = match loc.child_link(name)? {
            Some(target) => {
                let child_path = join(&loc.path, name);
                let next = follow(&loc, &child_path, target, &mut hops)?;
                if next.object_type()? != ObjectType::Group {
                    return Err(H5Error::invalid_argument(format!(
                        "{} is not a group",
                        child_path
                    )));
                }
                next
            }
            None => create_child(&loc, name, |address| Ok(ObjectRecord::group(address)))?,
        };
    }
    Ok(loc)
}

/// Parent of `path` (created if missing) and the final name
pub(crate) fn ensure_parent(start: &Location, path: &str) -> Result<(Location, String)> {
    let (parent, name) = split_last(start, path)?;
    Ok((ensure_group(start, &parent)?, name))
}

/// Deepest existing group on the way to the parent of `path`: where
/// `ensure_parent` would start creating groups. Nothing is created.
pub(crate) fn existing_parent(start: &Location, path: &str) -> Result<Location> {
    let (parent, _) = split_last(start, path)?;
    let mut hops = 0;
    let mut loc = origin(start, &parent);

    for name in components(&parent) {
        let Some(target) = loc.child_link(name)? else {
            break;
        };
        let child_path = join(&loc.path, name);
        loc = follow(&loc, &child_path, target, &mut hops)?;
    }
    Ok(loc)
}

/// Add a new object under `parent` with a hard link `name`
pub(crate) fn create_child(
    parent: &Location,
    name: &str,
    make: impl FnOnce(Address) -> Result<ObjectRecord>,
) -> Result<Location> {
    let child_path = join(&parent.path, name);

    let address = parent.file.write(|batch| {
        let mut group = batch.record(parent.address)?;
        if !group.is_group() {
            return Err(H5Error::invalid_argument(format!(
                "{} is not a group",
                parent.path
            )));
        }
        if group.find_link(name).is_some() {
            return Err(H5Error::already_exists(child_path.clone()));
        }

        let address = batch.allocate()?;
        group.push_link(name, LinkTarget::Hard(address));
        batch.put(make(address)?);
        batch.put(group);
        Ok(address)
    })?;

    Ok(Location {
        file: Arc::clone(&parent.file),
        address,
        path: child_path,
    })
}

/// True for errors that mean "nothing usable at that path"
pub(crate) fn is_absent(err: &H5Error) -> bool {
    match err {
        H5Error::NotFound(_) | H5Error::InvalidArgument(_) => true,
        H5Error::Io(e) => e.kind() == io::ErrorKind::NotFound,
        _ => false,
    }
}

fn resolve_from(start: &Location, path: &str, hops: &mut usize) -> Result<Location> {
    let mut loc = origin(start, path);
    for name in components(path) {
        let target = loc
            .child_link(name)?
            .ok_or_else(|| H5Error::not_found(join(&loc.path, name)))?;
        let child_path = join(&loc.path, name);
        loc = follow(&loc, &child_path, target, hops)?;
    }
    Ok(loc)
}

/// Cross the link `target` found in `parent` under `child_path`
fn follow(
    parent: &Location,
    child_path: &str,
    target: LinkTarget,
    hops: &mut usize,
) -> Result<Location> {
    match target {
        LinkTarget::Hard(address) => Ok(Location {
            file: Arc::clone(&parent.file),
            address,
            path: child_path.to_string(),
        }),
        LinkTarget::Soft(target) => {
            count_hop(parent, child_path, hops)?;
            let mut resolved = resolve_from(parent, &target, hops)?;
            // Same-file targets keep the path they were reached by
            if Arc::ptr_eq(&resolved.file, &parent.file) {
                resolved.path = child_path.to_string();
            }
            Ok(resolved)
        }
        LinkTarget::External { file, path } => {
            count_hop(parent, child_path, hops)?;
            let foreign = parent.file.open_external(&file)?;
            resolve_from(&Location::root(foreign), &path, hops)
        }
    }
}

fn count_hop(parent: &Location, child_path: &str, hops: &mut usize) -> Result<()> {
    *hops += 1;
    if *hops > parent.file.config.max_link_depth {
        return Err(H5Error::not_found(format!(
            "{}: more than {} levels of links",
            child_path, parent.file.config.max_link_depth
        )));
    }
    Ok(())
}

fn origin(start: &Location, path: &str) -> Location {
    if path.starts_with('/') {
        Location::root(Arc::clone(&start.file))
    } else {
        start.clone()
    }
}

/// Split `path` into its parent (absolute or relative, as given) and the
/// final name; the root has no name
fn split_last(start: &Location, path: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = components(path).collect();
    let (name, dirs) = parts.split_last().ok_or_else(|| {
        H5Error::invalid_argument(format!("{} names no object below {}", path, start.path))
    })?;

    let mut parent = dirs.join("/");
    if path.starts_with('/') {
        parent.insert(0, '/');
    }
    Ok((parent, name.to_string()))
}
