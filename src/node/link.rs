//! Links
//!
//! Creating, inspecting, removing, moving and copying the named edges
//! between groups and objects. Removing the last hard link to an object
//! reclaims it, along with everything only it kept alive.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{H5Error, Result};
use crate::storage::{Address, LinkRecord, LinkTarget, ObjectBody, ObjectRecord};

use super::batch::Batch;
use super::path::{components, is_descendant, join};
use super::resolve::{self, ensure_parent, existing_parent, resolve_parent, Location};
use super::{DataSet, File, Group, LinkType, Object};

/// Description of one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub name: String,
    pub link_type: LinkType,
    /// Position in the parent's creation order
    pub creation_order: u64,
    pub target: LinkTarget,
}

impl LinkInfo {
    fn from_record(link: LinkRecord) -> Self {
        let link_type = match link.target {
            LinkTarget::Hard(_) => LinkType::Hard,
            LinkTarget::Soft(_) => LinkType::Soft,
            LinkTarget::External { .. } => LinkType::External,
        };
        Self {
            name: link.name,
            link_type,
            creation_order: link.creation_order,
            target: link.target,
        }
    }
}

/// Nodes that can be the target of `Group::create_link`
pub trait Linkable {
    /// Handle type returned for the new link
    type Output;

    fn as_object(&self) -> &Object;

    /// Open the object behind a freshly created link
    fn reopen(object: Object) -> Result<Self::Output>;
}

impl Linkable for File {
    type Output = Group;

    fn as_object(&self) -> &Object {
        self
    }

    fn reopen(object: Object) -> Result<Group> {
        Group::from_object(object)
    }
}

impl Linkable for Group {
    type Output = Group;

    fn as_object(&self) -> &Object {
        self
    }

    fn reopen(object: Object) -> Result<Group> {
        Group::from_object(object)
    }
}

impl Linkable for DataSet {
    type Output = DataSet;

    fn as_object(&self) -> &Object {
        self
    }

    fn reopen(object: Object) -> Result<DataSet> {
        DataSet::from_object(object)
    }
}

/// Info on the link `path` ends in; the root reports a hard link
pub(crate) fn link_info(start: &Location, path: &str) -> Result<LinkInfo> {
    if components(path).next().is_none() {
        if path.starts_with('/') || start.path == "/" {
            return Ok(LinkInfo {
                name: "/".to_string(),
                link_type: LinkType::Hard,
                creation_order: 0,
                target: LinkTarget::Hard(start.address),
            });
        }
        return link_info(&Location::root(Arc::clone(&start.file)), &start.path);
    }

    let (parent, name) = resolve_parent(start, path)?;
    let link = parent
        .link_record(&name)?
        .ok_or_else(|| H5Error::not_found(join(&parent.path, &name)))?;
    Ok(LinkInfo::from_record(link))
}

/// Add a link `name` under `group` pointing at `target`; returns where the
/// new link leads
pub(crate) fn create(
    group: &Location,
    target: &Object,
    name: &str,
    link_type: LinkType,
) -> Result<Location> {
    let target = target.location()?;
    // Decide on the link before any missing group gets created
    let landing = existing_parent(group, name)?;
    let same_file = Arc::ptr_eq(&landing.file, &target.file);

    let link_target = match link_type {
        LinkType::Hard | LinkType::Soft if !same_file => {
            return Err(H5Error::invalid_argument(format!(
                "{} links cannot point into another file",
                link_type
            )))
        }
        LinkType::External if same_file => {
            return Err(H5Error::invalid_argument(
                "external link target must live in another file",
            ))
        }
        LinkType::Hard => LinkTarget::Hard(target.address),
        LinkType::Soft => LinkTarget::Soft(target.path.clone()),
        LinkType::External => LinkTarget::External {
            file: target.file.path.display().to_string(),
            path: target.path.clone(),
        },
    };

    let (parent, link_name) = ensure_parent(group, name)?;

    let link_path = join(&parent.path, &link_name);
    parent.file.write(|batch| {
        let mut group = batch.record(parent.address)?;
        if !group.is_group() {
            return Err(H5Error::invalid_argument(format!("{} is not a group", parent.path)));
        }
        if group.find_link(&link_name).is_some() {
            return Err(H5Error::already_exists(link_path.clone()));
        }
        group.push_link(&link_name, link_target.clone());

        match link_target {
            // A group linking to itself
            LinkTarget::Hard(address) if address == parent.address => group.hard_links += 1,
            LinkTarget::Hard(address) => {
                let mut record = batch.record(address)?;
                record.hard_links += 1;
                batch.put(record);
            }
            _ => {}
        }
        batch.put(group);
        Ok(())
    })?;

    resolve::resolve(&parent, &link_name)
}

/// Remove the link `path` ends in
pub(crate) fn unlink(start: &Location, path: &str) -> Result<()> {
    let (parent, name) = resolve_parent(start, path)?;

    parent.file.write(|batch| {
        let mut group = batch.record(parent.address)?;
        if !group.is_group() {
            return Err(H5Error::invalid_argument(format!("{} is not a group", parent.path)));
        }
        let link = group
            .take_link(&name)
            .ok_or_else(|| H5Error::not_found(join(&parent.path, &name)))?;
        batch.put(group);

        if let LinkTarget::Hard(address) = link.target {
            release(batch, address)?;
        }
        Ok(())
    })
}

/// Drop one hard reference to `address`, reclaiming objects whose count
/// reaches zero together with their children
fn release(batch: &mut Batch<'_>, address: Address) -> Result<()> {
    let mut pending = vec![address];

    while let Some(address) = pending.pop() {
        let mut record = match batch.record(address) {
            Ok(record) => record,
            // Already reclaimed further up this cascade
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e),
        };

        record.hard_links = record.hard_links.saturating_sub(1);
        if record.hard_links > 0 {
            batch.put(record);
            continue;
        }

        batch.delete(address);
        for link in record.links().unwrap_or_default() {
            if let LinkTarget::Hard(child) = link.target {
                pending.push(child);
            }
        }
    }
    Ok(())
}

/// Move the link at `src` to `dst` within one file
pub(crate) fn rename(start: &Location, src: &str, dst: &str) -> Result<()> {
    let src_path = join(&start.path, src);
    let dst_path = join(&start.path, dst);
    if is_descendant(&dst_path, &src_path) {
        return Err(H5Error::invalid_argument(format!(
            "cannot move {} inside itself ({})",
            src_path, dst_path
        )));
    }

    let (src_parent, src_name) = resolve_parent(start, src)?;
    if src_parent.child_link(&src_name)?.is_none() {
        return Err(H5Error::not_found(src_path));
    }
    check_free(start, dst)?;
    if !Arc::ptr_eq(&src_parent.file, &existing_parent(start, dst)?.file) {
        return Err(H5Error::invalid_argument("cannot move a link into another file"));
    }

    let (dst_parent, dst_name) = ensure_parent(start, dst)?;

    src_parent.file.write(|batch| {
        let mut source = batch.record(src_parent.address)?;
        let link = source
            .take_link(&src_name)
            .ok_or_else(|| H5Error::not_found(src_path.clone()))?;

        let mut dest = if dst_parent.address == src_parent.address {
            source
        } else {
            batch.put(source);
            batch.record(dst_parent.address)?
        };
        if dest.find_link(&dst_name).is_some() {
            return Err(H5Error::already_exists(dst_path.clone()));
        }
        dest.push_link(&dst_name, link.target);
        batch.put(dest);
        Ok(())
    })
}

/// Deep-copy `source` to `name` under `group`; the source may live in
/// another file
pub(crate) fn copy(group: &Location, source: &Object, name: &str) -> Result<Location> {
    let source = source.location()?;
    let records = source.file.read(|container| {
        let mut records = BTreeMap::new();
        let mut stack = vec![source.address];
        while let Some(address) = stack.pop() {
            if records.contains_key(&address) {
                continue;
            }
            let record = container.record(address)?.clone();
            stack.extend(hard_children(&record));
            records.insert(address, record);
        }
        Ok(records)
    })?;

    // Hard links between copied objects survive as links between the copies
    let mut incoming: BTreeMap<Address, u32> = BTreeMap::new();
    for record in records.values() {
        for child in hard_children(record) {
            *incoming.entry(child).or_default() += 1;
        }
    }

    check_free(group, name)?;
    let (parent, copy_name) = ensure_parent(group, name)?;
    let copy_path = join(&parent.path, &copy_name);

    let address = parent.file.write(|batch| {
        let mut dest = batch.record(parent.address)?;
        if dest.find_link(&copy_name).is_some() {
            return Err(H5Error::already_exists(copy_path.clone()));
        }

        let mut renumber = BTreeMap::new();
        for &old in records.keys() {
            renumber.insert(old, batch.allocate()?);
        }
        let new_address = |old: Address| renumber.get(&old).copied().unwrap_or(old);

        for (&old, record) in &records {
            let mut copied = record.clone();
            copied.address = new_address(old);
            copied.hard_links =
                incoming.get(&old).copied().unwrap_or(0) + u32::from(old == source.address);
            if let ObjectBody::Group { links, .. } = &mut copied.body {
                for link in links {
                    if let LinkTarget::Hard(child) = &mut link.target {
                        *child = new_address(*child);
                    }
                }
            }
            batch.put(copied);
        }

        let root = new_address(source.address);
        dest.push_link(&copy_name, LinkTarget::Hard(root));
        batch.put(dest);
        Ok(root)
    })?;

    Ok(Location {
        file: Arc::clone(&parent.file),
        address,
        path: copy_path,
    })
}

fn hard_children(record: &ObjectRecord) -> impl Iterator<Item = Address> + '_ {
    record
        .links()
        .unwrap_or_default()
        .iter()
        .filter_map(|link| match link.target {
            LinkTarget::Hard(child) => Some(child),
            _ => None,
        })
}

/// `AlreadyExists` if a link is already at `path`
fn check_free(start: &Location, path: &str) -> Result<()> {
    if let Ok((parent, name)) = resolve_parent(start, path) {
        if let Ok(Some(_)) = parent.child_link(&name) {
            return Err(H5Error::already_exists(join(&parent.path, &name)));
        }
    }
    Ok(())
}
