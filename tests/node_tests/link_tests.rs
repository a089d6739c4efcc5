//! Tests for links
//!
//! These tests verify:
//! - Hard and soft links resolve to the same object but report their own type
//! - Soft links resolve lazily and may dangle
//! - Hard link reference counting and reclaim
//! - External links across files, resolved at access time
//! - Link type rules for same-file and cross-file targets
//! - A rejected link or move leaves no intermediate groups behind
//! - Link cycles are bounded by the configured depth

use std::path::{Path, PathBuf};

use h5node::storage::LinkTarget;
use h5node::{Config, DataSet, File, H5Error, LinkType, OpenFlags, TypeDescriptor};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_file() -> (TempDir, File) {
    let temp_dir = TempDir::new().unwrap();
    let file = File::create(temp_dir.path().join("test.h5n")).unwrap();
    (temp_dir, file)
}

fn create_in(dir: &Path, name: &str) -> (PathBuf, File) {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    (path, file)
}

fn sample_dataset(file: &File, path: &str) -> DataSet {
    let dataset = file.create_dataset(path, 3, TypeDescriptor::int()).unwrap();
    dataset.write(vec![10i32, 20, 30]).unwrap();
    dataset
}

// =============================================================================
// Hard / Soft Link Tests
// =============================================================================

#[test]
fn test_hard_and_soft_resolve_to_same_target() {
    let (_temp, file) = setup_temp_file();
    let target = sample_dataset(&file, "data");

    let hard = file.create_link(&target, "hard", LinkType::Hard).unwrap();
    let soft = file.create_link(&target, "soft", LinkType::Soft).unwrap();

    assert_eq!(hard, target);
    assert_eq!(soft, target);
    assert_eq!(file.get_dataset("soft").unwrap(), target);

    assert_eq!(file.get_link_info("hard").unwrap().link_type, LinkType::Hard);
    assert_eq!(file.get_link_info("soft").unwrap().link_type, LinkType::Soft);
    assert_eq!(file.link_type("data").unwrap(), LinkType::Hard);

    // Handles keep the path they were opened by
    assert_eq!(soft.path(), "/soft");
    assert_eq!(soft.read_raw::<i32>().unwrap(), vec![10, 20, 30]);
}

#[test]
fn test_link_info_fields() {
    let (_temp, file) = setup_temp_file();
    let target = sample_dataset(&file, "data");
    file.create_link(&target, "alias", LinkType::Soft).unwrap();

    let info = file.get_link_info("alias").unwrap();
    assert_eq!(info.name, "alias");
    assert_eq!(info.creation_order, 1);
    assert_eq!(info.target, LinkTarget::Soft("/data".to_string()));

    let root = file.get_link_info("/").unwrap();
    assert_eq!(root.link_type, LinkType::Hard);
    assert_eq!(target.link_info().unwrap().name, "data");
}

#[test]
fn test_duplicate_link_name_fails() {
    let (_temp, file) = setup_temp_file();
    let target = sample_dataset(&file, "data");

    assert!(matches!(
        file.create_link(&target, "data", LinkType::Soft),
        Err(H5Error::AlreadyExists(_))
    ));
}

#[test]
fn test_link_creates_intermediate_groups() {
    let (_temp, file) = setup_temp_file();
    let target = sample_dataset(&file, "data");

    let link = file.create_link(&target, "links/nested/alias", LinkType::Soft).unwrap();

    assert_eq!(link.path(), "/links/nested/alias");
    assert_eq!(file.get_group("links/nested").unwrap().number_objects().unwrap(), 1);
}

#[test]
fn test_link_to_group_and_file() {
    let (_temp, file) = setup_temp_file();
    let group = file.create_group("g").unwrap();

    let alias = file.create_link(&group, "g_alias", LinkType::Soft).unwrap();
    let root_alias = group.create_link(&file, "up", LinkType::Soft).unwrap();

    assert_eq!(alias, group);
    assert_eq!(root_alias, *file);
    assert_eq!(root_alias.path(), "/g/up");
}

// =============================================================================
// Soft Link Resolution Tests
// =============================================================================

#[test]
fn test_dangling_soft_link() {
    let (_temp, file) = setup_temp_file();
    let target = sample_dataset(&file, "data");
    file.create_link(&target, "alias", LinkType::Soft).unwrap();

    file.unlink("data").unwrap();

    assert!(file.exist("alias").unwrap());
    assert!(!file.resolved("alias").unwrap());
    assert!(!file.exist_and_resolved("alias").unwrap());
    assert!(matches!(file.get_dataset("alias"), Err(H5Error::NotFound(_))));
    assert_eq!(file.unpack_soft_link("alias").unwrap(), "/data");
}

#[test]
fn test_soft_link_follows_replacement() {
    let (_temp, file) = setup_temp_file();
    let original = sample_dataset(&file, "data");
    file.create_link(&original, "alias", LinkType::Soft).unwrap();

    file.unlink("data").unwrap();
    let replacement = file.create_dataset("data", 1, TypeDescriptor::double()).unwrap();

    let resolved = file.get_dataset("alias").unwrap();
    assert_eq!(resolved, replacement);
    assert_ne!(resolved, original);
}

#[test]
fn test_soft_link_cycle_is_bounded() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder().max_link_depth(4).build();
    let file = File::open_with_config(
        temp.path().join("test.h5n"),
        OpenFlags::OPEN_OR_CREATE,
        config,
    )
    .unwrap();

    // Build /g -> /s1 -> /g
    let group = file.create_group("g").unwrap();
    let s1 = file.create_link(&group, "s1", LinkType::Soft).unwrap();
    file.create_link(&s1, "s2", LinkType::Soft).unwrap();
    file.unlink("g").unwrap();
    file.rename("s2", "g").unwrap();

    assert!(file.exist("s1").unwrap());
    assert!(!file.resolved("s1").unwrap());
    assert!(matches!(file.get_group("s1"), Err(H5Error::NotFound(_))));
}

#[test]
fn test_unpack_wrong_link_kind() {
    let (_temp, file) = setup_temp_file();
    sample_dataset(&file, "data");

    assert!(matches!(
        file.unpack_soft_link("data"),
        Err(H5Error::InvalidArgument(_))
    ));
    assert!(matches!(
        file.unpack_external_link("data"),
        Err(H5Error::InvalidArgument(_))
    ));
}

// =============================================================================
// Hard Link Reference Counting Tests
// =============================================================================

#[test]
fn test_hard_link_keeps_object_alive() {
    let (_temp, file) = setup_temp_file();
    let target = sample_dataset(&file, "data");
    assert_eq!(target.info().unwrap().hard_link_count, 1);

    file.create_link(&target, "second", LinkType::Hard).unwrap();
    assert_eq!(target.info().unwrap().hard_link_count, 2);

    file.unlink("data").unwrap();

    assert!(target.is_valid());
    assert_eq!(target.info().unwrap().hard_link_count, 1);
    assert_eq!(
        file.get_dataset("second").unwrap().read_raw::<i32>().unwrap(),
        vec![10, 20, 30]
    );
    assert_eq!(target.target_path().unwrap(), "/second");
}

#[test]
fn test_last_hard_link_reclaims_object() {
    let (_temp, file) = setup_temp_file();
    let group = file.create_group("g").unwrap();
    let child = group.create_dataset("child", 1, TypeDescriptor::int()).unwrap();
    file.create_link(&group, "other", LinkType::Hard).unwrap();

    file.unlink("g").unwrap();
    assert!(group.is_valid());
    assert!(child.is_valid());

    file.unlink("other").unwrap();
    assert!(!group.is_valid());
    assert!(!child.is_valid());
    assert!(matches!(child.read_raw::<i32>(), Err(H5Error::InvalidHandle(_))));
}

#[test]
fn test_soft_link_does_not_count() {
    let (_temp, file) = setup_temp_file();
    let target = sample_dataset(&file, "data");
    file.create_link(&target, "soft", LinkType::Soft).unwrap();

    assert_eq!(target.info().unwrap().hard_link_count, 1);
}

// =============================================================================
// External Link Tests
// =============================================================================

#[test]
fn test_external_link_resolves_into_other_file() {
    let temp = TempDir::new().unwrap();
    let (_, main) = create_in(temp.path(), "main.h5n");
    let (other_path, other) = create_in(temp.path(), "other.h5n");
    let target = sample_dataset(&other, "remote/data");

    let link = main.create_link(&target, "ext", LinkType::External).unwrap();

    assert_eq!(link, target);
    assert_eq!(main.link_type("ext").unwrap(), LinkType::External);

    let (file, path) = main.unpack_external_link("ext").unwrap();
    assert_eq!(PathBuf::from(file), other_path.canonicalize().unwrap());
    assert_eq!(path, "/remote/data");

    let through = main.get_dataset("ext").unwrap();
    assert_eq!(through.read_raw::<i32>().unwrap(), vec![10, 20, 30]);
    assert_eq!(through.file().unwrap(), other);
}

#[test]
fn test_external_link_reopens_closed_file() {
    let temp = TempDir::new().unwrap();
    let (_, main) = create_in(temp.path(), "main.h5n");
    {
        let (_, other) = create_in(temp.path(), "other.h5n");
        let target = sample_dataset(&other, "data");
        main.create_link(&target, "ext", LinkType::External).unwrap();
    }

    // The foreign file was dropped; access opens it again
    let through = main.get_dataset("ext").unwrap();
    assert_eq!(through.read_raw::<i32>().unwrap(), vec![10, 20, 30]);
    assert!(through.is_valid());
}

#[test]
fn test_external_link_dangles_when_file_missing() {
    let temp = TempDir::new().unwrap();
    let (_, main) = create_in(temp.path(), "main.h5n");
    let other_path = {
        let (path, other) = create_in(temp.path(), "other.h5n");
        let target = sample_dataset(&other, "data");
        main.create_link(&target, "ext", LinkType::External).unwrap();
        path
    };
    std::fs::remove_file(&other_path).unwrap();

    assert!(main.exist("ext").unwrap());
    assert!(!main.resolved("ext").unwrap());
}

#[test]
fn test_link_type_rules() {
    let temp = TempDir::new().unwrap();
    let (_, main) = create_in(temp.path(), "main.h5n");
    let (_, other) = create_in(temp.path(), "other.h5n");
    let local = sample_dataset(&main, "local");
    let remote = sample_dataset(&other, "remote");

    assert!(matches!(
        main.create_link(&local, "ext", LinkType::External),
        Err(H5Error::InvalidArgument(_))
    ));
    assert!(matches!(
        main.create_link(&remote, "hard", LinkType::Hard),
        Err(H5Error::InvalidArgument(_))
    ));
    assert!(matches!(
        main.create_link(&remote, "soft", LinkType::Soft),
        Err(H5Error::InvalidArgument(_))
    ));
    assert_eq!(main.list_object_names().unwrap(), vec!["local"]);
}

#[test]
fn test_rejected_link_creates_no_groups() {
    let temp = TempDir::new().unwrap();
    let (_, main) = create_in(temp.path(), "main.h5n");
    let (_, other) = create_in(temp.path(), "other.h5n");
    let local = sample_dataset(&main, "local");
    let remote = sample_dataset(&other, "remote");

    assert!(matches!(
        main.create_link(&remote, "x/y/l", LinkType::Hard),
        Err(H5Error::InvalidArgument(_))
    ));
    assert!(!main.exist("x").unwrap());

    assert!(matches!(
        main.create_link(&local, "a/b/ext", LinkType::External),
        Err(H5Error::InvalidArgument(_))
    ));
    assert!(!main.exist("a").unwrap());
    assert_eq!(main.list_object_names().unwrap(), vec!["local"]);
}

#[test]
fn test_rename_into_other_file_creates_no_groups() {
    let temp = TempDir::new().unwrap();
    let (_, main) = create_in(temp.path(), "main.h5n");
    let (_, other) = create_in(temp.path(), "other.h5n");
    main.create_group("g").unwrap();
    main.create_link(&other, "ext", LinkType::External).unwrap();

    assert!(matches!(
        main.rename("g", "ext/sub/g"),
        Err(H5Error::InvalidArgument(_))
    ));
    assert!(!other.exist("sub").unwrap());
    assert!(main.exist("g").unwrap());
}
