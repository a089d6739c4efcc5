//! Tests for groups
//!
//! These tests verify:
//! - Group and dataset creation with intermediate groups
//! - AlreadyExists on occupied paths, leaving the existing object intact
//! - Child listing in creation order
//! - Lookups, existence and type queries
//! - Unlink, rename, move and copy

use std::path::PathBuf;

use h5node::{
    DataSpace, File, H5Error, ObjectType, TypeClass, TypeDescriptor,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_file() -> (TempDir, File) {
    let temp_dir = TempDir::new().unwrap();
    let path: PathBuf = temp_dir.path().join("test.h5n");
    let file = File::create(&path).unwrap();
    (temp_dir, file)
}

// =============================================================================
// Creation Tests
// =============================================================================

#[test]
fn test_create_group_makes_intermediates() {
    let (_temp, file) = setup_temp_file();

    let group = file.create_group("a/b/c").unwrap();

    assert_eq!(group.path(), "/a/b/c");
    assert!(file.exist("a").unwrap());
    assert!(file.exist("a/b").unwrap());
    assert!(file.exist("/a/b/c").unwrap());
    assert_eq!(file.get_group("a/b/c").unwrap(), group);
}

#[test]
fn test_create_group_on_existing_path_fails() {
    let (_temp, file) = setup_temp_file();

    let group = file.create_group("g").unwrap();
    group.create_group("child").unwrap();

    assert!(matches!(
        file.create_group("g"),
        Err(H5Error::AlreadyExists(_))
    ));

    // The existing group is untouched
    assert_eq!(group.list_object_names().unwrap(), vec!["child"]);
}

#[test]
fn test_create_dataset_on_existing_path_fails() {
    let (_temp, file) = setup_temp_file();

    let dataset = file
        .create_dataset("data", 3, TypeDescriptor::int())
        .unwrap();
    dataset.write(vec![1i32, 2, 3]).unwrap();

    assert!(matches!(
        file.create_dataset("data", 5, TypeDescriptor::double()),
        Err(H5Error::AlreadyExists(_))
    ));
    assert!(matches!(
        file.create_group("data"),
        Err(H5Error::AlreadyExists(_))
    ));

    assert_eq!(dataset.read_raw::<i32>().unwrap(), vec![1, 2, 3]);
    assert_eq!(dataset.dtype().unwrap(), TypeDescriptor::int());
}

#[test]
fn test_create_dataset_makes_intermediates() {
    let (_temp, file) = setup_temp_file();

    let dataset = file
        .create_dataset("x/y/data", [2, 3], TypeDescriptor::float())
        .unwrap();

    assert_eq!(dataset.path(), "/x/y/data");
    assert!(file.has_object("x/y", ObjectType::Group).unwrap());
}

#[test]
fn test_create_dataset_rejects_bad_type() {
    let (_temp, file) = setup_temp_file();

    let result = file.create_dataset("bad", 4, TypeDescriptor::new(TypeClass::Int, 8));

    assert!(matches!(result, Err(H5Error::InvalidType(_))));
    assert!(!file.exist("bad").unwrap());
}

#[test]
fn test_create_below_dataset_fails() {
    let (_temp, file) = setup_temp_file();
    file.create_dataset("data", 1, TypeDescriptor::int()).unwrap();

    assert!(matches!(
        file.create_group("data/inner"),
        Err(H5Error::InvalidArgument(_))
    ));
}

#[test]
fn test_absolute_path_from_subgroup() {
    let (_temp, file) = setup_temp_file();
    let sub = file.create_group("sub").unwrap();

    let top = sub.create_group("/top").unwrap();
    let nested = sub.create_group("nested").unwrap();

    assert_eq!(top.path(), "/top");
    assert_eq!(nested.path(), "/sub/nested");
    assert_eq!(file.list_object_names().unwrap(), vec!["sub", "top"]);
}

// =============================================================================
// Listing Tests
// =============================================================================

#[test]
fn test_list_in_creation_order() {
    let (_temp, file) = setup_temp_file();

    file.create_group("z_group").unwrap();
    file.create_dataset("a_data", 1, TypeDescriptor::int()).unwrap();
    file.create_group("m_group").unwrap();
    file.create_dataset("b_data", 1, TypeDescriptor::double()).unwrap();

    assert_eq!(
        file.list_object_names().unwrap(),
        vec!["z_group", "a_data", "m_group", "b_data"]
    );
    assert_eq!(file.number_objects().unwrap(), 4);
    assert_eq!(file.object_name(2).unwrap(), "m_group");
    assert!(matches!(
        file.object_name(4),
        Err(H5Error::InvalidArgument(_))
    ));
}

#[test]
fn test_list_after_unlink_keeps_order() {
    let (_temp, file) = setup_temp_file();

    for name in ["one", "two", "three"] {
        file.create_group(name).unwrap();
    }
    file.unlink("two").unwrap();
    file.create_group("four").unwrap();

    assert_eq!(
        file.list_object_names().unwrap(),
        vec!["one", "three", "four"]
    );
}

// =============================================================================
// Lookup / Query Tests
// =============================================================================

#[test]
fn test_get_wrong_kind_or_missing() {
    let (_temp, file) = setup_temp_file();
    file.create_group("g").unwrap();
    file.create_dataset("d", 2, TypeDescriptor::int()).unwrap();

    assert!(matches!(file.get_group("d"), Err(H5Error::InvalidArgument(_))));
    assert!(matches!(file.get_dataset("g"), Err(H5Error::InvalidArgument(_))));
    assert!(matches!(file.get_group("missing"), Err(H5Error::NotFound(_))));
    assert!(matches!(
        file.get_dataset("g/missing"),
        Err(H5Error::NotFound(_))
    ));
}

#[test]
fn test_exist() {
    let (_temp, file) = setup_temp_file();
    file.create_group("g/h").unwrap();
    file.create_dataset("d", 2, TypeDescriptor::int()).unwrap();

    assert!(file.exist("/").unwrap());
    assert!(file.exist("g/h").unwrap());
    assert!(!file.exist("g/x").unwrap());
    assert!(!file.exist("x/y/z").unwrap());
    assert!(!file.exist("d/below").unwrap());

    let g = file.get_group("g").unwrap();
    assert!(g.exist("h").unwrap());
    assert!(g.exist("/d").unwrap());
    assert!(!g.exist("d").unwrap());
}

#[test]
fn test_has_object_checks_type() {
    let (_temp, file) = setup_temp_file();
    file.create_group("g").unwrap();
    file.create_dataset("d", 2, TypeDescriptor::int()).unwrap();

    assert!(file.has_object("g", ObjectType::Group).unwrap());
    assert!(!file.has_object("g", ObjectType::Dataset).unwrap());
    assert!(file.has_object("d", ObjectType::Dataset).unwrap());
    assert!(!file.has_object("d", ObjectType::Group).unwrap());
    assert!(!file.has_object("missing", ObjectType::Group).unwrap());
}

#[test]
fn test_object_types() {
    let (_temp, file) = setup_temp_file();
    let group = file.create_group("g").unwrap();
    let dataset = file.create_dataset("d", 2, TypeDescriptor::int()).unwrap();

    assert_eq!(file.object_type().unwrap(), ObjectType::File);
    assert_eq!(group.object_type().unwrap(), ObjectType::Group);
    assert_eq!(dataset.object_type().unwrap(), ObjectType::Dataset);
    assert_eq!(file.object_type_of("d").unwrap(), ObjectType::Dataset);
    assert_eq!(file.object_type_of("g").unwrap(), ObjectType::Group);
}

#[test]
fn test_parent() {
    let (_temp, file) = setup_temp_file();
    let group = file.create_group("a/b").unwrap();

    assert_eq!(group.parent().unwrap().path(), "/a");
    assert_eq!(group.parent().unwrap().parent().unwrap(), *file);
    assert!(file.parent().is_err());
}

#[test]
fn test_equality_is_by_identity() {
    let (_temp, file) = setup_temp_file();
    let a = file.create_group("a").unwrap();
    let b = file.create_group("b").unwrap();

    let a_again = file.get_group("/a/.").unwrap();

    assert_eq!(a, a_again);
    assert_ne!(a, b);
    assert_eq!(a.id(), a_again.id());
}

// =============================================================================
// Unlink Tests
// =============================================================================

#[test]
fn test_unlink_group() {
    let (_temp, file) = setup_temp_file();
    let group = file.create_group("g").unwrap();
    group.create_dataset("d", 2, TypeDescriptor::int()).unwrap();

    file.unlink("g").unwrap();

    assert!(!file.exist("g").unwrap());
    assert!(file.list_object_names().unwrap().is_empty());
    assert!(!group.is_valid());
    assert!(matches!(
        group.list_object_names(),
        Err(H5Error::InvalidHandle(_))
    ));
}

#[test]
fn test_unlink_missing_fails() {
    let (_temp, file) = setup_temp_file();

    assert!(matches!(file.unlink("nope"), Err(H5Error::NotFound(_))));
    assert!(matches!(file.unlink("a/b"), Err(H5Error::NotFound(_))));
}

#[test]
fn test_remove_self() {
    let (_temp, file) = setup_temp_file();
    let dataset = file.create_dataset("g/d", 2, TypeDescriptor::int()).unwrap();

    dataset.remove().unwrap();

    assert!(!file.exist("g/d").unwrap());
    assert!(file.exist("g").unwrap());
}

// =============================================================================
// Rename / Copy Tests
// =============================================================================

#[test]
fn test_rename_moves_link() {
    let (_temp, file) = setup_temp_file();
    let dataset = file.create_dataset("src/d", 3, TypeDescriptor::int()).unwrap();
    dataset.write(vec![7i32, 8, 9]).unwrap();

    file.rename("src/d", "dst/deeper/d2").unwrap();

    assert!(!file.exist("src/d").unwrap());
    let moved = file.get_dataset("dst/deeper/d2").unwrap();
    assert_eq!(moved, dataset);
    assert_eq!(moved.read_raw::<i32>().unwrap(), vec![7, 8, 9]);
}

#[test]
fn test_rename_within_group() {
    let (_temp, file) = setup_temp_file();
    file.create_group("a").unwrap();
    file.create_group("b").unwrap();

    file.rename("a", "c").unwrap();

    assert_eq!(file.list_object_names().unwrap(), vec!["b", "c"]);
}

#[test]
fn test_rename_errors() {
    let (_temp, file) = setup_temp_file();
    file.create_group("a/b").unwrap();
    file.create_group("c").unwrap();

    assert!(matches!(
        file.rename("a", "a/b/inside"),
        Err(H5Error::InvalidArgument(_))
    ));
    assert!(matches!(file.rename("a", "c"), Err(H5Error::AlreadyExists(_))));
    assert!(matches!(file.rename("missing", "x"), Err(H5Error::NotFound(_))));

    // Nothing moved
    assert!(file.exist("a/b").unwrap());
    assert!(!file.exist("x").unwrap());
}

#[test]
fn test_move_to_relative_to_parent() {
    let (_temp, file) = setup_temp_file();
    let group = file.create_group("p/child").unwrap();

    group.move_to("renamed").unwrap();

    assert!(file.exist("p/renamed").unwrap());
    assert!(!file.exist("p/child").unwrap());
}

#[test]
fn test_copy_is_deep_and_independent() {
    let (_temp, file) = setup_temp_file();
    let source = file.create_group("src").unwrap();
    let dataset = source
        .create_dataset("inner/values", [2, 2], TypeDescriptor::int())
        .unwrap();
    dataset.write(vec![1i32, 2, 3, 4]).unwrap();
    source
        .create_attribute("unit", DataSpace::scalar(), TypeDescriptor::str())
        .unwrap()
        .write("m")
        .unwrap();

    let copy = file.copy(&source, "dst").unwrap();

    assert_eq!(copy.path(), "/dst");
    assert_ne!(copy, *source);
    assert_eq!(copy.object_type().unwrap(), ObjectType::Group);
    assert!(copy.has_attribute("unit").unwrap());

    let copied = file.get_dataset("dst/inner/values").unwrap();
    assert_eq!(copied.read_raw::<i32>().unwrap(), vec![1, 2, 3, 4]);

    // Writing the copy leaves the source alone
    copied.write(vec![0i32, 0, 0, 0]).unwrap();
    assert_eq!(dataset.read_raw::<i32>().unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_copy_onto_existing_name_fails() {
    let (_temp, file) = setup_temp_file();
    let source = file.create_group("src").unwrap();
    file.create_group("dst").unwrap();

    assert!(matches!(
        file.copy(&source, "dst"),
        Err(H5Error::AlreadyExists(_))
    ));
}
