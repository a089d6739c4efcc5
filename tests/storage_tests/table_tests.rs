//! Tests for the object table
//!
//! These tests verify:
//! - A new table holds only the root group
//! - Address allocation is monotonic and never reuses addresses
//! - Applying put/delete operations
//! - Replaying the same operations twice is harmless

use h5node::journal::Operation;
use h5node::storage::{LinkTarget, ObjectRecord, ObjectTable, ROOT_ADDRESS};

// =============================================================================
// Basic Tests
// =============================================================================

#[test]
fn test_new_table_has_root_group() {
    let table = ObjectTable::new();

    assert_eq!(table.len(), 1);
    assert!(table.get(ROOT_ADDRESS).unwrap().is_group());
    assert_eq!(table.next_address(), ROOT_ADDRESS + 1);
}

#[test]
fn test_allocate_is_monotonic() {
    let mut table = ObjectTable::new();

    let a = table.allocate();
    let b = table.allocate();
    let c = table.allocate();

    assert!(a < b && b < c);
    assert!(!table.contains(a));
}

#[test]
fn test_addresses_not_reused_after_delete() {
    let mut table = ObjectTable::new();
    let address = table.allocate();

    table.apply(&Operation::Put {
        record: ObjectRecord::group(address),
    });
    table.apply(&Operation::Delete { address });

    assert!(!table.contains(address));
    assert!(table.allocate() > address);
}

// =============================================================================
// Apply Tests
// =============================================================================

#[test]
fn test_put_bumps_next_address() {
    let mut table = ObjectTable::new();

    table.apply(&Operation::Put {
        record: ObjectRecord::group(40),
    });

    assert!(table.contains(40));
    assert_eq!(table.next_address(), 41);
}

#[test]
fn test_put_replaces_record() {
    let mut table = ObjectTable::new();
    let mut root = table.get(ROOT_ADDRESS).unwrap().clone();
    root.push_link("child", LinkTarget::Hard(2));

    table.apply(&Operation::Put { record: root });

    let root = table.get(ROOT_ADDRESS).unwrap();
    assert!(root.find_link("child").is_some());
    assert_eq!(table.len(), 1);
}

#[test]
fn test_replay_is_idempotent() {
    let ops = vec![
        Operation::Put {
            record: ObjectRecord::group(2),
        },
        Operation::Put {
            record: ObjectRecord::group(3),
        },
        Operation::Delete { address: 2 },
    ];

    let mut once = ObjectTable::new();
    for op in &ops {
        once.apply(op);
    }

    let mut twice = once.clone();
    for op in &ops {
        twice.apply(op);
    }

    assert_eq!(once, twice);
}

#[test]
fn test_iter_in_address_order() {
    let mut table = ObjectTable::new();
    for address in [5, 3, 4] {
        table.apply(&Operation::Put {
            record: ObjectRecord::group(address),
        });
    }

    let addresses: Vec<u64> = table.iter().map(|r| r.address).collect();
    assert_eq!(addresses, vec![ROOT_ADDRESS, 3, 4, 5]);
}
