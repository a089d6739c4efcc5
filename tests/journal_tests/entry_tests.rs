//! Tests for journal entries
//!
//! These tests verify:
//! - Serialize/deserialize of put and delete operations
//! - Multi-operation entries stay together
//! - CRC corruption detection (data and header)
//! - Truncated and undersized buffers

use h5node::journal::{JournalEntry, Operation, HEADER_SIZE};
use h5node::storage::{ObjectRecord, ROOT_ADDRESS};
use h5node::{DataSpace, TypeDescriptor};

// =============================================================================
// Helper Functions
// =============================================================================

fn put_group(address: u64) -> Operation {
    Operation::Put {
        record: ObjectRecord::group(address),
    }
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_serialize_deserialize_put() {
    let entry = JournalEntry::new(1, vec![put_group(ROOT_ADDRESS)]);

    let bytes = entry.serialize().unwrap();
    let recovered = JournalEntry::deserialize(&bytes).unwrap();

    assert_eq!(recovered, entry);
}

#[test]
fn test_serialize_deserialize_delete() {
    let entry = JournalEntry::new(42, vec![Operation::Delete { address: 7 }]);

    let bytes = entry.serialize().unwrap();
    let recovered = JournalEntry::deserialize(&bytes).unwrap();

    assert_eq!(recovered.lsn, 42);
    assert_eq!(recovered.ops, vec![Operation::Delete { address: 7 }]);
}

#[test]
fn test_multi_operation_entry() {
    let dataset = ObjectRecord::dataset(3, TypeDescriptor::double(), DataSpace::from([2, 2])).unwrap();
    let entry = JournalEntry::new(
        5,
        vec![
            put_group(2),
            Operation::Put { record: dataset },
            Operation::Delete { address: 9 },
        ],
    );

    let recovered = JournalEntry::deserialize(&entry.serialize().unwrap()).unwrap();

    assert_eq!(recovered.ops.len(), 3);
    assert_eq!(recovered, entry);
}

#[test]
fn test_empty_entry() {
    let entry = JournalEntry::new(1, Vec::new());
    let recovered = JournalEntry::deserialize(&entry.serialize().unwrap()).unwrap();
    assert!(recovered.ops.is_empty());
}

#[test]
fn test_header_layout() {
    let entry = JournalEntry::new(0x0102_0304, vec![put_group(2)]);
    let bytes = entry.serialize().unwrap();

    let lsn = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
    let len = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;

    assert_eq!(lsn, 0x0102_0304);
    assert_eq!(bytes.len(), HEADER_SIZE + len);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_crc_corruption_detected() {
    let entry = JournalEntry::new(1, vec![put_group(2)]);
    let mut bytes = entry.serialize().unwrap();

    // Flip a data byte
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    assert!(JournalEntry::deserialize(&bytes).is_err());
}

#[test]
fn test_crc_corruption_in_header_detected() {
    let entry = JournalEntry::new(1, vec![put_group(2)]);
    let mut bytes = entry.serialize().unwrap();

    // Flip a byte of the LSN, which the CRC covers
    bytes[0] ^= 0xFF;

    assert!(JournalEntry::deserialize(&bytes).is_err());
}

#[test]
fn test_truncated_entry() {
    let entry = JournalEntry::new(1, vec![Operation::Delete { address: 3 }]);
    let bytes = entry.serialize().unwrap();

    let truncated = &bytes[..HEADER_SIZE + 2];
    assert!(JournalEntry::deserialize(truncated).is_err());
}

#[test]
fn test_header_too_small() {
    let bytes = [0u8; 10];
    assert!(JournalEntry::deserialize(&bytes).is_err());
}

#[test]
fn test_empty_buffer() {
    let bytes: [u8; 0] = [];
    assert!(JournalEntry::deserialize(&bytes).is_err());
}
