//! Object table
//!
//! In-memory map of every live record of a file.

use std::collections::BTreeMap;

use crate::journal::Operation;

use super::{Address, ObjectRecord, ROOT_ADDRESS};

/// All live records of one file, plus the address allocator
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTable {
    records: BTreeMap<Address, ObjectRecord>,
    next_address: Address,
}

impl ObjectTable {
    /// Table of a new file: just the root group
    pub fn new() -> Self {
        let mut records = BTreeMap::new();
        records.insert(ROOT_ADDRESS, ObjectRecord::group(ROOT_ADDRESS));
        Self {
            records,
            next_address: ROOT_ADDRESS + 1,
        }
    }

    /// Rebuild from snapshot contents
    pub fn from_records(records: Vec<ObjectRecord>, next_address: Address) -> Self {
        let mut table = Self {
            records: BTreeMap::new(),
            next_address: next_address.max(ROOT_ADDRESS + 1),
        };
        for record in records {
            table.insert(record);
        }
        table
    }

    pub fn get(&self, address: Address) -> Option<&ObjectRecord> {
        self.records.get(&address)
    }

    pub fn contains(&self, address: Address) -> bool {
        self.records.contains_key(&address)
    }

    /// Reserve a fresh address. Addresses are never reused.
    pub fn allocate(&mut self) -> Address {
        let address = self.next_address;
        self.next_address += 1;
        address
    }

    pub fn next_address(&self) -> Address {
        self.next_address
    }

    /// Apply one journaled operation. Whole-record puts make replay
    /// idempotent.
    pub fn apply(&mut self, op: &Operation) {
        match op {
            Operation::Put { record } => self.insert(record.clone()),
            Operation::Delete { address } => {
                self.records.remove(address);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in address order
    pub fn iter(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.records.values()
    }

    fn insert(&mut self, record: ObjectRecord) {
        if record.address >= self.next_address {
            self.next_address = record.address + 1;
        }
        self.records.insert(record.address, record);
    }
}

impl Default for ObjectTable {
    fn default() -> Self {
        Self::new()
    }
}
