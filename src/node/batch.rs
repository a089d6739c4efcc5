//! Staged record edits
//!
//! A mutation reads records, edits copies and commits every change as one
//! journal entry, so a failure part-way leaves the file untouched.

use std::collections::BTreeMap;

use crate::error::{H5Error, Result};
use crate::journal::Operation;
use crate::storage::{Address, Container, ObjectRecord};

pub(crate) struct Batch<'a> {
    container: &'a mut Container,
    /// `None` marks a reclaimed record
    changes: BTreeMap<Address, Option<ObjectRecord>>,
}

impl<'a> Batch<'a> {
    pub(crate) fn new(container: &'a mut Container) -> Self {
        Self {
            container,
            changes: BTreeMap::new(),
        }
    }

    /// Current version of a record, staged edits included
    pub(crate) fn record(&self, address: Address) -> Result<ObjectRecord> {
        match self.changes.get(&address) {
            Some(Some(record)) => Ok(record.clone()),
            Some(None) => Err(H5Error::not_found(format!("object at address {}", address))),
            None => self.container.record(address).cloned(),
        }
    }

    pub(crate) fn put(&mut self, record: ObjectRecord) {
        self.changes.insert(record.address, Some(record));
    }

    pub(crate) fn delete(&mut self, address: Address) {
        self.changes.insert(address, None);
    }

    pub(crate) fn allocate(&mut self) -> Result<Address> {
        self.container.allocate()
    }

    /// Journal and apply everything staged
    pub(crate) fn commit(self) -> Result<()> {
        let ops = self
            .changes
            .into_iter()
            .map(|(address, change)| match change {
                Some(record) => Operation::Put { record },
                None => Operation::Delete { address },
            })
            .collect();
        self.container.commit(ops)
    }
}
