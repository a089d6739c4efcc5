//! Snapshot reader
//!
//! Loads and validates a snapshot file.

use std::fs;
use std::path::Path;

use bytes::Buf;

use crate::error::{H5Error, Result};
use crate::storage::{Address, ObjectRecord, ObjectTable};

use super::{FOOTER_SIZE, HEADER_SIZE, MAGIC, VERSION};

/// A fully loaded snapshot
#[derive(Debug)]
pub struct SnapshotReader {
    records: Vec<ObjectRecord>,
    next_address: Address,
}

impl SnapshotReader {
    /// Read and validate a snapshot.
    ///
    /// Fails with `Io(NotFound)` if the file is missing and `Storage` if it is
    /// not a snapshot or fails its checksum (header and records).
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;

        if bytes.len() < HEADER_SIZE + FOOTER_SIZE {
            return Err(H5Error::Storage(format!(
                "{} is too short to be an h5node file ({} bytes)",
                path.display(),
                bytes.len()
            )));
        }

        let mut header = &bytes[..HEADER_SIZE];
        if &header[0..4] != MAGIC {
            return Err(H5Error::Storage(format!(
                "Invalid magic in {}: expected H5ND, got {:?}",
                path.display(),
                &header[0..4]
            )));
        }
        header.advance(4);

        let version = header.get_u16_le();
        if version != VERSION {
            return Err(H5Error::Storage(format!(
                "Unsupported snapshot version: {}",
                version
            )));
        }
        let record_count = header.get_u64_le();
        let next_address = header.get_u64_le();

        let body_end = bytes.len() - FOOTER_SIZE;
        let body = &bytes[HEADER_SIZE..body_end];
        let stored_crc = (&bytes[body_end..]).get_u32_le();
        let actual_crc = crc32fast::hash(&bytes[..body_end]);
        if stored_crc != actual_crc {
            return Err(H5Error::Storage(format!(
                "Snapshot checksum mismatch in {}: stored {:#010x}, computed {:#010x}",
                path.display(),
                stored_crc,
                actual_crc
            )));
        }

        // Every record takes at least its 4-byte length prefix
        let capacity = usize::try_from(record_count).map_or(0, |n| n.min(body.len() / 4));
        let mut records = Vec::with_capacity(capacity);
        let mut cursor = body;
        while cursor.has_remaining() {
            if cursor.remaining() < 4 {
                return Err(H5Error::Storage("truncated record length".to_string()));
            }
            let len = cursor.get_u32_le() as usize;
            if cursor.remaining() < len {
                return Err(H5Error::Storage(format!(
                    "record needs {} bytes, {} left",
                    len,
                    cursor.remaining()
                )));
            }
            records.push(bincode::deserialize(&cursor[..len])?);
            cursor.advance(len);
        }

        if records.len() as u64 != record_count {
            return Err(H5Error::Storage(format!(
                "Snapshot header says {} records, found {}",
                record_count,
                records.len()
            )));
        }

        Ok(Self {
            records,
            next_address,
        })
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn next_address(&self) -> Address {
        self.next_address
    }

    pub fn records(&self) -> &[ObjectRecord] {
        &self.records
    }

    pub fn into_table(self) -> ObjectTable {
        ObjectTable::from_records(self.records, self.next_address)
    }
}
