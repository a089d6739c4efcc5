//! Journal entry definitions
//!
//! Defines the structure of individual journal entries and their framing.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::error::{H5Error, Result};
use crate::storage::{Address, ObjectRecord};

/// Entry header: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// A single entry in the journal: one atomic mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// Timestamp (unix millis) when the entry was created
    pub timestamp: u64,

    /// Record operations, applied in order
    pub ops: Vec<Operation>,
}

/// Record operations that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Insert or replace a whole record
    Put { record: ObjectRecord },

    /// Reclaim a record
    Delete { address: Address },
}

/// Payload stored after the header
#[derive(Serialize, Deserialize)]
struct Payload {
    timestamp: u64,
    ops: Vec<Operation>,
}

impl JournalEntry {
    pub fn new(lsn: u64, ops: Vec<Operation>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self { lsn, timestamp, ops }
    }

    /// Encode as `[LSN][CRC][Len][Data]`
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = bincode::serialize(&Payload {
            timestamp: self.timestamp,
            ops: self.ops.clone(),
        })?;

        let len = u32::try_from(data.len()).map_err(|_| {
            H5Error::Storage(format!("journal entry of {} bytes is too large", data.len()))
        })?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + data.len());
        buf.put_u64_le(self.lsn);
        buf.put_u32_le(compute_crc(self.lsn, len, &data));
        buf.put_u32_le(len);
        buf.put_slice(&data);
        Ok(buf)
    }

    /// Decode one entry from the front of `bytes`
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let (lsn, crc, len) = parse_header(bytes)?;

        let end = HEADER_SIZE + len as usize;
        if bytes.len() < end {
            return Err(H5Error::JournalCorruption(format!(
                "entry {} needs {} data bytes, {} available",
                lsn,
                len,
                bytes.len() - HEADER_SIZE
            )));
        }

        let data = &bytes[HEADER_SIZE..end];
        let actual = compute_crc(lsn, len, data);
        if actual != crc {
            return Err(H5Error::JournalCorruption(format!(
                "CRC mismatch in entry {}: stored {:#010x}, computed {:#010x}",
                lsn, crc, actual
            )));
        }

        let payload: Payload = bincode::deserialize(data)?;
        Ok(Self {
            lsn,
            timestamp: payload.timestamp,
            ops: payload.ops,
        })
    }
}

/// Split a header into `(lsn, crc, len)`
pub(crate) fn parse_header(bytes: &[u8]) -> Result<(u64, u32, u32)> {
    if bytes.len() < HEADER_SIZE {
        return Err(H5Error::JournalCorruption(format!(
            "header needs {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let lsn = header.get_u64_le();
    let crc = header.get_u32_le();
    let len = header.get_u32_le();
    Ok((lsn, crc, len))
}

fn compute_crc(lsn: u64, len: u32, data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&lsn.to_le_bytes());
    hasher.update(&len.to_le_bytes());
    hasher.update(data);
    hasher.finalize()
}
