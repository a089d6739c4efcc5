//! Journal recovery
//!
//! Replays the journal after a crash and cuts off whatever a partial write
//! left behind.

use std::fs::OpenOptions;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;

use super::reader::{Frame, JournalReader};
use super::JournalEntry;

/// Handles journal recovery after a crash
pub struct JournalRecovery;

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Number of corrupted entries found (everything after one is dropped)
    pub entries_corrupted: u64,

    /// Last valid LSN (0 when nothing was recovered)
    pub last_lsn: u64,

    /// Whether the journal had bytes past the last valid entry
    pub was_truncated: bool,

    /// Offset just past the last valid entry
    pub valid_len: u64,
}

impl JournalRecovery {
    /// Recover entries from a journal file.
    ///
    /// Reads every valid entry in order, stops at the first torn or corrupted
    /// frame and truncates the file there.
    pub fn recover(path: &Path) -> Result<(Vec<JournalEntry>, RecoveryResult)> {
        let (entries, result) = Self::scan(path)?;

        if result.was_truncated {
            warn!(
                path = %path.display(),
                valid_len = result.valid_len,
                corrupted = result.entries_corrupted,
                "Truncating journal tail"
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_len)?;
            file.sync_all()?;
        }

        Ok((entries, result))
    }

    /// Read all valid entries without modifying the file
    pub fn scan(path: &Path) -> Result<(Vec<JournalEntry>, RecoveryResult)> {
        let mut reader = JournalReader::open(path)?;
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();

        loop {
            match reader.read_frame()? {
                Frame::Entry(entry) => {
                    result.entries_recovered += 1;
                    result.last_lsn = entry.lsn;
                    entries.push(entry);
                }
                Frame::End => break,
                Frame::Torn => {
                    result.was_truncated = true;
                    break;
                }
                Frame::Corrupt(err) => {
                    debug!(error = %err, "Corrupted journal entry");
                    result.entries_corrupted += 1;
                    result.was_truncated = true;
                    break;
                }
            }
        }

        result.valid_len = reader.position();
        Ok((entries, result))
    }

    /// Verify integrity of a journal file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path).map(|(_, result)| result)
    }
}
