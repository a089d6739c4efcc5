//! Journal writer
//!
//! Appends entries to the journal file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::config::SyncStrategy;
use crate::error::Result;

use super::{JournalEntry, JournalRecovery, Operation};

/// Writes entries to the journal file
pub struct JournalWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    /// LSN the next entry receives
    next_lsn: u64,
    sync_strategy: SyncStrategy,
    /// Entries appended since the last fsync
    unsynced: usize,
    /// Entries currently in the file
    entry_count: usize,
}

impl JournalWriter {
    /// Open or create a journal file.
    ///
    /// Appends after the last valid entry already in the file; LSNs continue
    /// from it.
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let (last_lsn, entry_count, valid_len) = if path.exists() {
            let (_, result) = JournalRecovery::scan(path)?;
            (result.last_lsn, result.entries_recovered as usize, result.valid_len)
        } else {
            (0, 0, 0)
        };
        Self::open_at(path, sync_strategy, last_lsn + 1, entry_count, valid_len)
    }

    /// Open with a known state (used right after recovery or a checkpoint)
    pub(crate) fn open_at(
        path: &Path,
        sync_strategy: SyncStrategy,
        next_lsn: u64,
        entry_count: usize,
        valid_len: u64,
    ) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;
        if file.metadata()?.len() != valid_len {
            file.set_len(valid_len)?;
        }
        file.seek(SeekFrom::Start(valid_len))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            next_lsn,
            sync_strategy,
            unsynced: 0,
            entry_count,
        })
    }

    /// Append one mutation; returns its LSN
    pub fn append(&mut self, ops: Vec<Operation>) -> Result<u64> {
        let lsn = self.next_lsn;
        let bytes = JournalEntry::new(lsn, ops).serialize()?;

        self.writer.write_all(&bytes)?;
        self.next_lsn += 1;
        self.entry_count += 1;
        self.unsynced += 1;

        match self.sync_strategy {
            SyncStrategy::EveryWrite => self.sync()?,
            SyncStrategy::EveryNEntries { count } => {
                if self.unsynced >= count.max(1) {
                    self.sync()?;
                } else {
                    self.writer.flush()?;
                }
            }
        }

        trace!(lsn, bytes = bytes.len(), "Journal append");
        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Drop every entry (their effects are now in the snapshot). LSNs keep
    /// counting up.
    pub fn truncate(&mut self) -> Result<()> {
        self.writer.flush()?;
        let file = self.writer.get_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.sync_all()?;

        self.entry_count = 0;
        self.unsynced = 0;
        Ok(())
    }

    /// LSN the next append will receive
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Entries currently in the journal file
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        if let Err(e) = self.sync() {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to sync journal on drop");
        }
    }
}
