//! Container
//!
//! The storage engine behind one open file. Coordinates the object table,
//! the journal and the snapshot.
//!
//! ## Write path
//! 1. Append the mutation's operations to the journal as one entry
//! 2. Apply them to the object table
//! 3. Checkpoint once the journal holds `checkpoint_threshold` entries
//!
//! ## Open path
//! 1. Load the snapshot
//! 2. Replay the journal on top of it (torn tail removed when writable)
//! 3. Checkpoint if anything was replayed

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{H5Error, Result};
use crate::journal::{JournalRecovery, JournalWriter, Operation};

use super::{Address, ObjectRecord, ObjectTable, SnapshotBuilder, SnapshotReader, ROOT_ADDRESS};

/// Storage for one file
pub struct Container {
    path: PathBuf,
    journal_path: PathBuf,
    config: Config,
    table: ObjectTable,
    /// `None` for read-only containers
    journal: Option<JournalWriter>,
}

impl Container {
    const JOURNAL_SUFFIX: &'static str = ".journal";

    /// Create a fresh file holding only the root group, replacing whatever
    /// is at `path`
    pub fn create(path: &Path, config: Config) -> Result<Self> {
        let journal_path = Self::journal_path_for(path);
        let table = ObjectTable::new();

        // A stale journal must never replay over the fresh snapshot
        if journal_path.exists() {
            fs::remove_file(&journal_path)?;
        }
        SnapshotBuilder::write_table(path, &table)?;
        let journal = JournalWriter::open_at(&journal_path, config.journal_sync, 1, 0, 0)?;

        info!(path = %path.display(), "Created file");

        Ok(Self {
            path: path.to_path_buf(),
            journal_path,
            config,
            table,
            journal: Some(journal),
        })
    }

    /// Open an existing file
    pub fn open(path: &Path, writable: bool, config: Config) -> Result<Self> {
        let journal_path = Self::journal_path_for(path);
        let mut table = SnapshotReader::open(path)?.into_table();

        if !table.get(ROOT_ADDRESS).is_some_and(ObjectRecord::is_group) {
            return Err(H5Error::Storage(format!(
                "{} has no root group",
                path.display()
            )));
        }

        let (entries, recovery) = if !journal_path.exists() {
            (Vec::new(), Default::default())
        } else if writable {
            JournalRecovery::recover(&journal_path)?
        } else {
            JournalRecovery::scan(&journal_path)?
        };

        if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
            info!(
                path = %path.display(),
                recovered = recovery.entries_recovered,
                corrupted = recovery.entries_corrupted,
                last_lsn = recovery.last_lsn,
                "Journal recovery"
            );
        }

        for entry in &entries {
            for op in &entry.ops {
                table.apply(op);
            }
        }

        let journal = if writable {
            Some(JournalWriter::open_at(
                &journal_path,
                config.journal_sync,
                recovery.last_lsn + 1,
                entries.len(),
                recovery.valid_len,
            )?)
        } else {
            None
        };

        let mut container = Self {
            path: path.to_path_buf(),
            journal_path,
            config,
            table,
            journal,
        };

        // Make the recovered state durable in the snapshot
        if container.journal.is_some() && !entries.is_empty() {
            container.checkpoint()?;
        }

        debug!(
            path = %container.path.display(),
            writable,
            records = container.table.len(),
            "Opened file"
        );
        Ok(container)
    }

    pub fn get(&self, address: Address) -> Option<&ObjectRecord> {
        self.table.get(address)
    }

    /// Record at `address` or `NotFound`
    pub fn record(&self, address: Address) -> Result<&ObjectRecord> {
        self.table
            .get(address)
            .ok_or_else(|| H5Error::not_found(format!("object at address {}", address)))
    }

    pub fn contains(&self, address: Address) -> bool {
        self.table.contains(address)
    }

    /// Reserve an address for a record about to be committed
    pub fn allocate(&mut self) -> Result<Address> {
        self.writable_journal()?;
        Ok(self.table.allocate())
    }

    /// Journal and apply one mutation
    pub fn commit(&mut self, ops: Vec<Operation>) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }

        let threshold = self.config.checkpoint_threshold;
        let journal = self.writable_journal()?;
        journal.append(ops.clone())?;
        let pending = journal.entry_count();

        for op in &ops {
            self.table.apply(op);
        }

        if threshold > 0 && pending >= threshold {
            self.checkpoint()?;
        }
        Ok(())
    }

    /// Fold the journal into a new snapshot. No-op when read-only.
    pub fn checkpoint(&mut self) -> Result<()> {
        let Some(journal) = self.journal.as_mut() else {
            return Ok(());
        };

        journal.sync()?;
        SnapshotBuilder::write_table(&self.path, &self.table)?;
        journal.truncate()?;

        debug!(path = %self.path.display(), records = self.table.len(), "Checkpoint complete");
        Ok(())
    }

    /// Force the journal to disk
    pub fn flush(&mut self) -> Result<()> {
        match self.journal.as_mut() {
            Some(journal) => journal.sync(),
            None => Ok(()),
        }
    }

    /// Flush and, if configured, checkpoint
    pub fn close(mut self) -> Result<()> {
        let pending = self.journal.as_ref().map_or(0, JournalWriter::entry_count);
        if self.config.checkpoint_on_close && pending > 0 {
            self.checkpoint()?;
        }
        self.flush()
    }

    pub fn is_writable(&self) -> bool {
        self.journal.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    pub fn table(&self) -> &ObjectTable {
        &self.table
    }

    /// Entries waiting in the journal
    pub fn pending_entries(&self) -> usize {
        self.journal.as_ref().map_or(0, JournalWriter::entry_count)
    }

    fn writable_journal(&mut self) -> Result<&mut JournalWriter> {
        let path = &self.path;
        self.journal
            .as_mut()
            .ok_or_else(|| H5Error::ReadOnly(path.display().to_string()))
    }

    fn journal_path_for(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(Self::JOURNAL_SUFFIX);
        PathBuf::from(name)
    }
}
