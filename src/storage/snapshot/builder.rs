//! Snapshot builder
//!
//! Writes an object table to a new snapshot file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::BufMut;
use tracing::debug;

use crate::error::{H5Error, Result};
use crate::storage::{Address, ObjectRecord, ObjectTable};

use super::{HEADER_SIZE, MAGIC, VERSION};

/// Builder for a new snapshot.
///
/// Records go to `<path>.tmp`; `finish()` renames it over `path`, so the old
/// snapshot stays intact until the new one is complete.
pub struct SnapshotBuilder {
    path: PathBuf,
    tmp_path: PathBuf,
    writer: BufWriter<File>,
    record_count: u64,
    /// Running CRC over the record block; the header is folded in at finish
    hasher: crc32fast::Hasher,
}

impl SnapshotBuilder {
    /// Start a snapshot; writes a placeholder header immediately
    pub fn new(path: &Path) -> Result<Self> {
        let tmp_path = tmp_path_for(path);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        let mut writer = BufWriter::new(file);
        writer.write_all(&encode_header(0, 0))?;

        Ok(Self {
            path: path.to_path_buf(),
            tmp_path,
            writer,
            record_count: 0,
            hasher: crc32fast::Hasher::new(),
        })
    }

    /// Write a whole table and finish
    pub fn write_table(path: &Path, table: &ObjectTable) -> Result<()> {
        let mut builder = Self::new(path)?;
        for record in table.iter() {
            builder.add(record)?;
        }
        builder.finish(table.next_address())
    }

    /// Append one record
    pub fn add(&mut self, record: &ObjectRecord) -> Result<()> {
        let data = bincode::serialize(record)?;
        let len = u32::try_from(data.len()).map_err(|_| {
            H5Error::Storage(format!(
                "record {} is too large to snapshot ({} bytes)",
                record.address,
                data.len()
            ))
        })?;
        let len_bytes = len.to_le_bytes();

        self.writer.write_all(&len_bytes)?;
        self.writer.write_all(&data)?;
        self.hasher.update(&len_bytes);
        self.hasher.update(&data);

        self.record_count += 1;
        Ok(())
    }

    /// Write the footer, patch the header and move the file into place
    pub fn finish(mut self, next_address: Address) -> Result<()> {
        let header = encode_header(self.record_count, next_address);

        // Checksum covers the header followed by the record block
        let mut crc = crc32fast::Hasher::new();
        crc.update(&header);
        crc.combine(&self.hasher);
        self.writer.write_all(&crc.finalize().to_le_bytes())?;
        self.writer.write_all(&[0u8; 4])?;
        self.writer.flush()?;

        let mut file = self.writer.into_inner().map_err(|e| {
            H5Error::Storage(format!("Failed to flush snapshot: {}", e))
        })?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&header)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.tmp_path, &self.path)?;

        debug!(
            path = %self.path.display(),
            records = self.record_count,
            next_address,
            "Snapshot written"
        );
        Ok(())
    }
}

fn encode_header(record_count: u64, next_address: Address) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    let mut buf = &mut header[..];
    buf.put_slice(MAGIC);
    buf.put_u16_le(VERSION);
    buf.put_u64_le(record_count);
    buf.put_u64_le(next_address);
    header
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
