//! Journal reader
//!
//! Reads entries sequentially from a journal file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{H5Error, Result};

use super::entry::parse_header;
use super::{JournalEntry, HEADER_SIZE};

/// Outcome of reading one frame
pub(crate) enum Frame {
    Entry(JournalEntry),
    /// Clean end of file
    End,
    /// File ends inside a frame (partial write)
    Torn,
    /// Complete frame whose checksum or payload is bad
    Corrupt(H5Error),
}

/// Reads entries from a journal file
pub struct JournalReader {
    file: BufReader<File>,
    /// Offset of the next frame
    position: u64,
    file_len: u64,
}

impl JournalReader {
    /// Open a journal file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        Ok(Self {
            file: BufReader::new(file),
            position: 0,
            file_len,
        })
    }

    /// Read the next entry.
    ///
    /// Returns `Ok(None)` at a clean end of file and `JournalCorruption`
    /// for a torn or damaged frame.
    pub fn next_entry(&mut self) -> Result<Option<JournalEntry>> {
        match self.read_frame()? {
            Frame::Entry(entry) => Ok(Some(entry)),
            Frame::End => Ok(None),
            Frame::Torn => Err(H5Error::JournalCorruption(format!(
                "partial entry at offset {}",
                self.position
            ))),
            Frame::Corrupt(err) => Err(err),
        }
    }

    /// Offset just past the last entry read successfully
    pub fn position(&self) -> u64 {
        self.position
    }

    pub(crate) fn read_frame(&mut self) -> Result<Frame> {
        let remaining = self.file_len.saturating_sub(self.position);
        if remaining == 0 {
            return Ok(Frame::End);
        }
        if remaining < HEADER_SIZE as u64 {
            return Ok(Frame::Torn);
        }

        let mut frame = vec![0u8; HEADER_SIZE];
        if !self.fill(&mut frame)? {
            return Ok(Frame::Torn);
        }

        let (_, _, len) = parse_header(&frame)?;
        if remaining < (HEADER_SIZE as u64) + len as u64 {
            return Ok(Frame::Torn);
        }

        frame.resize(HEADER_SIZE + len as usize, 0);
        if !self.fill(&mut frame[HEADER_SIZE..])? {
            return Ok(Frame::Torn);
        }

        match JournalEntry::deserialize(&frame) {
            Ok(entry) => {
                self.position += frame.len() as u64;
                Ok(Frame::Entry(entry))
            }
            Err(err) => Ok(Frame::Corrupt(err)),
        }
    }

    /// `read_exact` that reports a short read as `false`
    fn fill(&mut self, buf: &mut [u8]) -> Result<bool> {
        match self.file.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl Iterator for JournalReader {
    type Item = Result<JournalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
