//! Journal Module
//!
//! Provides durability for object mutations through append-only logging.
//!
//! ## Responsibilities
//! - Append one entry per mutation before the mutation becomes visible
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Crash recovery and replay
//!
//! Every entry carries the full list of record operations of one mutation,
//! so replay either applies a mutation entirely or not at all.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! The CRC covers the LSN, the length and the data bytes.

mod entry;
mod reader;
mod recovery;
mod writer;

pub use entry::{JournalEntry, Operation, HEADER_SIZE};
pub use reader::JournalReader;
pub use recovery::{JournalRecovery, RecoveryResult};
pub use writer::JournalWriter;
