//! Snapshot Module
//!
//! Immutable on-disk image of a file's object table.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Header (22 bytes)                                                │
//! │   Magic: "H5ND" (4) | Version: u16 (2) | Count: u64 (8)          │
//! │   NextAddress: u64 (8)                                           │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ Record Block (variable)                                          │
//! │   [Len: u32][bincode ObjectRecord]                               │
//! │   ... repeated for each record, in address order ...             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ Footer (8 bytes)                                                 │
//! │   CRC: u32 (4) over header + records | Padding (4)               │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

mod builder;
mod reader;

pub use builder::SnapshotBuilder;
pub use reader::SnapshotReader;

/// Magic bytes identifying an h5node snapshot
pub(crate) const MAGIC: &[u8; 4] = b"H5ND";

/// Current snapshot format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + Count (8) + NextAddress (8)
pub(crate) const HEADER_SIZE: usize = 22;

/// Footer size: CRC (4) + Padding (4)
pub(crate) const FOOTER_SIZE: usize = 8;
