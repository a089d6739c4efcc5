//! Storage Module
//!
//! Persistent object store behind every open file.
//!
//! ## Responsibilities
//! - Hold every object record of a file in memory, keyed by address
//! - Journal each mutation before applying it
//! - Fold the journal into a snapshot on checkpoint
//! - Recover from the snapshot plus journal on open
//!
//! ## On-disk layout
//! A file at `P` is the snapshot `P` plus the journal `P.journal`. The
//! snapshot is always replaced whole (written to `P.tmp`, then renamed), so
//! a crash leaves either the old or the new snapshot in place and the
//! journal replays on top of it.

mod container;
mod record;
mod snapshot;
mod table;

pub use container::Container;
pub use record::{
    Address, AttributeRecord, LinkRecord, LinkTarget, ObjectBody, ObjectRecord, ROOT_ADDRESS,
};
pub use snapshot::{SnapshotBuilder, SnapshotReader};
pub use table::ObjectTable;
