//! # h5node
//!
//! A typed, hierarchical container library in the HDF5 object model:
//! - Files, groups, datasets and attributes addressed by slash paths
//! - Hard, soft and external links, with identity-based handle equality
//! - Typed multi-dimensional I/O through `ndarray`
//! - Journaled storage with crash recovery
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 File / Group / DataSet / Attribute           │
//! │               (path resolution, links, typed I/O)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  one batch per mutation
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Container                             │
//! │                 (one per open file, RwLock)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Journal   │          │ ObjectTable │
//!   │  (Append)   │          │ (in memory) │
//!   └─────────────┘          └──────┬──────┘
//!                                   │ checkpoint
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Snapshot   │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use h5node::{File, LinkType, TypeDescriptor};
//!
//! # fn main() -> h5node::Result<()> {
//! let file = File::create("data.h5n")?;
//! let group = file.create_group("experiments/run1")?;
//! let dataset = group.create_dataset("samples", [2, 3], TypeDescriptor::double())?;
//! dataset.write(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
//!
//! file.create_link(&dataset, "latest", LinkType::Soft)?;
//! assert_eq!(file.get_dataset("latest")?, dataset);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod journal;
pub mod node;
pub mod storage;
pub mod types;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, SyncStrategy};
pub use error::{H5Error, Result};
pub use node::{
    Attribute, DataSet, File, Group, LinkInfo, LinkType, Linkable, Object, ObjectId, ObjectInfo,
    ObjectType, OpenFlags, Selection,
};
pub use types::{
    Complex, Complex32, Complex64, DataSpace, Element, TypeClass, TypeDescriptor, MAX_ELEMENTS,
    UNLIMITED,
};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of h5node
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
