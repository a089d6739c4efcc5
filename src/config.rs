//! Configuration for h5node
//!
//! Per-file storage settings with sensible defaults.

/// Storage configuration applied when a file is opened
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Journal Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the journal
    pub journal_sync: SyncStrategy,

    // -------------------------------------------------------------------------
    // Checkpoint Configuration
    // -------------------------------------------------------------------------
    /// Number of journal entries after which the journal is folded into a
    /// fresh snapshot and truncated
    pub checkpoint_threshold: usize,

    /// Write a snapshot when the file is closed (or dropped)
    pub checkpoint_on_close: bool,

    // -------------------------------------------------------------------------
    // Link Traversal
    // -------------------------------------------------------------------------
    /// Maximum number of soft/external links followed while resolving one path
    pub max_link_depth: usize,
}

/// Journal sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            journal_sync: SyncStrategy::EveryNEntries { count: 100 },
            checkpoint_threshold: 1024,
            checkpoint_on_close: true,
            max_link_depth: 16,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the journal sync strategy
    pub fn journal_sync(mut self, strategy: SyncStrategy) -> Self {
        self.config.journal_sync = strategy;
        self
    }

    /// Set how many journal entries trigger a checkpoint
    pub fn checkpoint_threshold(mut self, entries: usize) -> Self {
        self.config.checkpoint_threshold = entries;
        self
    }

    /// Enable or disable the checkpoint written at close
    pub fn checkpoint_on_close(mut self, enabled: bool) -> Self {
        self.config.checkpoint_on_close = enabled;
        self
    }

    /// Set the soft/external link traversal limit
    pub fn max_link_depth(mut self, depth: usize) -> Self {
        self.config.max_link_depth = depth;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
