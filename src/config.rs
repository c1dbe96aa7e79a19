//! Engine configuration
//!
//! A store only needs a data directory. The remaining knobs trade write
//! latency against how much the WAL has to replay after a crash.

use std::path::{Path, PathBuf};

/// Log file name inside the data directory
pub const WAL_FILENAME: &str = "wal.log";

/// Subdirectory holding SSTable files
pub const SSTABLE_DIR: &str = "sstables";

const DEFAULT_DATA_DIR: &str = "./kindstore_data";
const DEFAULT_MEMTABLE_LIMIT: usize = 64 * 1024 * 1024;
const DEFAULT_SYNC_EVERY: usize = 100;

/// When the WAL is fsynced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// Every append is durable before it returns
    EveryWrite,

    /// At most `count` appends can be lost on power failure
    EveryNEntries { count: usize },
}

impl Default for WalSyncStrategy {
    fn default() -> Self {
        WalSyncStrategy::EveryNEntries {
            count: DEFAULT_SYNC_EVERY,
        }
    }
}

/// Settings read by [`Engine::open`](crate::engine::Engine::open)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Holds `wal.log` and `sstables/`
    pub data_dir: PathBuf,
    pub wal_sync_strategy: WalSyncStrategy,
    /// Approximate memtable bytes that trigger a flush to an SSTable
    pub memtable_size_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::at(DEFAULT_DATA_DIR)
    }
}

impl Config {
    /// Default settings rooted at `data_dir`
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            wal_sync_strategy: WalSyncStrategy::default(),
            memtable_size_limit: DEFAULT_MEMTABLE_LIMIT,
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn wal_path(&self) -> PathBuf {
        wal_path(&self.data_dir)
    }

    pub fn sstable_dir(&self) -> PathBuf {
        self.data_dir.join(SSTABLE_DIR)
    }
}

/// Location of the WAL for a data directory
pub fn wal_path(data_dir: &Path) -> PathBuf {
    data_dir.join(WAL_FILENAME)
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Flush threshold in bytes
    pub fn memtable_size_limit(mut self, size: usize) -> Self {
        self.config.memtable_size_limit = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
