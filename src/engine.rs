//! Engine Module
//!
//! The durable ordered key-value engine behind [`EngineBackend`](crate::backend::EngineBackend).
//!
//! ## Responsibilities
//! - Coordinate WAL, MemTable, and Storage
//! - Handle concurrent read/write access
//! - Trigger flushes when MemTable is full
//! - Manage crash recovery on startup
//! - Ordered prefix scans across memtable and SSTables

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::BackendResult;
use crate::memtable::{MemTable, MemTableEntry};
use crate::storage::StorageManager;
use crate::wal::{Operation, WalRecovery, WalWriter};

/// The main storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (put/delete/flush/clear): Serialized by `write_lock`
///   - Must acquire: write_lock → WAL → memtable → storage
///
/// - **Reads** (get/scan): No write_lock
///   - MemTable uses an internal RwLock
///   - StorageManager takes its own lock for SSTable reads
///
/// Scans are not snapshots: a write that lands mid-scan may or may not be
/// observed.
pub struct Engine {
    config: Config,

    /// Directory for all SSTables
    storage_dir: PathBuf,

    wal: Mutex<WalWriter>,

    memtable: MemTable,

    storage: StorageManager,

    /// Serializes write operations
    write_lock: Mutex<()>,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Open/create data directory
    /// 2. Load existing SSTables
    /// 3. Recover from WAL if it exists, flush the recovered entries, truncate
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> BackendResult<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let storage_dir = config.sstable_dir();
        let wal_path = config.wal_path();

        let storage = StorageManager::open(&storage_dir)?;
        let memtable = MemTable::new();

        if wal_path.exists() {
            let (entries, recovery) = WalRecovery::recover(&wal_path)?;

            if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
                tracing::info!(
                    "WAL recovery: {} entries recovered, {} corrupted, last_lsn={}",
                    recovery.entries_recovered,
                    recovery.entries_corrupted,
                    recovery.last_lsn
                );
            }

            for entry in entries {
                match entry.operation {
                    Operation::Put { key, value } => {
                        memtable.put(key, value);
                    }
                    Operation::Delete { key } => {
                        memtable.delete(key);
                    }
                }
            }

            // Recovered data must be durable in an SSTable before the log goes
            if !memtable.is_empty() {
                tracing::info!("Flushing {} recovered entries to SSTable", memtable.entry_count());
                storage.flush(&memtable)?;
                memtable.clear();
            }
        }

        let mut wal = WalWriter::open(&wal_path, config.wal_sync_strategy)?;
        wal.truncate()?;

        tracing::info!(
            "Engine opened at {} ({} SSTables)",
            config.data_dir.display(),
            storage.sstable_count()
        );

        Ok(Self {
            config,
            storage_dir,
            wal: Mutex::new(wal),
            memtable,
            storage,
            write_lock: Mutex::new(()),
        })
    }

    /// Open with a path, default config otherwise
    pub fn open_path(path: &Path) -> BackendResult<Self> {
        Self::open(Config::at(path))
    }

    /// Get a value by key
    ///
    /// Search order:
    /// 1. MemTable (most recent writes)
    /// 2. SSTables (newest to oldest)
    pub fn get(&self, key: &[u8]) -> BackendResult<Option<Vec<u8>>> {
        if let Some(entry) = self.memtable.get(key) {
            return Ok(match entry {
                MemTableEntry::Value(value) => Some(value),
                MemTableEntry::Tombstone => None,
            });
        }

        self.storage.get(key)
    }

    /// Put a key-value pair
    pub fn put(&self, key: &[u8], value: &[u8]) -> BackendResult<()> {
        let _write_guard = self.write_lock.lock();

        self.wal.lock().append(Operation::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;

        let new_size = self.memtable.put(key.to_vec(), value.to_vec());
        if new_size >= self.config.memtable_size_limit {
            self.flush_internal()?;
        }

        Ok(())
    }

    /// Delete a key (absent keys are fine)
    pub fn delete(&self, key: &[u8]) -> BackendResult<()> {
        let _write_guard = self.write_lock.lock();

        self.wal.lock().append(Operation::Delete { key: key.to_vec() })?;

        let new_size = self.memtable.delete(key.to_vec());
        if new_size >= self.config.memtable_size_limit {
            self.flush_internal()?;
        }

        Ok(())
    }

    /// Live entries whose key starts with `prefix`, ascending by key
    ///
    /// The memtable is snapshotted before SSTables are read so that a flush
    /// racing with the scan cannot hide entries.
    pub fn scan(&self, prefix: &[u8]) -> BackendResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let recent = self.memtable.scan_prefix(prefix);
        let mut merged = self.storage.scan_prefix(prefix)?;

        for (key, entry) in recent {
            match entry {
                MemTableEntry::Value(v) => merged.insert(key, Some(v)),
                MemTableEntry::Tombstone => merged.insert(key, None),
            };
        }

        Ok(merged
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect())
    }

    /// Remove every key
    ///
    /// Not atomic with respect to crashes: a crash part-way may leave some
    /// SSTables behind.
    pub fn clear(&self) -> BackendResult<()> {
        let _write_guard = self.write_lock.lock();

        self.storage.clear()?;
        self.memtable.clear();
        self.wal.lock().truncate()?;

        tracing::info!("Engine cleared at {}", self.config.data_dir.display());
        Ok(())
    }

    /// Force a memtable flush regardless of size
    pub fn flush(&self) -> BackendResult<()> {
        let _write_guard = self.write_lock.lock();
        self.flush_internal()
    }

    /// Called with write lock held
    fn flush_internal(&self) -> BackendResult<()> {
        if self.memtable.is_empty() {
            return Ok(());
        }

        self.storage.flush(&self.memtable)?;
        self.memtable.clear();
        self.wal.lock().truncate()?;

        Ok(())
    }

    /// Flush pending data and fsync the WAL
    ///
    /// Safe to call more than once.
    pub fn close(&self) -> BackendResult<()> {
        self.flush()?;
        self.wal.lock().sync()?;
        tracing::debug!("Engine closed at {}", self.config.data_dir.display());
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn wal_path(&self) -> PathBuf {
        self.config.wal_path()
    }

    pub fn memtable_size(&self) -> usize {
        self.memtable.size()
    }

    pub fn memtable_entry_count(&self) -> usize {
        self.memtable.entry_count()
    }

    pub fn sstable_count(&self) -> usize {
        self.storage.sstable_count()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
