//! Storage Manager
//!
//! Manages the set of SSTables and coordinates reads, flushes and wipes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::{BackendError, BackendResult};
use crate::memtable::{MemTable, MemTableEntry};

use super::{SSTable, SSTableBuilder, SSTableReader};

/// Manages the storage layer
///
/// ## Concurrency:
/// - `sstables`: Protected by RwLock
/// - `next_sstable_id`: Atomic counter (lock-free)
/// - All methods use `&self`
pub struct StorageManager {
    /// Directory where SSTables are stored
    data_dir: PathBuf,

    /// Open SSTable readers, ordered newest → oldest
    sstables: RwLock<Vec<SSTableReader>>,

    next_sstable_id: AtomicU64,
}

impl StorageManager {
    /// Open or create storage in the given directory
    ///
    /// Discovers `sstable_NNNNNN.sst` files and opens them newest first.
    pub fn open(path: &Path) -> BackendResult<Self> {
        fs::create_dir_all(path)?;

        let mut sstable_ids: Vec<u64> = Vec::new();
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.is_file() {
                if let Some(id) = Self::parse_sstable_id(&file_path) {
                    sstable_ids.push(id);
                }
            }
        }

        // Highest ID first
        sstable_ids.sort_unstable_by(|a, b| b.cmp(a));

        let mut sstables = Vec::with_capacity(sstable_ids.len());
        for id in &sstable_ids {
            sstables.push(SSTableReader::open(&Self::sstable_path_with_dir(path, *id))?);
        }

        let next_id = sstable_ids.first().map(|&id| id + 1).unwrap_or(1);

        tracing::debug!("Loaded {} SSTables from {}", sstables.len(), path.display());

        Ok(Self {
            data_dir: path.to_path_buf(),
            sstables: RwLock::new(sstables),
            next_sstable_id: AtomicU64::new(next_id),
        })
    }

    /// Get a value by key (searches all SSTables newest → oldest)
    ///
    /// Returns `Ok(None)` when the key is absent or its newest entry is a
    /// tombstone.
    ///
    /// Takes the write lock because readers seek a shared file handle.
    pub fn get(&self, key: &[u8]) -> BackendResult<Option<Vec<u8>>> {
        let mut sstables = self.sstables.write();

        for reader in sstables.iter_mut() {
            if !reader.might_contain(key) {
                continue;
            }
            if let Some(found) = reader.get(key)? {
                return Ok(found);
            }
        }

        Ok(None)
    }

    /// Merge every SSTable's entries under `prefix`, newest winning
    ///
    /// Tombstones are kept (as `None`) so the caller can overlay memtable
    /// state before dropping them.
    pub fn scan_prefix(&self, prefix: &[u8]) -> BackendResult<BTreeMap<Vec<u8>, Option<Vec<u8>>>> {
        let mut merged = BTreeMap::new();
        let mut sstables = self.sstables.write();

        // Oldest first so newer tables overwrite
        for reader in sstables.iter_mut().rev() {
            for (key, value) in reader.scan_prefix(prefix)? {
                merged.insert(key, value);
            }
        }

        Ok(merged)
    }

    /// Flush a MemTable to a new SSTable
    pub fn flush(&self, memtable: &MemTable) -> BackendResult<SSTable> {
        if memtable.is_empty() {
            return Err(BackendError::Storage(
                "Cannot flush empty MemTable".to_string(),
            ));
        }

        let id = self.next_sstable_id.fetch_add(1, Ordering::SeqCst);
        let path = self.sstable_path(id);

        let mut builder = SSTableBuilder::new(&path)?;
        for (key, entry) in memtable.iter() {
            match entry {
                MemTableEntry::Value(v) => builder.add(&key, &v)?,
                MemTableEntry::Tombstone => builder.add_tombstone(&key)?,
            }
        }
        let metadata = builder.finish()?;

        let reader = SSTableReader::open(&path)?;
        self.sstables.write().insert(0, reader);

        tracing::debug!(
            "Flushed {} entries to {} ({} bytes)",
            metadata.entry_count,
            metadata.path.display(),
            metadata.file_size
        );

        Ok(metadata)
    }

    /// Close and delete every SSTable
    pub fn clear(&self) -> BackendResult<()> {
        let mut sstables = self.sstables.write();
        let paths: Vec<PathBuf> = sstables.iter().map(|r| r.path().to_path_buf()).collect();

        // Drop the readers (and their file handles) before unlinking
        sstables.clear();
        for path in &paths {
            fs::remove_file(path)?;
        }

        tracing::debug!("Removed {} SSTables from {}", paths.len(), self.data_dir.display());
        Ok(())
    }

    pub fn sstable_count(&self) -> usize {
        self.sstables.read().len()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// ID the next flush will use
    pub fn next_sstable_id(&self) -> u64 {
        self.next_sstable_id.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn sstable_path(&self, id: u64) -> PathBuf {
        Self::sstable_path_with_dir(&self.data_dir, id)
    }

    fn sstable_path_with_dir(dir: &Path, id: u64) -> PathBuf {
        dir.join(format!("sstable_{:06}.sst", id))
    }

    /// "sstable_000042.sst" → Some(42)
    fn parse_sstable_id(path: &Path) -> Option<u64> {
        if path.extension()? != "sst" {
            return None;
        }
        let name = path.file_stem()?.to_string_lossy();
        name.strip_prefix("sstable_")?.parse().ok()
    }
}
