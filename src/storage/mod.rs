//! Storage Module
//!
//! Persistent storage layer: immutable sorted tables produced by memtable
//! flushes, read newest to oldest.
//!
//! There is no compaction; tombstones stay on disk until `clear`.

mod sstable;
mod manager;

pub use sstable::{SSTable, SSTableBuilder, SSTableIterator, SSTableReader};
pub use manager::StorageManager;
