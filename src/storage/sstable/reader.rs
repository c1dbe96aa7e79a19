//! SSTable Reader
//!
//! Opens SSTable files and provides O(log n) key lookups via in-memory index.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{BackendError, BackendResult};

use super::iterator::SSTableIterator;
use super::{le_u16, le_u32, le_u64, FOOTER_SIZE, HEADER_SIZE, MAGIC, TOMBSTONE_MARKER, VERSION};

/// Reader for SSTable files with in-memory index for O(log n) lookups
pub struct SSTableReader {
    path: PathBuf,
    file: BufReader<File>,
    /// In-memory index: key → file offset
    index: BTreeMap<Vec<u8>, u64>,
    entry_count: u64,
    /// Index block starting offset (end of data block)
    index_offset: u64,
}

impl SSTableReader {
    /// Open an SSTable for reading
    ///
    /// Validates header and data CRC, then loads the whole index into memory.
    pub fn open(path: &Path) -> BackendResult<Self> {
        let mut file = File::open(path)?;
        let file_size = file.metadata()?.len();

        if file_size < HEADER_SIZE + FOOTER_SIZE {
            return Err(BackendError::Storage(format!(
                "SSTable {} is too short ({} bytes)",
                path.display(),
                file_size
            )));
        }

        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(BackendError::Storage(format!(
                "Invalid SSTable magic in {}: got {:?}",
                path.display(),
                &header[0..4]
            )));
        }

        let version = le_u16(&header[4..6]);
        if version != VERSION {
            return Err(BackendError::Storage(format!(
                "Unsupported SSTable version {} in {}",
                version,
                path.display()
            )));
        }

        let entry_count = le_u64(&header[6..14]);

        file.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))?;
        let mut footer = [0u8; FOOTER_SIZE as usize];
        file.read_exact(&mut footer)?;

        let index_offset = le_u64(&footer[0..8]);
        let stored_crc = le_u32(&footer[8..12]);

        if index_offset < HEADER_SIZE || index_offset > file_size - FOOTER_SIZE {
            return Err(BackendError::Storage(format!(
                "SSTable {} has an out-of-range index offset {}",
                path.display(),
                index_offset
            )));
        }

        // Data block CRC
        file.seek(SeekFrom::Start(HEADER_SIZE))?;
        let mut hasher = crc32fast::Hasher::new();
        let mut remaining = index_offset - HEADER_SIZE;
        let mut chunk = vec![0u8; 64 * 1024];
        while remaining > 0 {
            let n = remaining.min(chunk.len() as u64) as usize;
            file.read_exact(&mut chunk[..n])?;
            hasher.update(&chunk[..n]);
            remaining -= n as u64;
        }
        let actual_crc = hasher.finalize();
        if actual_crc != stored_crc {
            return Err(BackendError::Storage(format!(
                "SSTable {} data CRC mismatch: stored {:08x}, computed {:08x}",
                path.display(),
                stored_crc,
                actual_crc
            )));
        }

        // The index block follows the data block directly
        let index_block_size = file_size - FOOTER_SIZE - index_offset;
        let mut index_data = vec![0u8; index_block_size as usize];
        file.read_exact(&mut index_data)?;

        // [key_len(4)][offset(8)][key]
        let mut index = BTreeMap::new();
        let mut pos = 0;
        while pos + 12 <= index_data.len() {
            let key_len = le_u32(&index_data[pos..pos + 4]) as usize;
            let offset = le_u64(&index_data[pos + 4..pos + 12]);
            pos += 12;

            if pos + key_len > index_data.len() {
                return Err(BackendError::Storage(format!(
                    "SSTable {} index block is truncated",
                    path.display()
                )));
            }
            index.insert(index_data[pos..pos + key_len].to_vec(), offset);
            pos += key_len;
        }

        if index.len() as u64 != entry_count {
            return Err(BackendError::Storage(format!(
                "SSTable {} header says {} entries, index has {}",
                path.display(),
                entry_count,
                index.len()
            )));
        }

        file.seek(SeekFrom::Start(0))?;

        Ok(Self {
            path: path.to_path_buf(),
            file: BufReader::new(file),
            index,
            entry_count,
            index_offset,
        })
    }

    /// Get a value by key, O(log n) via the in-memory index
    ///
    /// Returns:
    /// - `Ok(None)`: key not in this SSTable
    /// - `Ok(Some(None))`: key found as a tombstone
    /// - `Ok(Some(Some(value)))`: key found with value
    pub fn get(&mut self, key: &[u8]) -> BackendResult<Option<Option<Vec<u8>>>> {
        let offset = match self.index.get(key) {
            Some(&off) => off,
            None => return Ok(None),
        };

        self.file.seek(SeekFrom::Start(offset))?;

        let mut header = [0u8; 8];
        self.file.read_exact(&mut header)?;

        let key_len = le_u32(&header[0..4]) as i64;
        let val_len = le_u32(&header[4..8]);

        self.file.seek(SeekFrom::Current(key_len))?;

        if val_len == TOMBSTONE_MARKER {
            return Ok(Some(None));
        }

        let mut value = vec![0u8; val_len as usize];
        self.file.read_exact(&mut value)?;

        Ok(Some(Some(value)))
    }

    /// All entries whose key starts with `prefix`, in key order
    ///
    /// Seeks straight to the first candidate through the index.
    pub fn scan_prefix(&mut self, prefix: &[u8]) -> BackendResult<Vec<(Vec<u8>, Option<Vec<u8>>)>> {
        let start = match self.index.range(prefix.to_vec()..).next() {
            Some((key, &offset)) if key.starts_with(prefix) => offset,
            _ => return Ok(Vec::new()),
        };

        let mut out = Vec::new();
        for item in SSTableIterator::new(&mut self.file, start, self.index_offset)? {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            out.push((key, value));
        }
        Ok(out)
    }

    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn min_key(&self) -> Option<&[u8]> {
        self.index.keys().next().map(|k| k.as_slice())
    }

    pub fn max_key(&self) -> Option<&[u8]> {
        self.index.keys().next_back().map(|k| k.as_slice())
    }

    /// False only if the key is definitely outside [min_key, max_key]
    pub fn might_contain(&self, key: &[u8]) -> bool {
        match (self.min_key(), self.max_key()) {
            (Some(min), Some(max)) => key >= min && key <= max,
            _ => false,
        }
    }

    /// Iterate over all entries
    pub fn iter(&mut self) -> BackendResult<SSTableIterator<'_>> {
        SSTableIterator::new(&mut self.file, HEADER_SIZE, self.index_offset)
    }
}
