//! WAL Reader
//!
//! Sequential reads from a WAL file. A torn tail (partial header or body)
//! reads as end-of-log; a CRC failure is an error.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::BackendResult;

use super::entry::{parse_header, HEADER_SIZE};
use super::WalEntry;

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,
    /// Offset just past the last entry returned
    position: u64,
    file_len: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> BackendResult<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            file_len,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns `Ok(None)` at end of log, including when the remaining bytes
    /// are an incomplete entry.
    pub fn next_entry(&mut self) -> BackendResult<Option<WalEntry>> {
        let mut header = [0u8; HEADER_SIZE];
        if !read_fully(&mut self.reader, &mut header)? {
            return Ok(None);
        }
        let (lsn, crc, body_len) = parse_header(&header)?;

        // Guard against a garbage length field asking for a huge allocation
        let remaining = self.file_len.saturating_sub(self.position + HEADER_SIZE as u64);
        if body_len as u64 > remaining {
            return Ok(None);
        }

        let mut body = vec![0u8; body_len];
        if !read_fully(&mut self.reader, &mut body)? {
            return Ok(None);
        }

        let entry = WalEntry::from_parts(lsn, crc, &body)?;
        self.position += (HEADER_SIZE + body_len) as u64;
        Ok(Some(entry))
    }

    /// Iterate over all valid entries
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }

    /// Offset just past the last successfully read entry
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }
}

/// Iterator over WAL entries; stops after the first error
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = BackendResult<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// `read_exact` that reports a short read as `false` instead of an error
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> BackendResult<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}
