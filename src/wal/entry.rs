//! WAL Entry definitions
//!
//! On-disk layout of one entry:
//! `[LSN u64][CRC32 u32][body_len u32][body]`, all little-endian. The body is
//! bincode of the operation plus its timestamp; the CRC covers the body only.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendResult};

/// Header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to perform
    pub operation: Operation,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },
}

/// The CRC-protected part of an entry
#[derive(Serialize, Deserialize)]
struct EntryBody {
    operation: Operation,
    timestamp: u64,
}

/// Borrowed twin of `EntryBody` so encoding doesn't clone the operation
#[derive(Serialize)]
struct EntryBodyRef<'a> {
    operation: &'a Operation,
    timestamp: u64,
}

impl WalEntry {
    /// Create an entry stamped with the current wall-clock time
    pub fn new(lsn: u64, operation: Operation) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            lsn,
            operation,
            timestamp,
        }
    }

    /// Serialize to the on-disk representation (header + body)
    pub fn serialize(&self) -> BackendResult<Vec<u8>> {
        let body = self.encode_body()?;
        let crc = crc32fast::hash(&body);

        let mut bytes = Vec::with_capacity(HEADER_SIZE + body.len());
        bytes.extend_from_slice(&self.lsn.to_le_bytes());
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Parse one entry from the front of `bytes`
    ///
    /// Fails with `WalCorruption` on a short buffer, CRC mismatch, or an
    /// undecodable body.
    pub fn deserialize(bytes: &[u8]) -> BackendResult<Self> {
        let (lsn, crc, body_len) = parse_header(bytes)?;

        let end = HEADER_SIZE + body_len;
        if bytes.len() < end {
            return Err(BackendError::WalCorruption(format!(
                "entry {} truncated: expected {} body bytes, got {}",
                lsn,
                body_len,
                bytes.len() - HEADER_SIZE
            )));
        }

        Self::from_parts(lsn, crc, &bytes[HEADER_SIZE..end])
    }

    /// Build an entry from an already-split header and body
    pub(crate) fn from_parts(lsn: u64, crc: u32, body: &[u8]) -> BackendResult<Self> {
        let actual = crc32fast::hash(body);
        if actual != crc {
            return Err(BackendError::WalCorruption(format!(
                "CRC mismatch for entry {}: stored {:08x}, computed {:08x}",
                lsn, crc, actual
            )));
        }

        let body: EntryBody = bincode::deserialize(body).map_err(|e| {
            BackendError::WalCorruption(format!("entry {} has an unreadable body: {}", lsn, e))
        })?;

        Ok(Self {
            lsn,
            operation: body.operation,
            timestamp: body.timestamp,
        })
    }

    /// CRC32 of the serialized body
    pub fn compute_crc(&self) -> BackendResult<u32> {
        Ok(crc32fast::hash(&self.encode_body()?))
    }

    /// Total bytes `serialize` will produce
    pub fn serialized_size(&self) -> BackendResult<usize> {
        let body = EntryBodyRef {
            operation: &self.operation,
            timestamp: self.timestamp,
        };
        let body_len = bincode::serialized_size(&body)
            .map_err(|e| BackendError::Serialization(e.to_string()))?;
        Ok(HEADER_SIZE + body_len as usize)
    }

    /// The key this entry touches
    pub fn key(&self) -> &[u8] {
        match &self.operation {
            Operation::Put { key, .. } | Operation::Delete { key } => key,
        }
    }

    fn encode_body(&self) -> BackendResult<Vec<u8>> {
        let body = EntryBodyRef {
            operation: &self.operation,
            timestamp: self.timestamp,
        };
        bincode::serialize(&body).map_err(|e| BackendError::Serialization(e.to_string()))
    }
}

/// Split a header into (lsn, crc, body_len)
pub(crate) fn parse_header(bytes: &[u8]) -> BackendResult<(u64, u32, usize)> {
    if bytes.len() < HEADER_SIZE {
        return Err(BackendError::WalCorruption(format!(
            "incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut lsn = [0u8; 8];
    let mut crc = [0u8; 4];
    let mut len = [0u8; 4];
    lsn.copy_from_slice(&bytes[0..8]);
    crc.copy_from_slice(&bytes[8..12]);
    len.copy_from_slice(&bytes[12..16]);

    Ok((
        u64::from_le_bytes(lsn),
        u32::from_le_bytes(crc),
        u32::from_le_bytes(len) as usize,
    ))
}
