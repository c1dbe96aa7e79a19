//! Write-Ahead Log (WAL) Module
//!
//! Every engine mutation is appended here before it touches the memtable.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ Entry 1                                  │
//! │ ┌─────────┬─────────┬────────┬─────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │  Body   │ │
//! │ └─────────┴─────────┴────────┴─────────┘ │
//! ├──────────────────────────────────────────┤
//! │ Entry 2 ...                              │
//! └──────────────────────────────────────────┘
//! ```
//! Body = bincode(operation, timestamp). CRC32 covers the body.

mod entry;
mod writer;
mod reader;
mod recovery;

pub use entry::{WalEntry, Operation, HEADER_SIZE};
pub use writer::WalWriter;
pub use reader::{WalReader, WalIterator};
pub use recovery::{WalRecovery, RecoveryResult};
