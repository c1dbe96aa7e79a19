//! # kindstore
//!
//! A typed-object store over an ordered key-value backend:
//! - Records of many kinds share one keyspace, partitioned by `kind_` prefix
//! - Filtering, sorting and pagination over a kind's records
//! - Pluggable backends: a durable engine (WAL + SSTables) or in-memory
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Store<B>                              │
//! │        get / save / delete / clear / list / count            │
//! └──────┬──────────────────┬──────────────────────┬────────────┘
//!        │                  │                      │
//!        ▼                  ▼                      ▼
//!   ┌──────────┐     ┌─────────────┐        ┌─────────────┐
//!   │   Key    │     │   Record    │        │    Query    │
//!   │  Scheme  │     │   Codec     │        │ filter/sort │
//!   └──────────┘     └─────────────┘        └─────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────────────┐
//! │                    Backend (trait)                           │
//! │         get / put / delete / scan(prefix) / clear            │
//! └──────┬───────────────────────────────────────┬──────────────┘
//!        │                                       │
//!        ▼                                       ▼
//!   ┌─────────────┐                       ┌─────────────┐
//!   │   Engine    │                       │   Memory    │
//!   │ WAL+MemTable│                       │  (BTreeMap) │
//!   │ +SSTables   │                       └─────────────┘
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod memtable;
pub mod storage;
pub mod engine;
pub mod backend;

pub mod key;
pub mod record;
pub mod query;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use backend::{Backend, EngineBackend, MemoryBackend};
pub use config::Config;
pub use engine::Engine;
pub use error::{BackendError, BackendResult, StoreError, StoreResult};
pub use query::{Direction, Operator, Query};
pub use record::Record;
pub use store::{ListOptions, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kindstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
