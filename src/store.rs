//! Storage Facade
//!
//! [`Store`] composes the key scheme, the record codec and the query engine
//! over any [`Backend`]. It keeps no state besides the backend handle and
//! takes no locks; concurrent calls interleave at backend-key granularity.
//!
//! `list` and `count` scan the kind's whole key range, decode every record,
//! then filter, sort and paginate in memory. The typed calls match against
//! the decoded record; the `*_documents` calls match the stored JSON.
//! Records that fail to decode are logged and skipped rather than failing
//! the scan.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::backend::{Backend, EngineBackend};
use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::key::{display_key, key_for, kind_prefix, parse_key};
use crate::query::{comparator, Direction, Query};
use crate::record::{self, Record};

/// Filter, sort and pagination parameters for `list`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Records to skip after filtering and sorting
    pub offset: usize,
    /// Maximum records to return; `None` is unbounded
    pub limit: Option<usize>,
    pub query: Option<Query>,
    /// Field path to sort by; scan (key) order when `None`
    pub order_by: Option<String>,
    pub direction: Direction,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(field.into());
        self.direction = direction;
        self
    }
}

/// Typed-object store over a key-value backend
pub struct Store<B: Backend> {
    backend: B,
}

impl Store<EngineBackend> {
    /// Open the durable engine under `config.data_dir`
    pub async fn open(config: Config) -> StoreResult<Self> {
        Ok(Self::new(EngineBackend::open(config).await?))
    }
}

impl<B: Backend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Close the backend handle
    pub async fn close(self) -> StoreResult<()> {
        self.backend.close().await?;
        Ok(())
    }

    // =========================================================================
    // Typed API
    // =========================================================================

    /// Fetch the record of type `T` with the given id
    ///
    /// Fails with [`StoreError::NotFound`] if there is none and
    /// [`StoreError::Decode`] if the stored payload doesn't parse.
    pub async fn get<T: Record>(&self, id: &str) -> StoreResult<T> {
        let key = key_for(T::KIND, id)?;
        let payload = self.fetch(&key).await?;
        record::decode(&key, &payload)
    }

    /// Insert or fully overwrite a record
    pub async fn save<T: Record>(&self, record: &T) -> StoreResult<()> {
        let key = key_for(T::KIND, record.id())?;
        let payload = record::encode(record)?;
        self.backend.put(&key, &payload).await?;
        tracing::debug!("Saved {}", display_key(&key));
        Ok(())
    }

    /// Remove a record; removing an absent record succeeds
    pub async fn delete<T: Record>(&self, record: &T) -> StoreResult<()> {
        self.delete_by_id(T::KIND, record.id()).await
    }

    /// Remove every record of every kind
    ///
    /// Fails with [`StoreError::Unsupported`] on backends without a bulk wipe.
    pub async fn clear(&self) -> StoreResult<()> {
        self.backend.clear().await?;
        tracing::debug!("Cleared store");
        Ok(())
    }

    /// Records of type `T` matching `options`
    pub async fn list<T: Record>(&self, options: &ListOptions) -> StoreResult<Vec<T>> {
        let rows = self.scan_kind::<T>(options.query.as_ref()).await?;
        Ok(paginate(sort(rows, options), options)
            .into_iter()
            .map(|row| row.item)
            .collect())
    }

    /// Number of records of type `T` matching `query`
    ///
    /// Always equals the length of `list` with the same query and no
    /// pagination.
    pub async fn count<T: Record>(&self, query: Option<&Query>) -> StoreResult<usize> {
        Ok(self.scan_kind::<T>(query).await?.len())
    }

    // =========================================================================
    // Schemaless API (kind named at runtime)
    // =========================================================================

    pub async fn get_document(&self, kind: &str, id: &str) -> StoreResult<Value> {
        let key = key_for(kind, id)?;
        let payload = self.fetch(&key).await?;
        record::decode_document(&key, &payload)
    }

    pub async fn delete_by_id(&self, kind: &str, id: &str) -> StoreResult<()> {
        let key = key_for(kind, id)?;
        self.backend.delete(&key).await?;
        tracing::debug!("Deleted {}", display_key(&key));
        Ok(())
    }

    pub async fn list_documents(&self, kind: &str, options: &ListOptions) -> StoreResult<Vec<Value>> {
        let rows = self.scan_documents(kind, options.query.as_ref()).await?;
        Ok(paginate(sort(rows, options), options)
            .into_iter()
            .map(|row| row.document)
            .collect())
    }

    pub async fn count_documents(&self, kind: &str, query: Option<&Query>) -> StoreResult<usize> {
        Ok(self.scan_documents(kind, query).await?.len())
    }

    /// Record count per kind across the whole keyspace
    ///
    /// Keys that don't follow the `kind_id` layout are logged and skipped.
    pub async fn kinds(&self) -> StoreResult<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for (key, _) in self.backend.scan(&[]).await? {
            match parse_key(&key) {
                Some((kind, _)) => *counts.entry(kind.to_string()).or_insert(0) += 1,
                None => tracing::warn!("Skipping foreign key {}", display_key(&key)),
            }
        }
        Ok(counts)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn fetch(&self, key: &[u8]) -> StoreResult<Vec<u8>> {
        self.backend
            .get(key)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                key: display_key(key),
            })
    }

    /// Typed rows: filtering and sorting see the decoded record
    async fn scan_kind<T: Record>(&self, query: Option<&Query>) -> StoreResult<Vec<Row<T>>> {
        self.scan(T::KIND, query, |key, payload| {
            let item: T = record::decode(key, payload)?;
            let document = record::to_document(&item)?;
            Ok(Row { document, item })
        })
        .await
    }

    /// Schemaless rows: the stored JSON as-is
    async fn scan_documents(&self, kind: &str, query: Option<&Query>) -> StoreResult<Vec<Row<()>>> {
        self.scan(kind, query, |key, payload| {
            Ok(Row {
                document: record::decode_document(key, payload)?,
                item: (),
            })
        })
        .await
    }

    /// Scan one kind's key range, keeping matching rows in key order
    ///
    /// Entries that `materialize` rejects are logged and skipped. A key
    /// outside the kind's prefix aborts the scan with
    /// [`StoreError::Corruption`].
    async fn scan<X, F>(&self, kind: &str, query: Option<&Query>, materialize: F) -> StoreResult<Vec<Row<X>>>
    where
        F: Fn(&[u8], &[u8]) -> StoreResult<Row<X>>,
    {
        let prefix = kind_prefix(kind)?;
        let entries = self.backend.scan(&prefix).await?;
        let scanned = entries.len();

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for (key, payload) in entries {
            if !key.starts_with(&prefix) {
                return Err(StoreError::Corruption {
                    kind: kind.to_string(),
                    key: display_key(&key),
                });
            }

            let row = match materialize(&key, &payload) {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!("Skipping undecodable record: {}", e);
                    skipped += 1;
                    continue;
                }
            };

            if query.map_or(true, |q| q.matches(&row.document)) {
                rows.push(row);
            }
        }

        tracing::debug!(
            "Scanned kind '{}': {} entries, {} matched, {} skipped",
            kind,
            scanned,
            rows.len(),
            skipped
        );
        Ok(rows)
    }
}

impl<B: Backend + std::fmt::Debug> std::fmt::Debug for Store<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("backend", &self.backend).finish()
    }
}

/// A scanned record: the document queries see, plus the decoded item
struct Row<X> {
    document: Value,
    item: X,
}

/// Stable sort by `order_by`, if any
fn sort<X>(mut rows: Vec<Row<X>>, options: &ListOptions) -> Vec<Row<X>> {
    if let Some(field) = &options.order_by {
        let cmp = comparator(field, options.direction);
        rows.sort_by(|a, b| cmp(&a.document, &b.document));
    }
    rows
}

/// Slice `[offset, offset + limit)`, clamped
fn paginate<X>(rows: Vec<Row<X>>, options: &ListOptions) -> Vec<Row<X>> {
    let limit = options.limit.unwrap_or(usize::MAX);
    rows.into_iter().skip(options.offset).take(limit).collect()
}
