//! Record capability and codec.
//!
//! A [`Record`] is any serde-serializable type with a fixed kind and a
//! per-instance id. The stored payload is the record's JSON text.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::key::display_key;

/// A type that can be stored
///
/// ```
/// use kindstore::Record;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Account {
///     id: String,
///     email: String,
/// }
///
/// impl Record for Account {
///     const KIND: &'static str = "account";
///
///     fn id(&self) -> &str {
///         &self.id
///     }
/// }
/// ```
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Type discriminator and key-space partition; must not contain `_`
    const KIND: &'static str;

    /// Unique within the kind
    fn id(&self) -> &str;
}

/// Serialize a record to its stored payload
pub fn encode<T: Record>(record: &T) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(record).map_err(|source| StoreError::Encode {
        key: format!("{}_{}", T::KIND, record.id()),
        source,
    })
}

/// Parse a stored payload into a record
pub fn decode<T: Record>(key: &[u8], payload: &[u8]) -> StoreResult<T> {
    decode_as(key, payload)
}

/// Parse a stored payload without a target type
pub fn decode_document(key: &[u8], payload: &[u8]) -> StoreResult<Value> {
    decode_as(key, payload)
}

/// The document form of a decoded record
///
/// Queries and sorting see this rather than the raw payload, so fields the
/// decoder fills in (serde defaults, renamed legacy fields) are visible.
pub fn to_document<T: Record>(record: &T) -> StoreResult<Value> {
    serde_json::to_value(record).map_err(|source| StoreError::Encode {
        key: format!("{}_{}", T::KIND, record.id()),
        source,
    })
}

fn decode_as<T: DeserializeOwned>(key: &[u8], payload: &[u8]) -> StoreResult<T> {
    serde_json::from_slice(payload).map_err(|source| StoreError::Decode {
        key: display_key(key),
        source,
    })
}
