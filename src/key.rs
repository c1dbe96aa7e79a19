//! Key Scheme
//!
//! Every record lives at `kind ++ "_" ++ id`. Kinds may not contain the
//! separator, so each kind owns the contiguous key range starting with
//! `kind_` and no two kinds' ranges overlap. Ids are unrestricted.

use crate::error::{StoreError, StoreResult};

/// Byte between kind and id
pub const SEPARATOR: u8 = b'_';

/// Reject kinds that would break prefix partitioning
pub fn validate_kind(kind: &str) -> StoreResult<()> {
    if kind.is_empty() || kind.as_bytes().contains(&SEPARATOR) {
        return Err(StoreError::InvalidKind(kind.to_string()));
    }
    Ok(())
}

/// Backend key for a record
pub fn key_for(kind: &str, id: &str) -> StoreResult<Vec<u8>> {
    let mut key = kind_prefix(kind)?;
    key.extend_from_slice(id.as_bytes());
    Ok(key)
}

/// Common prefix of every key of `kind`
pub fn kind_prefix(kind: &str) -> StoreResult<Vec<u8>> {
    validate_kind(kind)?;
    let mut prefix = Vec::with_capacity(kind.len() + 1);
    prefix.extend_from_slice(kind.as_bytes());
    prefix.push(SEPARATOR);
    Ok(prefix)
}

/// Split a backend key into `(kind, id)`
///
/// Returns `None` for keys that are not UTF-8 or have no separator.
pub fn parse_key(key: &[u8]) -> Option<(&str, &str)> {
    let key = std::str::from_utf8(key).ok()?;
    let (kind, id) = key.split_once(SEPARATOR as char)?;
    if kind.is_empty() {
        return None;
    }
    Some((kind, id))
}

/// Printable form of a backend key, for errors and logs
pub(crate) fn display_key(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}
