//! Write-ahead log tests
//!
//! These tests verify:
//! - LSN assignment across appends, reopen and truncate
//! - Sync bookkeeping for each strategy
//! - Recovery keeps the valid prefix and cuts the file there
//! - `verify` reports without touching the file
