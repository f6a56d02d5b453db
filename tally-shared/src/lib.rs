//! # Tally Shared Library
//!
//! Ledger core shared by the Tally API server and the obligation worker.
//!
//! ## Module Organization
//!
//! - `models`: ledger entities and their Postgres queries
//! - `store`: persistence traits with Postgres and in-memory implementations
//! - `ledger`: user-facing operations and the budget aggregator
//! - `auth`: token validation, request identity and the ownership guard
//! - `calendar`: month arithmetic and date windows
//! - `db`: connection pool and migrations
//! - `error`: ledger error kinds

pub mod auth;
pub mod calendar;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod store;

/// Current version of the Tally shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
