//! # FindMyHelper Shared Library
//!
//! Types and business logic shared by the FindMyHelper API server and any
//! future background binaries.
//!
//! ## Module Organization
//!
//! - `models`: Marketplace entities and their state machines
//! - `auth`: Password hashing, opaque tokens, federated identity verification
//! - `db`: PostgreSQL pool construction and migrations
//! - `store`: The `Store` trait and its Postgres/memory implementations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the FindMyHelper shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
