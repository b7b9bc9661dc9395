//! SQLite backend for the Rentwise case store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. That single worker thread also
//! serializes every mutation, which is what gives the per-case consistency
//! contract its teeth: each `update_case` is one transaction applied against
//! the last committed state.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
