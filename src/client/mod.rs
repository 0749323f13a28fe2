//! # Database Client
//!
//! This module defines the connection to the remote document store as an
//! explicitly injected dependency: the facade is generic over
//! [`DocumentClient`] and never touches a process-wide handle, so callers
//! own the client's lifecycle (construct at process start, drop at
//! shutdown) and tests run against an in-memory fake.
//!
//! Two implementations ship with the crate:
//!
//! * [`PgClient`] — the production client, backed by Postgres with one
//!   JSONB row per document.
//! * [`MemoryClient`] — an in-process store with the same semantics,
//!   used as a test fake and for embedded usage.

mod memory;
pub use memory::*;

mod postgres;
pub use postgres::*;

use async_trait::async_trait;

use crate::types::{Fields, Filter, RawDocument};

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("database error :: {0}")]
    Database(#[from] sqlx::Error),
    #[error("malformed stored document `{doc_id}` :: {msg}")]
    MalformedDocument { doc_id: String, msg: String },
}

/// Operations the remote document store must provide, per collection:
/// unrestricted streaming, equality-filtered streaming and point
/// get/set/merge/delete by document key.
///
/// Collections are plain names and are never validated for existence;
/// reading an unknown collection yields an empty result.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Every document in the collection, in store iteration order.
    async fn scan(&self, collection: &str) -> Result<Vec<RawDocument>, ClientError>;

    /// Documents matching the conjunction of equality constraints.
    async fn find(&self, collection: &str, filter: &Filter)
    -> Result<Vec<RawDocument>, ClientError>;

    /// Point lookup by storage key.
    async fn get(&self, collection: &str, doc_id: &str)
    -> Result<Option<RawDocument>, ClientError>;

    /// Create-or-replace the document at `doc_id`.
    async fn set(&self, collection: &str, doc_id: &str, fields: &Fields)
    -> Result<(), ClientError>;

    /// Shallow-merges `patch` into an existing document. Returns `false`
    /// when no document lives at `doc_id`; nothing is created.
    async fn merge(
        &self,
        collection: &str,
        doc_id: &str,
        patch: &Fields,
    ) -> Result<bool, ClientError>;

    /// Removes the document at `doc_id`. Returns `false` when it did
    /// not exist.
    async fn delete(&self, collection: &str, doc_id: &str) -> Result<bool, ClientError>;
}
