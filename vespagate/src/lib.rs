//! OpenSearch REST API translation layer for Vespa
//!
//! Vespagate lets OpenSearch/Elasticsearch clients talk to a Vespa
//! backend: Query DSL search requests compile to YQL, document and
//! bulk writes map onto document/v1, and backend responses are
//! reshaped into the envelopes the clients expect.
//!
//! # Endpoints
//!
//! - `/_search`, `/{index}/_search` - Query DSL search
//! - `/_count`, `/{index}/_count` - Condition match counts
//! - `/_mget`, `/{index}/_mget` - Multi-get
//! - `/_bulk`, `/{index}/_bulk` - NDJSON bulk writes
//! - `/{index}/_doc/{id}`, `/{index}/_create/{id}`, `/{index}/_update/{id}` - Document CRUD
//! - `/{index}`, `/{index}/_mapping`, `/{index}/_settings` - Index lifecycle
//! - `/_cluster/health`, `/_cluster/state`, `/_cat/indices` - Cluster info
//!
//! # Query DSL Support
//!
//! Supported query types: `bool` (must, should, must_not, filter),
//! `match` / `match_phrase` / `multi_match`, `term` / `terms`,
//! `range`, `exists`, `prefix` / `wildcard`, `ids`, `query_string`.
//! Unrecognized query kinds compile to an always-true condition.
//!
//! Index metadata (settings, mappings, UUIDs) is held in memory only
//! and does not survive a restart; documents stored in Vespa do.

pub mod actions;
pub mod bulk;
pub mod client;
pub mod config;
pub mod error;
pub mod metadata;
pub mod query;
pub mod response;
pub mod router;

pub use actions::GatewayState;
pub use client::{DocumentApi, VespaClient};
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use metadata::IndexMetadataStore;
pub use router::gateway_router;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
