//! Endpoint handlers
//!
//! Each module covers one family of REST operations; the dispatch
//! table in [`crate::router`] decides which handler a request reaches.

pub mod bulk;
pub mod cluster;
pub mod document;
pub mod indices;
pub mod search;

use crate::client::DocumentApi;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::metadata::IndexMetadataStore;
use axum::body::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Shared state for all handlers
#[derive(Clone)]
pub struct GatewayState {
    pub client: Arc<dyn DocumentApi>,
    pub metadata: Arc<IndexMetadataStore>,
    pub config: Arc<GatewayConfig>,
}

/// Parse a required JSON body
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, GatewayError> {
    if body.is_empty() {
        return Err(GatewayError::InvalidRequestBody(
            "Request body is required".to_string(),
        ));
    }
    serde_json::from_slice(body)
        .map_err(|e| GatewayError::InvalidRequestBody(e.to_string()))
}

/// Parse an optional JSON body; an empty body yields None
pub(crate) fn parse_optional_json_body<T: DeserializeOwned>(
    body: &Bytes,
) -> Result<Option<T>, GatewayError> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| GatewayError::InvalidRequestBody(e.to_string()))
}
