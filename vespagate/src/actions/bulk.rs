//! NDJSON _bulk endpoint

use crate::actions::GatewayState;
use crate::bulk::{execute_bulk, parse_bulk_body};
use crate::error::GatewayError;
use axum::body::Bytes;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// POST|PUT /_bulk and /{index}/_bulk
pub async fn bulk(
    state: &GatewayState,
    default_index: Option<&str>,
    body: &Bytes,
) -> Result<Response, GatewayError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| GatewayError::InvalidRequestBody(e.to_string()))?;

    let records = parse_bulk_body(text)?;
    let response = execute_bulk(state.client.as_ref(), default_index, records).await;
    Ok(Json(response).into_response())
}
