//! Search, count, and multi-get endpoints

use crate::actions::{parse_json_body, parse_optional_json_body, GatewayState};
use crate::error::GatewayError;
use crate::query::{compile_request, SearchRequest};
use crate::response::{translate_count, translate_search};
use axum::body::Bytes;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::debug;

/// Index name stamped onto hits when no index was addressed
const ALL_INDICES: &str = "_all";

/// GET|POST /_search and /{index}/_search
pub async fn search(
    state: &GatewayState,
    index: Option<&str>,
    body: &Bytes,
) -> Result<Response, GatewayError> {
    let request: SearchRequest = parse_optional_json_body(body)?.unwrap_or_default();
    let compiled = compile_request(&request);
    debug!(yql = %compiled.yql, hits = compiled.hits, offset = compiled.offset, "search");

    let raw = state
        .client
        .search(&compiled.yql, compiled.hits, compiled.offset)
        .await?;

    let response = translate_search(index.unwrap_or(ALL_INDICES), &raw);
    Ok(Json(response).into_response())
}

/// GET|POST /_count and /{index}/_count
///
/// Runs the compiled condition with a zero result window; only the
/// coverage count is consumed.
pub async fn count(
    state: &GatewayState,
    _index: Option<&str>,
    body: &Bytes,
) -> Result<Response, GatewayError> {
    let request: SearchRequest = parse_optional_json_body(body)?.unwrap_or_default();
    let compiled = compile_request(&request);

    let raw = state.client.search(&compiled.yql, 0, 0).await?;
    Ok(Json(translate_count(&raw)).into_response())
}

/// GET|POST /_mget and /{index}/_mget
pub async fn mget(
    state: &GatewayState,
    index: Option<&str>,
    body: &Bytes,
) -> Result<Response, GatewayError> {
    let request: Value = parse_json_body(body)?;
    let targets = mget_targets(&request, index)?;

    let mut docs = Vec::with_capacity(targets.len());
    for (target_index, id) in targets {
        docs.push(fetch_doc(state, &target_index, &id).await);
    }

    Ok(Json(json!({ "docs": docs })).into_response())
}

/// Resolve (index, id) pairs from either the "docs" or "ids" form
fn mget_targets(
    request: &Value,
    default_index: Option<&str>,
) -> Result<Vec<(String, String)>, GatewayError> {
    if let Some(entries) = request.get("docs").and_then(Value::as_array) {
        let mut targets = Vec::with_capacity(entries.len());
        for entry in entries {
            let index = entry
                .get("_index")
                .and_then(Value::as_str)
                .or(default_index)
                .ok_or_else(|| GatewayError::Validation("_index is missing".to_string()))?;
            let id = entry
                .get("_id")
                .and_then(Value::as_str)
                .ok_or_else(|| GatewayError::Validation("_id is missing".to_string()))?;
            targets.push((index.to_string(), id.to_string()));
        }
        return Ok(targets);
    }

    if let (Some(ids), Some(index)) = (
        request.get("ids").and_then(Value::as_array),
        default_index,
    ) {
        return Ok(ids
            .iter()
            .filter_map(Value::as_str)
            .map(|id| (index.to_string(), id.to_string()))
            .collect());
    }

    Err(GatewayError::Validation("ids is missing".to_string()))
}

/// One multi-get entry; a failed fetch reports the document as absent
async fn fetch_doc(state: &GatewayState, index: &str, id: &str) -> Value {
    match state.client.get(index, id).await {
        Ok(raw) => json!({
            "_index": index,
            "_id": id,
            "_version": 1,
            "_seq_no": 0,
            "_primary_term": 1,
            "found": true,
            "_source": raw.get("fields").cloned().unwrap_or_else(|| json!({})),
        }),
        Err(_) => json!({
            "_index": index,
            "_id": id,
            "found": false,
        }),
    }
}
