//! Index lifecycle, mapping, and settings endpoints
//!
//! These operate purely on the in-memory metadata registry; the
//! backend schema itself is fixed deployment-side.

use crate::actions::{parse_json_body, parse_optional_json_body, GatewayState};
use crate::error::GatewayError;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::info;

/// PUT /{index} - Create (or replace) an index registration
pub async fn create_index(
    state: &GatewayState,
    index: &str,
    body: &Bytes,
) -> Result<Response, GatewayError> {
    let request: Option<Value> = parse_optional_json_body(body)?;

    let settings = request
        .as_ref()
        .and_then(|r| r.get("settings"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    state.metadata.create(index, settings);
    info!(%index, "index created");

    if let Some(mappings) = request
        .as_ref()
        .and_then(|r| r.get("mappings"))
        .and_then(Value::as_object)
    {
        state.metadata.update_mapping(index, mappings.clone())?;
    }

    Ok(Json(json!({
        "acknowledged": true,
        "shards_acknowledged": true,
        "index": index,
    }))
    .into_response())
}

/// DELETE /{index}
pub async fn delete_index(state: &GatewayState, index: &str) -> Result<Response, GatewayError> {
    state.metadata.delete(index)?;
    info!(%index, "index deleted");
    Ok(Json(json!({ "acknowledged": true })).into_response())
}

/// HEAD /{index} - Existence check with an empty body
pub async fn index_exists(state: &GatewayState, index: &str) -> Result<Response, GatewayError> {
    if state.metadata.exists(index) {
        Ok(StatusCode::OK.into_response())
    } else {
        Ok(StatusCode::NOT_FOUND.into_response())
    }
}

/// GET /{index}
pub async fn get_index(state: &GatewayState, index: &str) -> Result<Response, GatewayError> {
    let meta = state.metadata.get(index)?;
    Ok(Json(json!({
        index: {
            "aliases": {},
            "mappings": meta.mappings,
            "settings": { "index": index_settings(index, &meta.uuid, meta.settings) },
        }
    }))
    .into_response())
}

/// GET /{index}/_mapping
pub async fn get_mapping(state: &GatewayState, index: &str) -> Result<Response, GatewayError> {
    let meta = state.metadata.get(index)?;
    Ok(Json(json!({ index: { "mappings": meta.mappings } })).into_response())
}

/// PUT /{index}/_mapping
pub async fn put_mapping(
    state: &GatewayState,
    index: &str,
    body: &Bytes,
) -> Result<Response, GatewayError> {
    let mappings: Map<String, Value> = parse_json_body(body)?;
    state.metadata.update_mapping(index, mappings)?;
    Ok(Json(json!({ "acknowledged": true })).into_response())
}

/// GET /{index}/_settings
pub async fn get_settings(state: &GatewayState, index: &str) -> Result<Response, GatewayError> {
    let meta = state.metadata.get(index)?;
    Ok(Json(json!({
        index: { "settings": { "index": index_settings(index, &meta.uuid, meta.settings) } }
    }))
    .into_response())
}

/// PUT /{index}/_settings - Partial settings merge
pub async fn put_settings(
    state: &GatewayState,
    index: &str,
    body: &Bytes,
) -> Result<Response, GatewayError> {
    let request: Value = parse_json_body(body)?;

    // Accept both the flat form and the nested {"index": {...}} form
    let settings = request
        .get("index")
        .and_then(Value::as_object)
        .or_else(|| request.as_object())
        .cloned()
        .ok_or_else(|| {
            GatewayError::InvalidRequestBody("Settings body must be an object".to_string())
        })?;

    state.metadata.update_settings(index, settings)?;
    Ok(Json(json!({ "acknowledged": true })).into_response())
}

/// Stored settings augmented with the identity fields clients expect
fn index_settings(index: &str, uuid: &str, stored: Map<String, Value>) -> Map<String, Value> {
    let mut settings = stored;
    settings.insert("uuid".to_string(), json!(uuid));
    settings.insert("provided_name".to_string(), json!(index));
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests_support::test_state;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_index_minimal() {
        let state = test_state();
        let response = create_index(&state, "items", &Bytes::new()).await.unwrap();
        let v = body_json(response).await;
        assert_eq!(v["acknowledged"], true);
        assert_eq!(v["shards_acknowledged"], true);
        assert_eq!(v["index"], "items");
        assert!(state.metadata.exists("items"));
    }

    #[tokio::test]
    async fn test_create_index_with_settings_and_mappings() {
        let state = test_state();
        let body = Bytes::from(
            r#"{
                "settings": {"number_of_shards": 3},
                "mappings": {"properties": {"title": {"type": "text"}}}
            }"#,
        );
        create_index(&state, "items", &body).await.unwrap();

        let meta = state.metadata.get("items").unwrap();
        assert_eq!(meta.settings["number_of_shards"], 3);
        assert_eq!(meta.mappings["properties"]["title"]["type"], "text");
    }

    #[tokio::test]
    async fn test_delete_index() {
        let state = test_state();
        create_index(&state, "items", &Bytes::new()).await.unwrap();
        let v = body_json(delete_index(&state, "items").await.unwrap()).await;
        assert_eq!(v["acknowledged"], true);
        assert!(!state.metadata.exists("items"));
    }

    #[tokio::test]
    async fn test_delete_missing_index_is_404() {
        let state = test_state();
        let err = delete_index(&state, "missing").await.unwrap_err();
        assert!(matches!(err, GatewayError::IndexNotFound(_)));
    }

    #[tokio::test]
    async fn test_index_exists_head_statuses() {
        let state = test_state();
        create_index(&state, "items", &Bytes::new()).await.unwrap();

        let found = index_exists(&state, "items").await.unwrap();
        assert_eq!(found.status(), StatusCode::OK);

        let missing = index_exists(&state, "other").await.unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_index_shape() {
        let state = test_state();
        create_index(&state, "items", &Bytes::new()).await.unwrap();
        let v = body_json(get_index(&state, "items").await.unwrap()).await;
        assert!(v["items"]["aliases"].is_object());
        assert_eq!(v["items"]["settings"]["index"]["provided_name"], "items");
        assert!(v["items"]["settings"]["index"]["uuid"].is_string());
    }

    #[tokio::test]
    async fn test_mapping_roundtrip() {
        let state = test_state();
        create_index(&state, "items", &Bytes::new()).await.unwrap();

        let mapping = Bytes::from(r#"{"properties": {"title": {"type": "text"}}}"#);
        let put = body_json(put_mapping(&state, "items", &mapping).await.unwrap()).await;
        assert_eq!(put["acknowledged"], true);

        let got = body_json(get_mapping(&state, "items").await.unwrap()).await;
        assert_eq!(
            got["items"]["mappings"]["properties"]["title"]["type"],
            "text"
        );
    }

    #[tokio::test]
    async fn test_put_mapping_missing_index_is_404() {
        let state = test_state();
        let err = put_mapping(&state, "missing", &Bytes::from("{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::IndexNotFound(_)));
    }

    #[tokio::test]
    async fn test_settings_merge() {
        let state = test_state();
        let body = Bytes::from(r#"{"settings": {"number_of_replicas": 1}}"#);
        create_index(&state, "items", &body).await.unwrap();

        put_settings(
            &state,
            "items",
            &Bytes::from(r#"{"index": {"refresh_interval": "5s"}}"#),
        )
        .await
        .unwrap();

        let v = body_json(get_settings(&state, "items").await.unwrap()).await;
        let settings = &v["items"]["settings"]["index"];
        assert_eq!(settings["number_of_replicas"], 1);
        assert_eq!(settings["refresh_interval"], "5s");
    }

    #[tokio::test]
    async fn test_put_settings_requires_body() {
        let state = test_state();
        create_index(&state, "items", &Bytes::new()).await.unwrap();
        let err = put_settings(&state, "items", &Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequestBody(_)));
    }

    #[tokio::test]
    async fn test_recreate_index_replaces_metadata() {
        let state = test_state();
        create_index(&state, "items", &Bytes::new()).await.unwrap();
        let first = state.metadata.get("items").unwrap().uuid;
        create_index(&state, "items", &Bytes::new()).await.unwrap();
        let second = state.metadata.get("items").unwrap().uuid;
        assert_ne!(first, second);
    }
}
