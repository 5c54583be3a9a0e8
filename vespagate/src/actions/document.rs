//! Single-document CRUD endpoints

use crate::actions::{parse_json_body, GatewayState};
use crate::error::GatewayError;
use crate::response::ShardStats;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

/// GET /{index}/_doc/{id}
pub async fn get_document(
    state: &GatewayState,
    index: &str,
    id: &str,
) -> Result<Response, GatewayError> {
    match state.client.get(index, id).await {
        Ok(raw) => Ok(Json(json!({
            "_index": index,
            "_id": id,
            "_version": 1,
            "_seq_no": 0,
            "_primary_term": 1,
            "found": true,
            "_source": raw.get("fields").cloned().unwrap_or_else(|| json!({})),
        }))
        .into_response()),
        Err(_) => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "_index": index,
                "_id": id,
                "found": false,
            })),
        )
            .into_response()),
    }
}

/// POST /{index}/_doc and POST /{index}/_doc/{id}
///
/// Without an id one is generated and the document counts as created;
/// an explicit id may overwrite, so the result reads "updated".
pub async fn post_document(
    state: &GatewayState,
    index: &str,
    id: Option<&str>,
    body: &Bytes,
) -> Result<Response, GatewayError> {
    let doc: Value = parse_json_body(body)?;
    let (doc_id, result) = match id {
        Some(id) => (id.to_string(), "updated"),
        None => (Uuid::new_v4().to_string(), "created"),
    };

    insert_checked(state, index, &doc_id, &doc).await?;
    Ok(write_response(StatusCode::CREATED, index, &doc_id, result))
}

/// PUT /{index}/_doc/{id}
pub async fn put_document(
    state: &GatewayState,
    index: &str,
    id: &str,
    body: &Bytes,
) -> Result<Response, GatewayError> {
    let doc: Value = parse_json_body(body)?;
    insert_checked(state, index, id, &doc).await?;
    Ok(write_response(StatusCode::OK, index, id, "updated"))
}

/// POST|PUT /{index}/_create/{id}
pub async fn create_document(
    state: &GatewayState,
    index: &str,
    id: &str,
    body: &Bytes,
    via_put: bool,
) -> Result<Response, GatewayError> {
    let doc: Value = parse_json_body(body)?;
    insert_checked(state, index, id, &doc).await?;

    if via_put {
        Ok(write_response(StatusCode::OK, index, id, "updated"))
    } else {
        Ok(write_response(StatusCode::CREATED, index, id, "created"))
    }
}

/// POST /{index}/_update/{id} - Partial update
///
/// The partial document sits under "doc"; a bare body is accepted as
/// the partial itself. The preceding get is the existence check that
/// turns updates of absent documents into 404s.
pub async fn update_document(
    state: &GatewayState,
    index: &str,
    id: &str,
    body: &Bytes,
) -> Result<Response, GatewayError> {
    let request: Value = parse_json_body(body)?;
    let partial = request.get("doc").cloned().unwrap_or(request);

    state
        .client
        .get(index, id)
        .await
        .map_err(|_| document_not_found(index, id))?;

    state
        .client
        .update(index, id, &partial)
        .await
        .map_err(|_| document_not_found(index, id))?;

    Ok(write_response(StatusCode::OK, index, id, "updated"))
}

/// DELETE /{index}/_doc/{id}
pub async fn delete_document(
    state: &GatewayState,
    index: &str,
    id: &str,
) -> Result<Response, GatewayError> {
    state
        .client
        .delete(index, id)
        .await
        .map_err(|_| document_not_found(index, id))?;

    Ok(write_response(StatusCode::OK, index, id, "deleted"))
}

async fn insert_checked(
    state: &GatewayState,
    index: &str,
    id: &str,
    doc: &Value,
) -> Result<(), GatewayError> {
    state
        .client
        .insert(index, id, doc)
        .await
        .map(|_| ())
        .map_err(|_| document_not_found(index, id))
}

fn document_not_found(index: &str, id: &str) -> GatewayError {
    GatewayError::DocumentNotFound {
        index: index.to_string(),
        id: id.to_string(),
    }
}

fn write_response(status: StatusCode, index: &str, id: &str, result: &str) -> Response {
    (
        status,
        Json(json!({
            "_index": index,
            "_id": id,
            "_version": 1,
            "result": result,
            "_shards": ShardStats::default(),
            "_seq_no": 0,
            "_primary_term": 1,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests_support::{test_state_with, StubApi};
    use http_body_util::BodyExt;
    use std::sync::Arc;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_document_found() {
        let api = Arc::new(StubApi::with_document("items", "1", json!({"title": "a"})));
        let state = test_state_with(api);

        let response = get_document(&state, "items", "1").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let v = body_json(response).await;
        assert_eq!(v["found"], true);
        assert_eq!(v["_source"]["title"], "a");
        assert_eq!(v["_version"], 1);
    }

    #[tokio::test]
    async fn test_get_document_absent_is_404_not_found_body() {
        let state = test_state_with(Arc::new(StubApi::default()));
        let response = get_document(&state, "items", "9").await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let v = body_json(response).await;
        assert_eq!(v["found"], false);
    }

    #[tokio::test]
    async fn test_post_document_generates_id() {
        let api = Arc::new(StubApi::default());
        let state = test_state_with(Arc::clone(&api));

        let response = post_document(&state, "items", None, &Bytes::from(r#"{"title":"a"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let v = body_json(response).await;
        assert_eq!(v["result"], "created");
        assert!(!v["_id"].as_str().unwrap().is_empty());
        assert_eq!(api.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_post_document_with_id_reports_updated() {
        let state = test_state_with(Arc::new(StubApi::default()));
        let response = post_document(&state, "items", Some("1"), &Bytes::from("{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let v = body_json(response).await;
        assert_eq!(v["result"], "updated");
        assert_eq!(v["_id"], "1");
    }

    #[tokio::test]
    async fn test_put_document_returns_200_updated() {
        let state = test_state_with(Arc::new(StubApi::default()));
        let response = put_document(&state, "items", "1", &Bytes::from("{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let v = body_json(response).await;
        assert_eq!(v["result"], "updated");
    }

    #[tokio::test]
    async fn test_create_document_post_vs_put() {
        let state = test_state_with(Arc::new(StubApi::default()));

        let posted = create_document(&state, "items", "1", &Bytes::from("{}"), false)
            .await
            .unwrap();
        assert_eq!(posted.status(), StatusCode::CREATED);
        assert_eq!(body_json(posted).await["result"], "created");

        let put = create_document(&state, "items", "1", &Bytes::from("{}"), true)
            .await
            .unwrap();
        assert_eq!(put.status(), StatusCode::OK);
        assert_eq!(body_json(put).await["result"], "updated");
    }

    #[tokio::test]
    async fn test_post_document_requires_body() {
        let state = test_state_with(Arc::new(StubApi::default()));
        let err = post_document(&state, "items", None, &Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequestBody(_)));
    }

    #[tokio::test]
    async fn test_update_document_merges_doc_key() {
        let api = Arc::new(StubApi::with_document("items", "1", json!({"title": "a"})));
        let state = test_state_with(Arc::clone(&api));

        let body = Bytes::from(r#"{"doc": {"price": 5}}"#);
        let response = update_document(&state, "items", "1", &body).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["result"], "updated");
        assert_eq!(
            *api.calls.lock(),
            vec!["get items/1", "update items/1"]
        );
    }

    #[tokio::test]
    async fn test_update_document_absent_is_404() {
        let state = test_state_with(Arc::new(StubApi::default()));
        let err = update_document(&state, "items", "9", &Bytes::from(r#"{"doc": {}}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::DocumentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_document() {
        let api = Arc::new(StubApi::with_document("items", "1", json!({})));
        let state = test_state_with(api);

        let response = delete_document(&state, "items", "1").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["result"], "deleted");
    }

    #[tokio::test]
    async fn test_delete_document_absent_is_404() {
        let state = test_state_with(Arc::new(StubApi::default()));
        let err = delete_document(&state, "items", "9").await.unwrap_err();
        assert!(matches!(err, GatewayError::DocumentNotFound { .. }));
    }
}
