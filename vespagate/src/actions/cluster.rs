//! Cluster-level and informational endpoints

use crate::actions::GatewayState;
use crate::error::GatewayError;
use crate::response::{CatIndex, CatIndicesResponse, ClusterHealth, RootInfo, ShardStats};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map};

/// GET / - Service descriptor
pub async fn root_info(_state: &GatewayState) -> Result<Response, GatewayError> {
    Ok(Json(RootInfo::default()).into_response())
}

/// GET /_cluster/health and GET /_cluster/health/{index}
///
/// A single-node gateway is always green; the index argument only
/// scopes the name in real clusters and is accepted here for
/// compatibility.
pub async fn cluster_health(
    _state: &GatewayState,
    _index: Option<&str>,
) -> Result<Response, GatewayError> {
    Ok(Json(ClusterHealth::default()).into_response())
}

/// GET /_cluster/state - Cluster state with an index metadata snapshot
pub async fn cluster_state(state: &GatewayState) -> Result<Response, GatewayError> {
    let mut indices = Map::new();
    for (name, meta) in state.metadata.list_all() {
        indices.insert(
            name,
            json!({
                "index_uuid": meta.uuid,
                "settings": meta.settings,
                "mappings": meta.mappings,
            }),
        );
    }

    Ok(Json(json!({
        "cluster_name": "vespa",
        "cluster_uuid": "_na_",
        "master_node": "_na_",
        "metadata": { "indices": indices },
    }))
    .into_response())
}

/// GET /_cat/indices and GET /_cat/indices/{index}
pub async fn cat_indices(
    state: &GatewayState,
    index: Option<&str>,
) -> Result<Response, GatewayError> {
    let rows: Vec<CatIndex> = state
        .metadata
        .list_all()
        .into_iter()
        .filter(|(name, _)| index.map_or(true, |wanted| wanted == name))
        .map(|(name, meta)| CatIndex::placeholder(&name, &meta.uuid))
        .collect();

    Ok(Json(CatIndicesResponse { indices: rows }).into_response())
}

/// POST /_refresh and POST /{index}/_refresh
///
/// Vespa makes writes visible without an explicit refresh cycle, so
/// this only acknowledges.
pub async fn refresh(
    _state: &GatewayState,
    _index: Option<&str>,
) -> Result<Response, GatewayError> {
    Ok(Json(json!({ "_shards": ShardStats::default() })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests_support::test_state;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_info_shape() {
        let state = test_state();
        let response = root_info(&state).await.unwrap();
        let v = body_json(response).await;
        assert_eq!(v["tagline"], "You Know, for Search");
        assert_eq!(v["version"]["build_hash"], "_na_");
    }

    #[tokio::test]
    async fn test_cluster_health_green() {
        let state = test_state();
        let v = body_json(cluster_health(&state, None).await.unwrap()).await;
        assert_eq!(v["status"], "green");
        assert_eq!(v["cluster_name"], "vespa");
    }

    #[tokio::test]
    async fn test_cluster_state_lists_indices() {
        let state = test_state();
        state.metadata.create("items", Map::new());
        let v = body_json(cluster_state(&state).await.unwrap()).await;
        assert!(v["metadata"]["indices"]["items"]["index_uuid"].is_string());
    }

    #[tokio::test]
    async fn test_cat_indices_filters_by_name() {
        let state = test_state();
        state.metadata.create("items", Map::new());
        state.metadata.create("logs", Map::new());

        let all = body_json(cat_indices(&state, None).await.unwrap()).await;
        assert_eq!(all["indices"].as_array().unwrap().len(), 2);

        let one = body_json(cat_indices(&state, Some("logs")).await.unwrap()).await;
        let rows = one["indices"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["index"], "logs");
        assert_eq!(rows[0]["health"], "green");
    }

    #[tokio::test]
    async fn test_refresh_acknowledges() {
        let state = test_state();
        let v = body_json(refresh(&state, Some("items")).await.unwrap()).await;
        assert_eq!(v["_shards"]["total"], 1);
        assert_eq!(v["_shards"]["failed"], 0);
    }
}
