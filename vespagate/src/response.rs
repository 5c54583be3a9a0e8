//! OpenSearch response envelopes and the backend response translator

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Search response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub took: u64,
    pub timed_out: bool,
    #[serde(rename = "_shards")]
    pub shards: ShardStats,
    pub hits: HitsWrapper,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardStats {
    pub total: u32,
    pub successful: u32,
    pub skipped: u32,
    pub failed: u32,
}

impl Default for ShardStats {
    fn default() -> Self {
        Self {
            total: 1,
            successful: 1,
            skipped: 0,
            failed: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitsWrapper {
    pub total: TotalHits,
    pub max_score: Option<f64>,
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalHits {
    pub value: u64,
    pub relation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score")]
    pub score: f64,
    #[serde(rename = "_source")]
    pub source: Value,
}

/// Count response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
    #[serde(rename = "_shards")]
    pub shards: ShardStats,
}

/// Bulk response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResponse {
    pub took: u64,
    pub errors: bool,
    pub items: Vec<BulkItemResponse>,
}

/// One bulk item keyed by its operation name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkItemResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<BulkItemResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<BulkItemResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<BulkItemResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<BulkItemResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkItemResult {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_version")]
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(rename = "_shards")]
    pub shards: ShardStats,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCause>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorCause {
    #[serde(rename = "type")]
    pub error_type: String,
    pub reason: String,
}

/// Cluster health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: String,
    pub timed_out: bool,
    pub number_of_nodes: u32,
    pub number_of_data_nodes: u32,
    pub active_primary_shards: u32,
    pub active_shards: u32,
    pub relocating_shards: u32,
    pub initializing_shards: u32,
    pub unassigned_shards: u32,
    pub delayed_unassigned_shards: u32,
    pub number_of_pending_tasks: u32,
    pub number_of_in_flight_fetch: u32,
    pub task_max_waiting_in_queue_millis: u64,
    pub active_shards_percent_as_number: f64,
}

impl Default for ClusterHealth {
    fn default() -> Self {
        Self {
            cluster_name: "vespa".to_string(),
            status: "green".to_string(),
            timed_out: false,
            number_of_nodes: 1,
            number_of_data_nodes: 1,
            active_primary_shards: 1,
            active_shards: 1,
            relocating_shards: 0,
            initializing_shards: 0,
            unassigned_shards: 0,
            delayed_unassigned_shards: 0,
            number_of_pending_tasks: 0,
            number_of_in_flight_fetch: 0,
            task_max_waiting_in_queue_millis: 0,
            active_shards_percent_as_number: 100.0,
        }
    }
}

/// Root service descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootInfo {
    pub name: String,
    pub cluster_name: String,
    pub cluster_uuid: String,
    pub version: VersionInfo,
    pub tagline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub number: String,
    pub build_type: String,
    pub build_hash: String,
    pub build_date: String,
    pub build_snapshot: bool,
    pub lucene_version: String,
    pub minimum_wire_compatibility_version: String,
    pub minimum_index_compatibility_version: String,
}

impl Default for RootInfo {
    fn default() -> Self {
        Self {
            name: "vespagate".to_string(),
            cluster_name: "vespa".to_string(),
            cluster_uuid: "_na_".to_string(),
            version: VersionInfo {
                number: "2.11.0".to_string(), // Compatibility target
                build_type: "tar".to_string(),
                build_hash: "_na_".to_string(),
                build_date: "2024-01-01T00:00:00.000000Z".to_string(),
                build_snapshot: false,
                lucene_version: "9.7.0".to_string(),
                minimum_wire_compatibility_version: "7.10.0".to_string(),
                minimum_index_compatibility_version: "7.0.0".to_string(),
            },
            tagline: "You Know, for Search".to_string(),
        }
    }
}

/// Cat indices response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatIndicesResponse {
    pub indices: Vec<CatIndex>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatIndex {
    pub health: String,
    pub status: String,
    pub index: String,
    pub uuid: String,
    pub pri: String,
    pub rep: String,
    #[serde(rename = "docs.count")]
    pub docs_count: String,
    #[serde(rename = "docs.deleted")]
    pub docs_deleted: String,
    #[serde(rename = "store.size")]
    pub store_size: String,
    #[serde(rename = "pri.store.size")]
    pub pri_store_size: String,
}

impl CatIndex {
    /// Single-node placeholder row; Vespa does not expose per-index
    /// document counts through this gateway.
    pub fn placeholder(index: &str, uuid: &str) -> Self {
        Self {
            health: "green".to_string(),
            status: "open".to_string(),
            index: index.to_string(),
            uuid: uuid.to_string(),
            pri: "1".to_string(),
            rep: "0".to_string(),
            docs_count: "0".to_string(),
            docs_deleted: "0".to_string(),
            store_size: "0b".to_string(),
            pri_store_size: "0b".to_string(),
        }
    }
}

/// Translate a raw Vespa search envelope into the OpenSearch shape.
///
/// `index` is the caller-facing index name stamped onto every hit.
pub fn translate_search(index: &str, raw: &Value) -> SearchResponse {
    let total = coverage_documents(raw);

    let hits: Vec<Hit> = raw
        .pointer("/root/children")
        .and_then(Value::as_array)
        .map(|children| children.iter().map(|child| translate_hit(index, child)).collect())
        .unwrap_or_default();

    SearchResponse {
        took: 1,
        timed_out: false,
        shards: ShardStats::default(),
        hits: HitsWrapper {
            total: TotalHits {
                value: total,
                relation: "eq".to_string(),
            },
            max_score: Some(1.0),
            hits,
        },
    }
}

/// Translate a raw Vespa search envelope into a count response
pub fn translate_count(raw: &Value) -> CountResponse {
    CountResponse {
        count: coverage_documents(raw),
        shards: ShardStats::default(),
    }
}

fn translate_hit(index: &str, child: &Value) -> Hit {
    Hit {
        index: index.to_string(),
        id: child
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        score: child
            .get("relevance")
            .and_then(Value::as_f64)
            .unwrap_or(1.0),
        source: child.get("fields").cloned().unwrap_or_else(|| Value::Object(Default::default())),
    }
}

/// Total document count from the coverage section. Vespa emits a
/// number here, but some proxied responses carry it as a string.
fn coverage_documents(raw: &Value) -> u64 {
    match raw.pointer("/root/coverage/documents") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}
