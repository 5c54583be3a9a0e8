//! Vespa transport client
//!
//! [`DocumentApi`] is the narrow seam between the REST handlers and the
//! backend; [`VespaClient`] is the real implementation speaking
//! document/v1 and the search API over HTTP.

use crate::error::GatewayError;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Backend document and search operations
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Put a full document
    async fn insert(&self, index: &str, id: &str, doc: &Value) -> Result<Value, GatewayError>;

    /// Partially update an existing document (assign semantics)
    async fn update(&self, index: &str, id: &str, doc: &Value) -> Result<Value, GatewayError>;

    /// Remove a document
    async fn delete(&self, index: &str, id: &str) -> Result<Value, GatewayError>;

    /// Fetch a single document
    async fn get(&self, index: &str, id: &str) -> Result<Value, GatewayError>;

    /// Run a YQL select with paging; the window is forwarded as-is
    async fn search(&self, yql: &str, hits: i64, offset: i64) -> Result<Value, GatewayError>;
}

/// HTTP client for a Vespa container endpoint
pub struct VespaClient {
    http: reqwest::Client,
    endpoint: String,
    document_type: String,
}

impl VespaClient {
    pub fn new(endpoint: &str, document_type: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            document_type: document_type.to_string(),
        }
    }

    /// document/v1 path for one document; the index name doubles as the
    /// Vespa namespace.
    fn doc_url(&self, index: &str, id: &str) -> String {
        format!(
            "{}/document/v1/{}/{}/docid/{}",
            self.endpoint, index, self.document_type, id
        )
    }

    async fn read_response(&self, response: reqwest::Response) -> Result<Value, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Backend(format!(
                "backend returned {status}: {body}"
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentApi for VespaClient {
    async fn insert(&self, index: &str, id: &str, doc: &Value) -> Result<Value, GatewayError> {
        let url = self.doc_url(index, id);
        debug!(%url, "insert document");
        let body = json!({ "fields": flatten_fields(doc) });
        let response = self.http.post(&url).json(&body).send().await?;
        self.read_response(response).await
    }

    async fn update(&self, index: &str, id: &str, doc: &Value) -> Result<Value, GatewayError> {
        let url = self.doc_url(index, id);
        debug!(%url, "update document");

        let mut assigns = Map::new();
        for (field, value) in flatten_fields(doc) {
            assigns.insert(field, json!({ "assign": value }));
        }
        let body = json!({ "fields": assigns });

        let response = self.http.put(&url).json(&body).send().await?;
        self.read_response(response).await
    }

    async fn delete(&self, index: &str, id: &str) -> Result<Value, GatewayError> {
        let url = self.doc_url(index, id);
        debug!(%url, "delete document");
        let response = self.http.delete(&url).send().await?;
        self.read_response(response).await
    }

    async fn get(&self, index: &str, id: &str) -> Result<Value, GatewayError> {
        let url = self.doc_url(index, id);
        debug!(%url, "get document");
        let response = self.http.get(&url).send().await?;
        self.read_response(response).await
    }

    async fn search(&self, yql: &str, hits: i64, offset: i64) -> Result<Value, GatewayError> {
        let url = format!("{}/search/", self.endpoint);
        debug!(%yql, hits, offset, "search");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("yql", yql),
                ("hits", &hits.to_string()),
                ("offset", &offset.to_string()),
            ])
            .send()
            .await?;
        self.read_response(response).await
    }
}

/// Flatten nested objects into dot-joined field names.
///
/// `{"user": {"name": "kim"}}` becomes `{"user.name": "kim"}`; arrays
/// and scalars are kept as-is. Non-object documents flatten to empty.
pub fn flatten_fields(doc: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    if let Value::Object(obj) = doc {
        for (key, value) in obj {
            flatten_into(&mut out, key, value);
        }
    }
    out
}

fn flatten_into(out: &mut Map<String, Value>, prefix: &str, value: &Value) {
    match value {
        Value::Object(obj) => {
            for (key, nested) in obj {
                flatten_into(out, &format!("{prefix}.{key}"), nested);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}
