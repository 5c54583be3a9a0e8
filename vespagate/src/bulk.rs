//! NDJSON bulk request processing
//!
//! Parsing and execution are split: [`parse_bulk_body`] turns the
//! NDJSON payload into records (failing the whole request on malformed
//! JSON), and [`execute_bulk`] runs them strictly in input order,
//! turning per-record failures into item-level errors.

use crate::client::DocumentApi;
use crate::error::GatewayError;
use crate::response::{BulkItemResponse, BulkItemResult, BulkResponse, ErrorCause, ShardStats};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOp {
    Index,
    Create,
    Update,
    Delete,
}

impl BulkOp {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "index" => Some(Self::Index),
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Whether this operation expects a document line after the action line
    fn takes_document(&self) -> bool {
        !matches!(self, Self::Delete)
    }
}

/// One parsed bulk operation
#[derive(Debug, Clone)]
pub struct BulkRecord {
    pub op: BulkOp,
    pub index: Option<String>,
    pub id: Option<String>,
    pub doc: Option<Value>,
}

/// Parse an NDJSON bulk body into records.
///
/// Blank lines are skipped wherever they appear, including between an
/// action line and its document line. A trailing action still waiting
/// for its document at end of input is kept and executes with an empty
/// document.
///
/// Malformed JSON fails the whole request, and so does an unrecognized
/// action key: without knowing the operation there is no way to tell
/// whether the next line is its document or the next action, so the
/// parser cannot resume at an item boundary.
pub fn parse_bulk_body(body: &str) -> Result<Vec<BulkRecord>, GatewayError> {
    let mut records = Vec::new();
    let mut pending: Option<BulkRecord> = None;

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line)
            .map_err(|e| GatewayError::InvalidRequestBody(format!("Invalid bulk line: {e}")))?;

        if let Some(mut record) = pending.take() {
            record.doc = Some(value);
            records.push(record);
            continue;
        }

        let record = parse_action_line(&value)?;
        if record.op.takes_document() {
            pending = Some(record);
        } else {
            records.push(record);
        }
    }

    if let Some(record) = pending {
        records.push(record);
    }

    Ok(records)
}

fn parse_action_line(value: &Value) -> Result<BulkRecord, GatewayError> {
    let obj = value.as_object().ok_or_else(|| {
        GatewayError::InvalidRequestBody("Bulk action line must be an object".to_string())
    })?;

    let (key, meta) = obj.iter().next().ok_or_else(|| {
        GatewayError::InvalidRequestBody("Empty bulk action line".to_string())
    })?;

    let op = BulkOp::from_key(key).ok_or_else(|| {
        GatewayError::InvalidRequestBody(format!("Unknown bulk action: {key}"))
    })?;

    Ok(BulkRecord {
        op,
        index: meta
            .get("_index")
            .and_then(Value::as_str)
            .map(String::from),
        id: meta.get("_id").and_then(Value::as_str).map(String::from),
        doc: None,
    })
}

/// Execute parsed records one at a time, in input order
pub async fn execute_bulk(
    client: &dyn DocumentApi,
    default_index: Option<&str>,
    records: Vec<BulkRecord>,
) -> BulkResponse {
    let start = Instant::now();
    let mut items = Vec::with_capacity(records.len());
    let mut has_errors = false;

    for record in records {
        let item = execute_record(client, default_index, record).await;
        if item_has_error(&item) {
            has_errors = true;
        }
        items.push(item);
    }

    BulkResponse {
        took: start.elapsed().as_millis() as u64,
        errors: has_errors,
        items,
    }
}

async fn execute_record(
    client: &dyn DocumentApi,
    default_index: Option<&str>,
    record: BulkRecord,
) -> BulkItemResponse {
    let op = record.op;
    let Some(index) = record.index.or_else(|| default_index.map(String::from)) else {
        return error_item(
            op,
            String::new(),
            record.id,
            400,
            "action_request_validation_exception",
            "_index is missing",
        );
    };

    match op {
        BulkOp::Index | BulkOp::Create => {
            let id = record.id.unwrap_or_else(|| Uuid::new_v4().to_string());
            let doc = record.doc.unwrap_or_else(|| json!({}));
            match client.insert(&index, &id, &doc).await {
                Ok(_) => success_item(op, index, id, "created", 201),
                Err(e) => {
                    warn!(%index, %id, "bulk insert failed: {e}");
                    backend_error_item(op, index, Some(id), &e)
                }
            }
        }
        BulkOp::Update => {
            let Some(id) = record.id else {
                return error_item(
                    op,
                    index,
                    None,
                    400,
                    "action_request_validation_exception",
                    "_id is missing",
                );
            };
            // Update bodies nest the partial document under "doc"
            let doc = record.doc.unwrap_or_else(|| json!({}));
            let partial = doc.get("doc").cloned().unwrap_or(doc);
            match client.update(&index, &id, &partial).await {
                Ok(_) => success_item(op, index, id, "updated", 200),
                Err(e) => {
                    warn!(%index, %id, "bulk update failed: {e}");
                    backend_error_item(op, index, Some(id), &e)
                }
            }
        }
        BulkOp::Delete => {
            let Some(id) = record.id else {
                return error_item(
                    op,
                    index,
                    None,
                    400,
                    "action_request_validation_exception",
                    "_id is missing",
                );
            };
            match client.delete(&index, &id).await {
                Ok(_) => success_item(op, index, id, "deleted", 200),
                Err(e) => {
                    warn!(%index, %id, "bulk delete failed: {e}");
                    backend_error_item(op, index, Some(id), &e)
                }
            }
        }
    }
}

fn success_item(
    op: BulkOp,
    index: String,
    id: String,
    result: &str,
    status: u16,
) -> BulkItemResponse {
    keyed_item(
        op,
        BulkItemResult {
            index,
            id: Some(id),
            version: 1,
            result: Some(result.to_string()),
            shards: ShardStats::default(),
            status,
            error: None,
        },
    )
}

fn error_item(
    op: BulkOp,
    index: String,
    id: Option<String>,
    status: u16,
    error_type: &str,
    reason: &str,
) -> BulkItemResponse {
    keyed_item(
        op,
        BulkItemResult {
            index,
            id,
            version: 1,
            result: None,
            shards: ShardStats::default(),
            status,
            error: Some(ErrorCause {
                error_type: error_type.to_string(),
                reason: reason.to_string(),
            }),
        },
    )
}

// Failed records report 400 regardless of cause; the batch itself
// still answers 200.
fn backend_error_item(
    op: BulkOp,
    index: String,
    id: Option<String>,
    error: &GatewayError,
) -> BulkItemResponse {
    error_item(op, index, id, 400, "exception", &error.to_string())
}

fn keyed_item(op: BulkOp, result: BulkItemResult) -> BulkItemResponse {
    let mut item = BulkItemResponse::default();
    match op {
        BulkOp::Index => item.index = Some(result),
        BulkOp::Create => item.create = Some(result),
        BulkOp::Update => item.update = Some(result),
        BulkOp::Delete => item.delete = Some(result),
    }
    item
}

fn item_has_error(item: &BulkItemResponse) -> bool {
    [&item.index, &item.create, &item.update, &item.delete]
        .into_iter()
        .flatten()
        .any(|r| r.error.is_some())
}
