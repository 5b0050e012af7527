//! Wire serialization / 响应序列化
//!
//! Never fails: a record that cannot be serialized becomes a placeholder at the
//! same position, and a response that cannot be serialized becomes a minimal
//! fallback object carrying an `error` field.

use serde::Serialize;
use serde_json::{json, Value};

use super::backend::Timestamp;
use super::models::{SearchResponse, SearchResult};

const RECORD_ERROR: &str = "Error: Could not process result";
const RESPONSE_ERROR: &str = "Failed to process search results";

#[derive(Debug, Serialize)]
struct WireResult<'a> {
    filename: &'a str,
    path: &'a str,
    size: Option<u64>,
    date_modified: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireResponse<'a> {
    results: Vec<Value>,
    query: &'a str,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_query: Option<&'a str>,
}

/// Serialize a response to its JSON body / 序列化搜索响应
pub fn format_response(response: &SearchResponse) -> Value {
    let results = response.results.iter().map(format_result).collect();

    let wire = WireResponse {
        results,
        query: &response.query,
        count: response.count,
        total_count: response.total_count,
        original_query: response.original_query.as_deref().filter(|q| !q.is_empty()),
    };

    serde_json::to_value(&wire).unwrap_or_else(|e| {
        tracing::error!("Error converting SearchResponse to JSON: {}", e);
        fallback_response(response)
    })
}

/// Serialize one record, placeholder on failure / 序列化单条结果
pub fn format_result(result: &SearchResult) -> Value {
    let wire = WireResult {
        filename: &result.filename,
        path: &result.path,
        size: result.size,
        date_modified: result.date_modified.map(format_timestamp),
    };

    serde_json::to_value(&wire).unwrap_or_else(|e| {
        tracing::error!("Error converting individual result to JSON: {}", e);
        record_placeholder()
    })
}

/// ISO 8601 with offset, raw text when the value is out of range
pub fn format_timestamp(ts: Timestamp) -> String {
    match ts.to_datetime() {
        Some(dt) => dt.to_rfc3339(),
        None => {
            tracing::warn!("Failed to convert date_modified to ISO format: {}", ts);
            ts.to_string()
        }
    }
}

fn record_placeholder() -> Value {
    json!({
        "filename": RECORD_ERROR,
        "path": RECORD_ERROR,
        "size": 0,
        "date_modified": null,
    })
}

/// Minimal body used when the full response cannot be built
pub fn fallback_response(response: &SearchResponse) -> Value {
    let mut body = json!({
        "results": [],
        "query": response.query,
        "count": 0,
        "error": RESPONSE_ERROR,
    });

    if let Some(total) = response.total_count {
        body["total_count"] = json!(total);
    }
    if let Some(original) = response.original_query.as_deref().filter(|q| !q.is_empty()) {
        body["original_query"] = json!(original);
    }

    body
}
