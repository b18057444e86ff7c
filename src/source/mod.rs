//! Record sources
//!
//! Where a screen's records come from and where its edits go.
//!
//! This module provides:
//! - `RecordSource` trait for fetching a full collection
//! - `RecordMutations` trait for the admin write routes
//! - `HttpRecordSource` implementing both against the admin API
//! - `MemoryRecordSource` implementing both over an in-process list

mod http;
mod memory;

pub use http::HttpRecordSource;
pub use memory::MemoryRecordSource;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{json_kind, Record};

/// Error types for record source operations
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure: connect, timeout, body read
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API rejected the credentials
    #[error("Unauthorized: sign in again")]
    Unauthorized,

    /// Non-success response with the API's own message
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Input refused before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// No record with this identifier
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Client could not be built from the configuration
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

/// Read side: the full, unfiltered collection
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every record of the collection
    async fn fetch_records(&self) -> Result<Vec<Record>, SourceError>;
}

/// Write side: the admin mutation routes
///
/// Successful mutations return nothing; callers refetch to see the result.
#[async_trait]
pub trait RecordMutations: Send + Sync {
    /// Create a record
    async fn create(&self, record: &Record) -> Result<(), SourceError>;

    /// Replace the record with identifier `id`
    async fn update(&self, id: &str, record: &Record) -> Result<(), SourceError>;

    /// Delete the record with identifier `id`
    async fn delete(&self, id: &str) -> Result<(), SourceError>;

    /// Approve a pending submission
    async fn approve(&self, id: &str) -> Result<(), SourceError>;

    /// Reject a pending submission; `reason` must not be blank
    async fn reject(&self, id: &str, reason: &str) -> Result<(), SourceError>;
}

/// Unwrap `{ "<key>": [...] }` into records.
///
/// A missing or null key is an empty collection.
pub fn extract_collection(body: Value, key: &str) -> Result<Vec<Record>, SourceError> {
    let mut map = match body {
        Value::Object(map) => map,
        other => {
            return Err(SourceError::Malformed(format!(
                "expected an object wrapping '{}', got {}",
                key,
                json_kind(&other)
            )))
        }
    };

    match map.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(items) => Record::list_from_json(items)
            .map_err(|e| SourceError::Malformed(format!("'{}': {}", key, e))),
    }
}

/// Pull a human-readable message out of an API error body.
///
/// Validation failures carry a `details` list of `{param, msg}` entries,
/// which are joined one per line.
pub fn error_message(body: &Value) -> Option<String> {
    let error = body.get("error").and_then(Value::as_str);

    if error == Some("Validation failed") {
        if let Some(details) = body.get("details").and_then(Value::as_array) {
            let lines: Vec<String> = details
                .iter()
                .map(|detail| {
                    let param = detail.get("param").and_then(Value::as_str).unwrap_or("?");
                    let msg = detail.get("msg").and_then(Value::as_str).unwrap_or("invalid");
                    format!("{}: {}", param, msg)
                })
                .collect();
            if !lines.is_empty() {
                return Some(format!("Validation failed:\n{}", lines.join("\n")));
            }
        }
    }

    error
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(str::to_string)
}

/// Refuse identifiers that cannot address a single record.
///
/// Dot segments survive percent-encoding and would be resolved away by the
/// URL parser, so they are refused outright.
pub(crate) fn check_id(id: &str) -> Result<(), SourceError> {
    if id.trim().is_empty() || id.contains('/') || id == "." || id == ".." {
        return Err(SourceError::Validation(format!("invalid record id '{}'", id)));
    }
    Ok(())
}

/// Refuse blank rejection reasons
pub(crate) fn check_reason(reason: &str) -> Result<(), SourceError> {
    if reason.trim().is_empty() {
        return Err(SourceError::Validation(
            "a rejection reason is required".to_string(),
        ));
    }
    Ok(())
}
