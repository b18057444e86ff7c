//! Admin API client
//!
//! Routes, relative to the configured base URL:
//! - `GET    {resource}`              list, wrapped as `{ "<key>": [...] }`
//! - `POST   {resource}`              create
//! - `PUT    {resource}/{id}`         update
//! - `DELETE {resource}/{id}`         delete
//! - `PUT    {resource}/{id}/approve` approve
//! - `PUT    {resource}/{id}/reject`  reject with `{ "reason": ... }`
//!
//! `{id}` is percent-encoded.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

use super::{
    check_id, check_reason, error_message, extract_collection, RecordMutations, RecordSource,
    SourceError,
};
use crate::config::{ApiConfig, ScreenDefinition};
use crate::models::Record;

/// `reqwest`-backed source for one admin resource
#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    client: reqwest::Client,
    collection_url: String,
    collection_key: String,
}

impl HttpRecordSource {
    /// Create a source for `resource`, whose list responses wrap records
    /// under `collection_key`
    pub fn new(api: &ApiConfig, resource: &str, collection_key: &str) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = api.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| SourceError::InvalidConfig("token is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(api.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::InvalidConfig(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            collection_url: format!(
                "{}/{}",
                api.base_url.trim_end_matches('/'),
                resource.trim_matches('/')
            ),
            collection_key: collection_key.to_string(),
        })
    }

    /// Create the source a screen definition points at
    pub fn for_screen(api: &ApiConfig, definition: &ScreenDefinition) -> Result<Self, SourceError> {
        Self::new(api, definition.resource, definition.collection_key)
    }

    /// URL of the collection route
    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// URL of one record; the id is percent-encoded into a single segment
    fn item_url(&self, id: &str) -> Result<String, SourceError> {
        check_id(id)?;
        Ok(format!("{}/{}", self.collection_url, urlencoding::encode(id)))
    }

    /// Send a request and decode the JSON body, mapping failures to
    /// `SourceError`. Empty bodies decode as `null`.
    async fn send(&self, request: RequestBuilder) -> Result<Value, SourceError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Unauthorized response from {}", url);
            return Err(SourceError::Unauthorized);
        }

        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
            tracing::warn!("{} from {}: {}", status.as_u16(), url, message);
            return Err(SourceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!("{} from {}", status.as_u16(), url);
        Ok(body)
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch_records(&self) -> Result<Vec<Record>, SourceError> {
        let body = self.send(self.client.get(&self.collection_url)).await?;
        extract_collection(body, &self.collection_key)
    }
}

#[async_trait]
impl RecordMutations for HttpRecordSource {
    async fn create(&self, record: &Record) -> Result<(), SourceError> {
        self.send(self.client.post(&self.collection_url).json(record))
            .await?;
        Ok(())
    }

    async fn update(&self, id: &str, record: &Record) -> Result<(), SourceError> {
        let url = self.item_url(id)?;
        self.send(self.client.put(url).json(record)).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SourceError> {
        let url = self.item_url(id)?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn approve(&self, id: &str) -> Result<(), SourceError> {
        let url = format!("{}/approve", self.item_url(id)?);
        self.send(self.client.put(url)).await?;
        Ok(())
    }

    async fn reject(&self, id: &str, reason: &str) -> Result<(), SourceError> {
        check_reason(reason)?;
        let url = format!("{}/reject", self.item_url(id)?);
        self.send(self.client.put(url).json(&json!({ "reason": reason.trim() })))
            .await?;
        Ok(())
    }
}
