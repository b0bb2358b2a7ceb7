//! HTTP client for the generic CRUD endpoint.
//!
//! Every table lives behind one URL and is selected with `?tableName=`. Record
//! ids travel both in the query (`&id=`) and in the body envelope built by
//! [`crate::builder`].

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde_json::Value;

use crate::config::{trim_base, ClientConfig};
use crate::entity::EntityKind;
use crate::envelope::{unwrap_list, unwrap_single};
use crate::error::{ApiError, Result};

/// Build a reqwest client with optional bearer token and timeout.
pub(crate) fn build_http_client(api_key: Option<&str>, timeout_secs: Option<u64>) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    if let Some(api_key) = api_key {
        let value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| ApiError::Config(format!("invalid API key: {e}")))?;
        headers.insert(header::AUTHORIZATION, value);
    }

    let mut builder = Client::builder().default_headers(headers);
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Turn a response into JSON, mapping non-2xx statuses to errors.
/// An empty body reads as `null`.
pub(crate) async fn handle_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        let url = response.url().to_string();
        return Err(ApiError::NotFound(url));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %body, "request failed");
        return Err(ApiError::Server {
            status: status.as_u16(),
            message: body,
        });
    }

    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Client for the CRUD endpoint.
pub struct CrudClient {
    config: ClientConfig,
    client: Client,
}

impl CrudClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = build_http_client(config.api_key.as_deref(), config.timeout_secs)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self) -> &str {
        trim_base(&self.config.crud_base_url)
    }

    async fn send(
        &self,
        method: Method,
        kind: EntityKind,
        id: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let table = self.config.tables.for_kind(kind);
        let mut query = vec![("tableName", table)];
        if let Some(id) = id {
            query.push(("id", id));
        }

        tracing::debug!(method = method.as_str(), table, id, "crud request");
        let mut request = self.client.request(method, self.url()).query(&query);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        handle_response(response).await
    }

    /// Raw list payload, before unwrapping.
    pub async fn list_raw(&self, kind: EntityKind) -> Result<Value> {
        self.send(Method::GET, kind, None, None).await
    }

    /// Decoded records of a table.
    pub async fn list(&self, kind: EntityKind) -> Result<Vec<Value>> {
        let payload = self.list_raw(kind).await?;
        unwrap_list(&payload)
    }

    /// Decoded single record.
    pub async fn get(&self, kind: EntityKind, id: &str) -> Result<Value> {
        let payload = self.send(Method::GET, kind, Some(id), None).await?;
        unwrap_single(&payload)
    }

    /// POST a create body; returns the raw response payload.
    pub async fn create(&self, kind: EntityKind, body: &Value) -> Result<Value> {
        self.send(Method::POST, kind, None, Some(body)).await
    }

    /// PUT an update body; returns the raw response payload.
    pub async fn update(&self, kind: EntityKind, id: &str, body: &Value) -> Result<Value> {
        self.send(Method::PUT, kind, Some(id), Some(body)).await
    }

    /// DELETE with a delete body; returns the raw response payload.
    pub async fn delete(&self, kind: EntityKind, id: &str, body: &Value) -> Result<Value> {
        self.send(Method::DELETE, kind, Some(id), Some(body)).await
    }
}
