//! Notification gateway.
//!
//! Triggers are fired by POSTing a free-form body to `<base>/<trigger-id>`.
//! Triggers, connections and delivery logs are managed under `<base>/notify/*`.
//! Message templating happens on the gateway; bodies are opaque here.

use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;

use crate::client::{build_http_client, handle_response};
use crate::config::{trim_base, ClientConfig};
use crate::envelope::{unwrap_list, unwrap_single};
use crate::error::Result;

/// Body sent when firing a trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyPayload {
    /// `{"message": "..."}`
    Message(String),
    /// `{"event": {...}}`
    Event(Value),
}

/// Collections exposed under `/notify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyResource {
    Triggers,
    Connections,
    Logs,
}

impl NotifyResource {
    pub fn path(&self) -> &'static str {
        match self {
            NotifyResource::Triggers => "triggers",
            NotifyResource::Connections => "connections",
            NotifyResource::Logs => "logs",
        }
    }
}

pub struct NotifyClient {
    base_url: String,
    client: Client,
}

impl NotifyClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            base_url: trim_base(&config.notify_base_url).to_string(),
            client: build_http_client(None, config.timeout_secs)?,
        })
    }

    async fn send(&self, method: Method, url: String, body: Option<&Value>) -> Result<Value> {
        tracing::debug!(method = method.as_str(), %url, "notify request");
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        handle_response(request.send().await?).await
    }

    fn resource_url(&self, resource: NotifyResource, id: Option<&str>) -> String {
        match id {
            Some(id) => format!(
                "{}/notify/{}/{}",
                self.base_url,
                resource.path(),
                urlencoding::encode(id)
            ),
            None => format!("{}/notify/{}", self.base_url, resource.path()),
        }
    }

    /// Fire a trigger. The gateway's reply is returned as-is.
    pub async fn fire(&self, trigger_id: &str, payload: &NotifyPayload) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(trigger_id));
        let body = serde_json::to_value(payload)?;
        self.send(Method::POST, url, Some(&body)).await
    }

    pub async fn list(&self, resource: NotifyResource) -> Result<Vec<Value>> {
        let payload = self
            .send(Method::GET, self.resource_url(resource, None), None)
            .await?;
        unwrap_list(&payload)
    }

    pub async fn create(&self, resource: NotifyResource, body: &Value) -> Result<Value> {
        let payload = self
            .send(Method::POST, self.resource_url(resource, None), Some(body))
            .await?;
        unwrap_single(&payload)
    }

    pub async fn update(&self, resource: NotifyResource, id: &str, body: &Value) -> Result<Value> {
        let payload = self
            .send(Method::PUT, self.resource_url(resource, Some(id)), Some(body))
            .await?;
        unwrap_single(&payload)
    }

    pub async fn delete(&self, resource: NotifyResource, id: &str) -> Result<()> {
        self.send(Method::DELETE, self.resource_url(resource, Some(id)), None)
            .await?;
        Ok(())
    }
}
