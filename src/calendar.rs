//! Google Calendar v3 client.
//!
//! Only what meeting scheduling needs: list, insert and delete events on one
//! calendar. The access token comes from elsewhere (see [`crate::tokens`]);
//! obtaining it is outside this crate.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::client::{build_http_client, handle_response};
use crate::config::{trim_base, ClientConfig};
use crate::envelope::unwrap_list;
use crate::error::Result;

/// Start or end of an event: either a timed `dateTime` or an all-day `date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn at(time: DateTime<Utc>) -> Self {
        EventTime {
            date_time: Some(time.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
}

pub struct CalendarClient {
    base_url: String,
    client: Client,
}

impl CalendarClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            base_url: trim_base(&config.calendar_base_url).to_string(),
            client: build_http_client(None, config.timeout_secs)?,
        })
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    /// Upcoming events, expanded into single instances and ordered by start time.
    pub async fn list_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<CalendarEvent>> {
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = max_results.to_string();
        let response = self
            .client
            .get(self.events_url(calendar_id))
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("maxResults", max_results.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await?;
        let payload = handle_response(response).await?;
        Ok(unwrap_list(&payload)?
            .into_iter()
            .filter_map(|event| serde_json::from_value(event).ok())
            .collect())
    }

    pub async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<CalendarEvent> {
        let response = self
            .client
            .post(self.events_url(calendar_id))
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await?;
        let payload = handle_response(response).await?;
        Ok(serde_json::from_value(payload)?)
    }

    pub async fn delete_event(&self, access_token: &str, calendar_id: &str, event_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.events_url(calendar_id), urlencoding::encode(event_id));
        let response = self.client.delete(url).bearer_auth(access_token).send().await?;
        handle_response(response).await?;
        Ok(())
    }
}
