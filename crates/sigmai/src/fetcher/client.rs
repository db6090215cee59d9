//! The MISP REST client: one `reqwest::Client` per fetcher worker,
//! talking to `/events/restSearch`, `/objects/restSearch`, and
//! `/attributes/restSearch`.
//!
//! Each endpoint wraps its page in MISP's own envelope shape rather
//! than a bare array; these envelopes exist only to peel that off, the
//! same job the teacher does with a manual token-skip before decoding
//! individual array elements — here `serde` does it declaratively.

use serde::Deserialize;
use serde_json::json;
use sigmai_core::config::FetchFilters;
use sigmai_core::misp::{Attribute, Event, Object};

use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct MispClient {
    http: reqwest::Client,
    events_url: String,
    objects_url: String,
    attributes_url: String,
    key: String,
}

impl MispClient {
    pub fn new(base_url: &str, key: &str, insecure: bool) -> Result<Self, FetchError> {
        let base = base_url.trim_end_matches('/');
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(FetchError::Transport)?;
        Ok(MispClient {
            http,
            events_url: format!("{base}/events/restSearch"),
            objects_url: format!("{base}/objects/restSearch"),
            attributes_url: format!("{base}/attributes/restSearch"),
            key: key.to_string(),
        })
    }

    pub async fn fetch_events_page(
        &self,
        filters: &FetchFilters,
        buffer: i64,
        page: i64,
    ) -> Result<Vec<Event>, FetchError> {
        let mut body = json!({ "limit": buffer, "metadata": "1", "page": page });
        if !filters.events.is_empty() {
            body["eventid"] = json!(filters.events);
        }
        if filters.published_include != filters.published_exclude {
            body["published"] = json!(if filters.published_include { "1" } else { "0" });
        }
        if !filters.tags.is_empty() {
            body["tags"] = json!(filters.tags);
        }
        if !filters.period.is_empty() {
            body["date"] = json!(filters.period);
        }
        if !filters.threat_level.is_empty() {
            body["threat_level_id"] = json!(filters.threat_level);
        }
        let response: EventsEnvelope = self.post(&self.events_url, &body).await?;
        Ok(response.response.into_iter().map(|e| e.event).collect())
    }

    pub async fn fetch_objects_page(
        &self,
        event_id: &str,
        buffer: i64,
        page: i64,
    ) -> Result<Vec<Object>, FetchError> {
        let body = json!({ "limit": buffer, "metadata": "1", "page": page, "eventid": event_id });
        let response: ObjectsEnvelope = self.post(&self.objects_url, &body).await?;
        Ok(response.response.into_iter().map(|o| o.object).collect())
    }

    pub async fn fetch_attributes_page(
        &self,
        event_id: &str,
        filters: &FetchFilters,
        buffer: i64,
        page: i64,
    ) -> Result<Vec<Attribute>, FetchError> {
        let mut body = json!({ "limit": buffer, "page": page, "eventid": event_id });
        if filters.ids_include != filters.ids_exclude {
            body["to_ids"] = json!(if filters.ids_include { "1" } else { "0" });
        }
        if filters.warning_exclude {
            body["enforceWarninglist"] = json!("1");
        }
        let response: AttributesEnvelope = self.post(&self.attributes_url, &body).await?;
        Ok(response.response.attribute)
    }

    async fn post<T>(&self, url: &str, body: &serde_json::Value) -> Result<T, FetchError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(url)
            .header("Authorization", &self.key)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;
        response.json::<T>().await.map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[derive(Debug, Deserialize)]
struct EventsEnvelope {
    response: Vec<EventEntry>,
}

#[derive(Debug, Deserialize)]
struct EventEntry {
    #[serde(rename = "Event")]
    event: Event,
}

#[derive(Debug, Deserialize)]
struct ObjectsEnvelope {
    response: Vec<ObjectEntry>,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    #[serde(rename = "Object")]
    object: Object,
}

#[derive(Debug, Deserialize)]
struct AttributesEnvelope {
    response: AttributesInner,
}

#[derive(Debug, Deserialize)]
struct AttributesInner {
    #[serde(rename = "Attribute", default)]
    attribute: Vec<Attribute>,
}
