use crate::events::error::FetchError;
use crate::types::event_type::EventType;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use reqwest::Client;
use std::time::Duration;

/// One DONKI record as returned by the API: field name to JSON value.
pub type RawEvent = serde_json::Map<String, serde_json::Value>;

pub const DEFAULT_BASE_URL: &str = "https://api.nasa.gov/DONKI";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The arguments of a single fetch. Also the memoization key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventRequest {
    pub event_type: EventType,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub api_key: String,
}

impl EventRequest {
    pub fn new(
        event_type: EventType,
        start: NaiveDate,
        end: NaiveDate,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            start,
            end,
            api_key: api_key.into(),
        }
    }
}

/// Capability that retrieves the raw records of one event type.
///
/// Implementations perform exactly one attempt per call; caching and retries are the
/// caller's concern.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_raw(&self, request: &EventRequest) -> Result<Vec<RawEvent>, FetchError>;
}

/// [`EventSource`] backed by the DONKI REST API.
pub struct HttpEventSource {
    base_url: String,
    client: Client,
}

impl HttpEventSource {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, event_type: EventType) -> String {
        format!("{}/{}", self.base_url, event_type.path_segment())
    }

    /// The request URL with the API key masked, safe for logs and error messages.
    fn redacted_url(&self, request: &EventRequest) -> String {
        format!(
            "{}?startDate={}&endDate={}&api_key=***",
            self.endpoint(request.event_type),
            request.start.format("%Y-%m-%d"),
            request.end.format("%Y-%m-%d"),
        )
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn fetch_raw(&self, request: &EventRequest) -> Result<Vec<RawEvent>, FetchError> {
        let event_type = request.event_type;
        let url = self.redacted_url(request);
        info!("Requesting {} events from {}", event_type, url);

        let response = self
            .client
            .get(self.endpoint(event_type))
            .query(&[
                ("startDate", request.start.format("%Y-%m-%d").to_string()),
                ("endDate", request.end.format("%Y-%m-%d").to_string()),
                ("api_key", request.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest {
                event_type,
                url: url.clone(),
                source: e.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP {} for {} events at {}", status, event_type, url);
            return Err(FetchError::HttpStatus {
                event_type,
                url,
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::NetworkRequest {
                event_type,
                url: url.clone(),
                source: e.without_url(),
            })?;

        let events = decode_events(event_type, &body)?;
        debug!("Decoded {} {} events", events.len(), event_type);
        Ok(events)
    }
}

/// DONKI answers "no events" with an empty body, `null` or `[]`.
pub(crate) fn decode_events(event_type: EventType, body: &str) -> Result<Vec<RawEvent>, FetchError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Option<Vec<RawEvent>>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|source| FetchError::Decode { event_type, source })
}
