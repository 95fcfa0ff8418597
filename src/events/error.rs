use crate::types::event_type::EventType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request for {event_type} events failed ({url})")]
    NetworkRequest {
        event_type: EventType,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request for {event_type} events failed with status {status} ({url})")]
    HttpStatus {
        event_type: EventType,
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to decode {event_type} response as a list of events")]
    Decode {
        event_type: EventType,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Event type whose request failed, if the error is tied to one.
    pub fn event_type(&self) -> Option<EventType> {
        match self {
            FetchError::ClientBuild(_) => None,
            FetchError::NetworkRequest { event_type, .. }
            | FetchError::HttpStatus { event_type, .. }
            | FetchError::Decode { event_type, .. } => Some(*event_type),
        }
    }
}
