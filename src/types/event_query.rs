//! The user-facing query surface and its validation rules.

use crate::types::event_type::EventType;
use crate::types::filter_range::{EventFilters, FilterRange};
use chrono::NaiveDate;
use thiserror::Error;

/// Problems with a query that are detected before anything is fetched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Start date {start} cannot be later than end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    #[error("Please enter a valid NASA API key")]
    MissingApiKey,

    #[error("Please select at least one event type")]
    NoEventTypes,

    #[error("Invalid {field} range {range}: min must not exceed max")]
    InvalidRange {
        field: &'static str,
        range: FilterRange,
    },
}

/// What to do when fetching one of several selected event types fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The whole query fails with the first fetch error.
    #[default]
    AbortAll,
    /// The failing type is recorded as skipped and the remaining types are still processed.
    SkipFailed,
}

/// A fully specified request for space-weather events.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub api_key: String,
    pub event_types: Vec<EventType>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub filters: EventFilters,
    pub failure_policy: FailurePolicy,
}

impl EventQuery {
    /// Checks the query in the order a user would fix it: dates, key, selection, filters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start > self.end {
            return Err(ValidationError::StartAfterEnd {
                start: self.start,
                end: self.end,
            });
        }
        if self.api_key.trim().is_empty() {
            return Err(ValidationError::MissingApiKey);
        }
        if self.event_types.is_empty() {
            return Err(ValidationError::NoEventTypes);
        }
        if !self.filters.cme_speed.is_valid() {
            return Err(ValidationError::InvalidRange {
                field: "CME speed",
                range: self.filters.cme_speed,
            });
        }
        if !self.filters.gst_kp.is_valid() {
            return Err(ValidationError::InvalidRange {
                field: "GST Kp index",
                range: self.filters.gst_kp,
            });
        }
        Ok(())
    }
}
