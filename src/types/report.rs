//! Result types produced by one pipeline run.

use crate::export::{self, ExportError};
use crate::types::event_type::EventType;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::fmt;

/// Number of events of one type that occurred on one UTC date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyEventCount {
    pub date: NaiveDate,
    pub event_type: EventType,
    pub count: u64,
}

/// Number of events of one type in the combined dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub event_type: EventType,
    pub count: u64,
}

/// An event type left out of the result because fetching it failed.
///
/// Only produced under [`crate::FailurePolicy::SkipFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEventType {
    pub event_type: EventType,
    pub reason: String,
}

/// The combined event table with its derived views.
#[derive(Debug, Clone)]
pub struct EventReport {
    /// One row per event across all selected types, with the union of their columns.
    pub events: DataFrame,
    /// Events per (date, type), ordered by date.
    pub daily_counts: Vec<DailyEventCount>,
    /// Events per type, in the order the types first appear in `events`.
    pub type_counts: Vec<TypeCount>,
    pub skipped: Vec<SkippedEventType>,
}

impl EventReport {
    pub fn total_events(&self) -> usize {
        self.events.height()
    }

    /// UTF-8 CSV with a header row.
    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        export::to_csv(&self.events)
    }

    /// An XLSX workbook with a single `Events` sheet.
    pub fn to_xlsx(&self) -> Result<Vec<u8>, ExportError> {
        export::to_xlsx(&self.events)
    }

    /// A JSON array of row objects.
    pub fn to_json(&self) -> Result<String, ExportError> {
        export::to_json(&self.events)
    }
}

/// Non-fatal notice that no events survived fetching and filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyResultWarning {
    pub event_types: Vec<EventType>,
    pub skipped: Vec<SkippedEventType>,
}

impl fmt::Display for EmptyResultWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No events found after applying filters")?;
        if !self.skipped.is_empty() {
            let skipped: Vec<String> = self
                .skipped
                .iter()
                .map(|s| s.event_type.to_string())
                .collect();
            write!(f, " (skipped after fetch errors: {})", skipped.join(", "))?;
        }
        Ok(())
    }
}

/// What a query produced.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Events(EventReport),
    Empty(EmptyResultWarning),
}

impl FetchOutcome {
    pub fn report(&self) -> Option<&EventReport> {
        match self {
            FetchOutcome::Events(report) => Some(report),
            FetchOutcome::Empty(_) => None,
        }
    }

    pub fn into_report(self) -> Option<EventReport> {
        match self {
            FetchOutcome::Events(report) => Some(report),
            FetchOutcome::Empty(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FetchOutcome::Empty(_))
    }
}
