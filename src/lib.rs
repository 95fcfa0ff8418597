mod config;
mod donki;
mod error;
mod events;
mod export;
mod frame;
mod types;

pub use config::{api_key_from_env, API_KEY_ENV, DEMO_API_KEY};
pub use donki::*;
pub use error::DonkiError;

pub use events::cache::{TtlCache, DEFAULT_CACHE_TTL};
pub use events::error::FetchError;
pub use events::fetcher::EventFetcher;
pub use events::source::{
    EventRequest, EventSource, HttpEventSource, RawEvent, DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};

pub use frame::aggregate::{
    aggregate_by_date, aggregate_by_type, event_dates, BEGIN_TIME_COLUMN, START_TIME_COLUMN,
};
pub use frame::filtering::{filter_events, EventFrameFilterExt, KP_INDEX_COLUMN, SPEED_COLUMN};
pub use frame::merge::merge_frames;
pub use frame::normalize::{normalize_events, EVENT_TYPE_COLUMN};

pub use export::{
    to_csv, to_json, to_json_records, to_xlsx, ExportError, CSV_DATETIME_FORMAT,
    JSON_DATETIME_FORMAT, SHEET_NAME,
};

pub use types::event_query::{EventQuery, FailurePolicy, ValidationError};
pub use types::event_type::{EventType, UnknownEventType};
pub use types::filter_range::{EventFilters, FilterRange};
pub use types::report::{
    DailyEventCount, EmptyResultWarning, EventReport, FetchOutcome, SkippedEventType, TypeCount,
};
pub use types::timestamp::{parse_timestamp, IntoNaiveUtc};
