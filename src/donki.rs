//! The main entry point: validates a query and runs the fetch, normalize, filter, merge and
//! aggregate steps for every selected event type.

use crate::error::DonkiError;
use crate::events::fetcher::EventFetcher;
use crate::events::source::{EventRequest, EventSource, HttpEventSource};
use crate::frame::aggregate::{aggregate_by_date, aggregate_by_type};
use crate::frame::filtering::filter_events;
use crate::frame::merge::merge_frames;
use crate::frame::normalize::normalize_events;
use crate::types::event_query::{EventQuery, FailurePolicy};
use crate::types::event_type::EventType;
use crate::types::filter_range::{EventFilters, FilterRange};
use crate::types::report::{EmptyResultWarning, EventReport, FetchOutcome, SkippedEventType};
use bon::bon;
use chrono::NaiveDate;
use log::{debug, info, warn};

/// Client for DONKI space-weather events.
///
/// Holds an [`EventFetcher`], so repeated queries for the same event type, date range and
/// API key within the cache window (one hour by default) reuse the earlier response.
///
/// Create one with [`Donki::new()`] to talk to the public NASA API, or inject any
/// [`EventSource`] with [`Donki::with_source()`].
///
/// # Examples
///
/// ```no_run
/// # use donki::{Donki, DonkiError, EventType};
/// # use chrono::NaiveDate;
/// # async fn run() -> Result<(), DonkiError> {
/// let client = Donki::new()?;
/// let outcome = client
///     .fetch_events()
///     .api_key("DEMO_KEY")
///     .event_types(&[EventType::Flare, EventType::CoronalMassEjection])
///     .start(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
///     .end(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap())
///     .call()
///     .await?;
///
/// match outcome.report() {
///     Some(report) => println!("{} events", report.total_events()),
///     None => println!("nothing matched"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct Donki {
    fetcher: EventFetcher,
}

#[bon]
impl Donki {
    /// Client for the public API at [`crate::DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`DonkiError::Fetch`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, DonkiError> {
        Ok(Self::with_fetcher(EventFetcher::http()?))
    }

    /// Client for a DONKI-compatible API under `base_url`, e.g. a mirror or a local stub.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DonkiError> {
        Ok(Self::with_source(HttpEventSource::with_base_url(base_url)?))
    }

    /// Client over any [`EventSource`] with the default cache window.
    pub fn with_source(source: impl EventSource + 'static) -> Self {
        Self::with_fetcher(EventFetcher::new(source, Default::default()))
    }

    pub fn with_fetcher(fetcher: EventFetcher) -> Self {
        Self { fetcher }
    }

    /// Drops every memoized response.
    pub async fn clear_cache(&self) {
        self.fetcher.clear_cache().await;
    }

    /// Fetches, filters and aggregates events of the selected types.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.api_key(&str)`: **Required.** NASA API key. Must not be blank.
    /// * `.event_types(&[EventType])`: **Required.** Types to fetch, in the order their rows should appear.
    /// * `.start(NaiveDate)` / `.end(NaiveDate)`: **Required.** Inclusive date range; `start <= end`.
    /// * `.cme_speed(FilterRange)`: Optional. CME speed range in km/s. Defaults to `[0, 3000]`.
    /// * `.gst_kp(FilterRange)`: Optional. GST Kp index range. Defaults to `[0, 9]`.
    /// * `.failure_policy(FailurePolicy)`: Optional. Defaults to [`FailurePolicy::AbortAll`].
    ///
    /// # Returns
    ///
    /// [`FetchOutcome::Events`] with the combined table and its aggregates, or
    /// [`FetchOutcome::Empty`] when no event survived fetching and filtering.
    ///
    /// # Errors
    ///
    /// * [`DonkiError::Validation`] before anything is fetched, if the query is invalid.
    /// * [`DonkiError::Fetch`] when a fetch fails under [`FailurePolicy::AbortAll`].
    /// * [`DonkiError::Frame`] if polars fails while building the table.
    #[builder]
    pub async fn fetch_events(
        &self,
        api_key: &str,
        event_types: &[EventType],
        start: NaiveDate,
        end: NaiveDate,
        cme_speed: Option<FilterRange>,
        gst_kp: Option<FilterRange>,
        failure_policy: Option<FailurePolicy>,
    ) -> Result<FetchOutcome, DonkiError> {
        let defaults = EventFilters::default();
        let query = EventQuery {
            api_key: api_key.to_string(),
            event_types: event_types.to_vec(),
            start,
            end,
            filters: EventFilters {
                cme_speed: cme_speed.unwrap_or(defaults.cme_speed),
                gst_kp: gst_kp.unwrap_or(defaults.gst_kp),
            },
            failure_policy: failure_policy.unwrap_or_default(),
        };
        self.run_query(&query).await
    }

    /// Runs an already assembled [`EventQuery`]. See [`Donki::fetch_events`].
    pub async fn run_query(&self, query: &EventQuery) -> Result<FetchOutcome, DonkiError> {
        query.validate()?;

        let mut frames = Vec::with_capacity(query.event_types.len());
        let mut skipped = Vec::new();
        let mut processed: Vec<EventType> = Vec::with_capacity(query.event_types.len());

        for &event_type in &query.event_types {
            if processed.contains(&event_type) {
                continue;
            }
            processed.push(event_type);

            let request =
                EventRequest::new(event_type, query.start, query.end, query.api_key.as_str());
            let raw = match self.fetcher.fetch(&request).await {
                Ok(raw) => raw,
                Err(e) => match query.failure_policy {
                    FailurePolicy::AbortAll => return Err(e.into()),
                    FailurePolicy::SkipFailed => {
                        warn!("Skipping {} events: {}", event_type, e);
                        skipped.push(SkippedEventType {
                            event_type,
                            reason: e.to_string(),
                        });
                        continue;
                    }
                },
            };

            if raw.is_empty() {
                debug!("No {} events between {} and {}", event_type, query.start, query.end);
                continue;
            }

            let frame = normalize_events(event_type, &raw)?;
            let frame = filter_events(event_type, frame, &query.filters)?;
            debug!(
                "{} of {} {} events kept after filtering",
                frame.height(),
                raw.len(),
                event_type
            );
            frames.push(frame);
        }

        let events = merge_frames(frames)?;
        if events.height() == 0 {
            let warning = EmptyResultWarning {
                event_types: processed,
                skipped,
            };
            info!("{}", warning);
            return Ok(FetchOutcome::Empty(warning));
        }

        let daily_counts = aggregate_by_date(&events)?;
        let type_counts = aggregate_by_type(&events)?;
        info!(
            "Collected {} events over {} days for {}..{}",
            events.height(),
            daily_counts
                .iter()
                .map(|c| c.date)
                .collect::<std::collections::BTreeSet<_>>()
                .len(),
            query.start,
            query.end
        );

        Ok(FetchOutcome::Events(EventReport {
            events,
            daily_counts,
            type_counts,
            skipped,
        }))
    }
}
