use crate::events::cache::TtlCache;
use crate::events::error::FetchError;
use crate::events::source::{EventRequest, EventSource, HttpEventSource, RawEvent};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Memoizing front for an [`EventSource`].
///
/// Identical requests within the cache window return the same `Arc` without touching the
/// source again.
pub struct EventFetcher {
    source: Box<dyn EventSource>,
    cache: TtlCache<EventRequest, Arc<Vec<RawEvent>>>,
}

impl EventFetcher {
    pub fn new(
        source: impl EventSource + 'static,
        cache: TtlCache<EventRequest, Arc<Vec<RawEvent>>>,
    ) -> Self {
        Self {
            source: Box::new(source),
            cache,
        }
    }

    /// Fetcher over the public DONKI API with the default one hour window.
    pub fn http() -> Result<Self, FetchError> {
        Ok(Self::new(HttpEventSource::new()?, TtlCache::default()))
    }

    pub fn with_ttl(source: impl EventSource + 'static, ttl: Duration) -> Self {
        Self::new(source, TtlCache::new(ttl))
    }

    pub async fn fetch(&self, request: &EventRequest) -> Result<Arc<Vec<RawEvent>>, FetchError> {
        let events = self
            .cache
            .get_or_try_insert_with(request.clone(), || async move {
                info!(
                    "Cache miss for {} events {}..{}, fetching",
                    request.event_type, request.start, request.end
                );
                self.source.fetch_raw(request).await.map(Arc::new)
            })
            .await?;
        debug!(
            "{} {} events available for {}..{}",
            events.len(),
            request.event_type,
            request.start,
            request.end
        );
        Ok(events)
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}
