use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::Instant;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

struct Stamped<V> {
    stored_at: Instant,
    value: V,
}

/// In-memory memoization keyed by exact arguments, with a fixed time-to-live.
///
/// Concurrent lookups of the same key share one initialisation: the loader runs at most once
/// per key per window. A loader that fails leaves nothing behind, so the next lookup retries.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Arc<OnceCell<Stamped<V>>>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key`, or runs `load` and caches its result.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            self.prune_expired(&mut entries);
            entries
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        // The map lock is released here; only callers of this key wait on the cell.
        let loaded = cell
            .get_or_try_init(|| async move {
                let value = load().await?;
                Ok::<_, E>(Stamped {
                    stored_at: Instant::now(),
                    value,
                })
            })
            .await;
        match loaded {
            Ok(stamped) => Ok(stamped.value.clone()),
            Err(e) => {
                self.forget_failed(&cell).await;
                Err(e)
            }
        }
    }

    /// Number of live entries, including ones whose value is still loading.
    pub async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        self.prune_expired(&mut entries);
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Drops the entry still holding `cell` if nothing managed to fill it. A cell that a
    /// newer lookup already replaced, or one a waiting caller filled, is left alone.
    async fn forget_failed(&self, cell: &Arc<OnceCell<Stamped<V>>>) {
        self.entries
            .lock()
            .await
            .retain(|_, entry| !(Arc::ptr_eq(entry, cell) && !entry.initialized()));
    }

    fn prune_expired(&self, entries: &mut HashMap<K, Arc<OnceCell<Stamped<V>>>>) {
        let now = Instant::now();
        let ttl = self.ttl;
        entries.retain(|_, cell| match cell.get() {
            Some(stamped) => now.duration_since(stamped.stored_at) < ttl,
            // Still loading.
            None => true,
        });
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A loader that counts its invocations and yields the number of earlier calls.
    fn counting_loader(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> std::future::Ready<Result<u32, ()>> {
        let calls = Arc::clone(calls);
        move || std::future::ready(Ok(calls.fetch_add(1, Ordering::SeqCst) as u32))
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_lookup_within_window_is_cached() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with("k", counting_loader(&calls))
                .await;
            assert_eq!(value, Ok(0));
            tokio::time::advance(Duration::from_secs(10)).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.get_or_try_insert_with("k", counting_loader(&calls)).await;
        assert_eq!(first, Ok(0));

        tokio::time::advance(Duration::from_secs(59)).await;
        let cached = cache.get_or_try_insert_with("k", counting_loader(&calls)).await;
        assert_eq!(cached, Ok(0));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.len().await, 0);
        let reloaded = cache.get_or_try_insert_with("k", counting_loader(&calls)).await;
        assert_eq!(reloaded, Ok(1));
    }

    #[tokio::test]
    async fn test_distinct_keys_are_loaded_separately() {
        let cache: TtlCache<(u8, u8), u8> = TtlCache::default();
        let a = cache
            .get_or_try_insert_with((1, 2), || async { Ok::<_, ()>(3) })
            .await;
        let b = cache
            .get_or_try_insert_with((2, 1), || async { Ok::<_, ()>(4) })
            .await;
        assert_eq!((a, b), (Ok(3), Ok(4)));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache: TtlCache<&str, u32> = TtlCache::default();
        let first = cache
            .get_or_try_insert_with("k", || async { Err::<u32, _>("boom") })
            .await;
        assert_eq!(first, Err("boom"));

        let second = cache
            .get_or_try_insert_with("k", || async { Ok::<_, &str>(5) })
            .await;
        assert_eq!(second, Ok(5));
    }

    #[tokio::test]
    async fn test_failed_keys_do_not_accumulate() {
        let cache: TtlCache<String, u32> = TtlCache::default();
        for i in 0..16 {
            let result = cache
                .get_or_try_insert_with(format!("bad-key-{i}"), || async { Err::<u32, _>("denied") })
                .await;
            assert_eq!(result, Err("denied"));
        }
        assert!(cache.is_empty().await);

        cache
            .get_or_try_insert_with("good".to_string(), || async { Ok::<_, &str>(7) })
            .await
            .unwrap();
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_load() {
        let cache: Arc<TtlCache<&str, u32>> = Arc::new(TtlCache::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let lookups: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_try_insert_with("k", move || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok::<_, ()>(42)
                        })
                        .await
                })
            })
            .collect();

        for lookup in lookups {
            assert_eq!(lookup.await.unwrap(), Ok(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache: TtlCache<&str, u32> = TtlCache::default();
        cache
            .get_or_try_insert_with("k", || async { Ok::<_, ()>(1) })
            .await
            .unwrap();
        assert!(!cache.is_empty().await);
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
