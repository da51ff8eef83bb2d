//! Fetch-or-populate response cache.
//!
//! Entries are keyed by the canonical request URL (base URL plus query
//! parameters appended in the order given) and are write-once: a second
//! fetch for the same URL returns the stored bytes without touching the
//! network, for as long as the [`Freshness`] policy allows.
//!
//! Concurrent first-time fetches for one URL are coalesced: the first caller
//! performs the request, later callers wait for its result.
//!
//! ```text
//! caller A ─┐
//!           │                          ┌──────────┐
//! caller B ─┼──► ResponseCache ──miss──►│Transport │  (one GET)
//!           │        │                 └──────────┘
//! caller C ─┘        ▼
//!            [A, B, C receive the same bytes]
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use bytes::Bytes;
use ogc_common::{OgcError, OgcResult, Transport};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// How long a stored response may be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Entries live for the whole session.
    #[default]
    Forever,
    /// Entries older than the duration are fetched again.
    Ttl(Duration),
}

/// Per-fetch cache behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Serve a fresh stored entry when present.
    #[default]
    Default,
    /// Always fetch from the network and replace the stored entry.
    Reload,
}

struct CacheEntry {
    body: Bytes,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, freshness: Freshness) -> bool {
        match freshness {
            Freshness::Forever => true,
            Freshness::Ttl(ttl) => self.stored_at.elapsed() < ttl,
        }
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Misses that waited on another caller's request
    pub coalesced: u64,
    pub network_fetches: u64,
}

impl CacheStats {
    /// Returns the hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

type InFlight = Mutex<HashMap<String, broadcast::Sender<OgcResult<Bytes>>>>;

enum Role {
    Leader(broadcast::Sender<OgcResult<Bytes>>),
    Waiter(broadcast::Receiver<OgcResult<Bytes>>),
}

/// Removes an in-flight key when the leading request finishes or is
/// dropped, so waiters of an abandoned request are released.
struct InFlightGuard<'a> {
    in_flight: &'a InFlight,
    key: &'a str,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(self.key);
    }
}

/// Session-scoped response cache shared by every client of a session.
pub struct ResponseCache {
    namespace: String,
    transport: Arc<dyn Transport>,
    freshness: Freshness,
    coalesce: bool,
    entries: RwLock<HashMap<String, CacheEntry>>,
    in_flight: InFlight,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    network_fetches: AtomicU64,
}

impl ResponseCache {
    /// Create an empty cache generation named `namespace`.
    pub fn new(namespace: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let namespace = namespace.into();
        info!(namespace = %namespace, "Initializing response cache");
        Self {
            namespace,
            transport,
            freshness: Freshness::Forever,
            coalesce: true,
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            network_fetches: AtomicU64::new(0),
        }
    }

    pub fn with_freshness(mut self, freshness: Freshness) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn with_coalescing(mut self, coalesce: bool) -> Self {
        self.coalesce = coalesce;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    /// The transport this cache populates from.
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Fetch `base_url` with `params`, serving a stored entry when present.
    pub async fn fetch_through_cache(
        &self,
        base_url: &str,
        params: &[(String, String)],
    ) -> OgcResult<Bytes> {
        self.fetch_with(base_url, params, CacheMode::Default).await
    }

    /// Fetch with an explicit cache mode.
    #[instrument(skip(self, params), fields(namespace = %self.namespace))]
    pub async fn fetch_with(
        &self,
        base_url: &str,
        params: &[(String, String)],
        mode: CacheMode,
    ) -> OgcResult<Bytes> {
        let url = canonical_url(base_url, params)?;
        let key = url.to_string();

        if mode == CacheMode::Default {
            if let Some(body) = self.lookup(&key).await {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(url = %key, bytes = body.len(), "Response cache hit");
                return Ok(body);
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        if !self.coalesce {
            return self.populate(&url, &key).await;
        }

        match self.register(&key) {
            Role::Waiter(mut rx) => {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                debug!(url = %key, "Coalescing request - waiting for in-flight fetch");
                match rx.recv().await {
                    Ok(result) => result,
                    Err(_) => Err(OgcError::Transport(format!(
                        "in-flight request for {} was abandoned",
                        key
                    ))),
                }
            }
            Role::Leader(tx) => {
                let guard = InFlightGuard {
                    in_flight: &self.in_flight,
                    key: &key,
                };
                // A leader that finished between our lookup and registration
                // has already stored the entry.
                let stored = match mode {
                    CacheMode::Default => self.lookup(&key).await,
                    CacheMode::Reload => None,
                };
                let result = match stored {
                    Some(body) => Ok(body),
                    None => self.populate(&url, &key).await,
                };
                drop(guard);

                let waiters = tx.receiver_count();
                if waiters > 0 {
                    debug!(url = %key, waiters, "Broadcast result to coalesced waiters");
                }
                // Receivers may have been dropped
                let _ = tx.send(result.clone());
                result
            }
        }
    }

    /// Whether a fresh entry exists for the request.
    pub async fn contains(&self, base_url: &str, params: &[(String, String)]) -> bool {
        match canonical_url(base_url, params) {
            Ok(url) => self.lookup(url.as_str()).await.is_some(),
            Err(_) => false,
        }
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns a snapshot of the current statistics.
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            network_fetches: self.network_fetches.load(Ordering::Relaxed),
        }
    }

    /// Logs current statistics.
    pub async fn log_stats(&self) {
        let stats = self.stats().await;
        info!(
            namespace = %self.namespace,
            entries = stats.entries,
            hits = stats.hits,
            misses = stats.misses,
            coalesced = stats.coalesced,
            network_fetches = stats.network_fetches,
            hit_ratio = format!("{:.1}%", stats.hit_ratio() * 100.0),
            "Response cache statistics"
        );
    }

    async fn lookup(&self, key: &str) -> Option<Bytes> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_fresh(self.freshness) => Some(entry.body.clone()),
            Some(_) => {
                debug!(url = %key, "Response cache entry expired");
                None
            }
            None => None,
        }
    }

    fn register(&self, key: &str) -> Role {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match in_flight.get(key) {
            Some(tx) => Role::Waiter(tx.subscribe()),
            None => {
                let (tx, _rx) = broadcast::channel(1);
                in_flight.insert(key.to_string(), tx.clone());
                Role::Leader(tx)
            }
        }
    }

    async fn populate(&self, url: &Url, key: &str) -> OgcResult<Bytes> {
        self.network_fetches.fetch_add(1, Ordering::Relaxed);
        debug!(url = %key, "Response cache miss - fetching");

        let response = self.transport.get(url).await?;
        if !response.is_success() {
            warn!(url = %key, status = response.status, "Fetch produced no cacheable response");
            return Err(OgcError::CacheMiss {
                url: key.to_string(),
                status: Some(response.status),
            });
        }

        let body = response.body;
        self.entries.write().await.insert(
            key.to_string(),
            CacheEntry {
                body: body.clone(),
                stored_at: Instant::now(),
            },
        );
        debug!(url = %key, bytes = body.len(), "Response cached");
        Ok(body)
    }
}

/// Append `params` to `base_url` in the order given.
pub fn canonical_url(base_url: &str, params: &[(String, String)]) -> OgcResult<Url> {
    let mut url = Url::parse(base_url)?;
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_canonical_url_keeps_order() {
        let url = canonical_url(
            "http://example.test/wfs",
            &params(&[("b", "2"), ("a", "1 2")]),
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://example.test/wfs?b=2&a=1+2");
    }

    #[test]
    fn test_canonical_url_appends_to_existing_query() {
        let url = canonical_url("http://example.test/ows?map=x", &params(&[("a", "1")])).unwrap();
        assert_eq!(url.as_str(), "http://example.test/ows?map=x&a=1");
    }

    #[test]
    fn test_canonical_url_without_params() {
        let url = canonical_url("http://example.test/legend.json", &[]).unwrap();
        assert_eq!(url.as_str(), "http://example.test/legend.json");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = canonical_url("not a url", &[]).unwrap_err();
        assert_eq!(err.kind(), "invalid_url");
    }

    #[test]
    fn test_entry_freshness() {
        let entry = CacheEntry {
            body: Bytes::from_static(b"x"),
            stored_at: Instant::now(),
        };
        assert!(entry.is_fresh(Freshness::Forever));
        assert!(entry.is_fresh(Freshness::Ttl(Duration::from_secs(60))));
        assert!(!entry.is_fresh(Freshness::Ttl(Duration::ZERO)));
    }

    #[test]
    fn test_hit_ratio() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert!((stats.hit_ratio() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);
    }
}
