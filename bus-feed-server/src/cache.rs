//! Single-slot cache in front of the upstream bus feed.
//!
//! At most one `CacheEntry` exists at a time. It is replaced wholesale on
//! every refresh and never mutated in place. Freshness is decided by
//! comparing the clock against `expires_at_millis` when a caller reads;
//! there is no background timer.
//!
//! Entries built from mock data expire sooner than live ones, so a
//! recovered upstream is picked up quickly while an outage still does not
//! cost one upstream request per caller.
//!
//! Concurrent misses are not de-duplicated. The slot lock is never held
//! across the fetch, so a race costs a redundant upstream call and the
//! last writer wins.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ConfigError;
use crate::feed::{
    FeedError, FeedSource, NormalizedBusRecord, ParsedBusRecord, mock, normalize_batch,
    parse_payload,
};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long live data stays fresh.
    pub live_ttl: Duration,

    /// How long mock data stays fresh. Must be shorter than `live_ttl`.
    pub mock_ttl: Duration,

    /// Upper bound on a single upstream fetch.
    pub fetch_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            live_ttl: Duration::from_secs(30),
            mock_ttl: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl CacheConfig {
    /// Set the live TTL and derive the mock TTL as one third of it.
    pub fn with_live_ttl(mut self, ttl: Duration) -> Self {
        self.live_ttl = ttl;
        self.mock_ttl = ttl / 3;
        self
    }

    pub fn with_mock_ttl(mut self, ttl: Duration) -> Self {
        self.mock_ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Check the TTLs and timeout are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.live_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration("live TTL"));
        }
        if self.mock_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration("mock TTL"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("fetch timeout"));
        }
        if self.mock_ttl >= self.live_ttl {
            return Err(ConfigError::MockTtlNotShorter {
                mock: self.mock_ttl,
                live: self.live_ttl,
            });
        }
        Ok(())
    }
}

/// Where a returned list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Fetched from upstream on this call
    Live,
    /// Served from the cache slot without a network call
    Cached,
    /// Synthesized because upstream failed on this call
    Mock,
}

/// What a stored entry was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrigin {
    Live,
    Mock,
}

impl EntryOrigin {
    fn fresh_source(self) -> DataSource {
        match self {
            EntryOrigin::Live => DataSource::Live,
            EntryOrigin::Mock => DataSource::Mock,
        }
    }
}

/// The contents of the cache slot.
#[derive(Debug)]
pub struct CacheEntry {
    pub data: Vec<NormalizedBusRecord>,
    pub origin: EntryOrigin,
    /// Errors that led to this entry (empty for live data).
    pub errors: Vec<String>,
    pub fetched_at_millis: i64,
    pub expires_at_millis: i64,
}

impl CacheEntry {
    fn new(
        origin: EntryOrigin,
        data: Vec<NormalizedBusRecord>,
        errors: Vec<String>,
        now_millis: i64,
        ttl: Duration,
    ) -> Self {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        Self {
            data,
            origin,
            errors,
            fetched_at_millis: now_millis,
            expires_at_millis: now_millis.saturating_add(ttl_millis),
        }
    }

    /// Whether the entry may still be served at `now_millis`.
    pub fn is_fresh(&self, now_millis: i64) -> bool {
        now_millis < self.expires_at_millis
    }

    fn to_bus_data(&self, source: DataSource) -> BusData {
        BusData {
            records: self.data.clone(),
            source,
            fetched_at_millis: self.fetched_at_millis,
            errors: self.errors.clone(),
        }
    }
}

/// Result of one upstream fetch attempt.
#[derive(Debug)]
pub enum FetchOutcome {
    /// At least one record survived validation.
    Live(Vec<ParsedBusRecord>),
    /// Network error, timeout, or unusable payload.
    Failed(FeedError),
}

/// What `get_bus_data` hands to callers.
#[derive(Debug, Clone)]
pub struct BusData {
    pub records: Vec<NormalizedBusRecord>,
    pub source: DataSource,
    pub fetched_at_millis: i64,
    pub errors: Vec<String>,
}

impl BusData {
    /// When the records were produced.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(self.fetched_at_millis).unwrap_or_default()
    }
}

/// Lifecycle state of the cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Empty,
    Fresh,
    Stale,
}

/// Snapshot of the cache slot for monitoring.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub state: SlotState,
    pub origin: Option<EntryOrigin>,
    pub record_count: usize,
    pub fetched_at_millis: Option<i64>,
    pub expires_at_millis: Option<i64>,
}

/// Caching front for a `FeedSource`.
pub struct BusFeedCache<S> {
    source: S,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    slot: RwLock<Option<Arc<CacheEntry>>>,
}

impl<S: FeedSource> BusFeedCache<S> {
    /// Create an empty cache using the system clock.
    pub fn new(source: S, config: CacheConfig) -> Self {
        Self::with_clock(source, config, Arc::new(SystemClock))
    }

    /// Create an empty cache with an explicit clock.
    pub fn with_clock(source: S, config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            config,
            slot: RwLock::new(None),
        }
    }

    /// Get the current bus records.
    ///
    /// Never fails: upstream problems degrade to mock data, and if even the
    /// mock generator fails the result is an empty list with the error set.
    pub async fn get_bus_data(&self) -> BusData {
        match self.resolve().await {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "bus data unavailable, returning empty result");
                BusData {
                    records: Vec::new(),
                    source: DataSource::Mock,
                    fetched_at_millis: self.clock.now_millis(),
                    errors: e.messages(),
                }
            }
        }
    }

    /// Serve from the slot or refresh it.
    ///
    /// Only a failure to produce any entry at all escapes as an error.
    async fn resolve(&self) -> Result<BusData, FeedError> {
        let now = self.clock.now_millis();
        if let Some(entry) = self.fresh_entry(now).await {
            debug!(
                origin = ?entry.origin,
                records = entry.data.len(),
                "serving cached bus data"
            );
            return Ok(entry.to_bus_data(DataSource::Cached));
        }

        let outcome = self.fetch().await;
        let entry = Arc::new(self.settle(outcome)?);
        let data = entry.to_bus_data(entry.origin.fresh_source());

        *self.slot.write().await = Some(entry);

        Ok(data)
    }

    async fn fresh_entry(&self, now_millis: i64) -> Option<Arc<CacheEntry>> {
        let guard = self.slot.read().await;
        guard
            .as_ref()
            .filter(|entry| entry.is_fresh(now_millis))
            .cloned()
    }

    /// Fetch and parse the upstream feed, bounded by the fetch timeout.
    pub async fn fetch(&self) -> FetchOutcome {
        let body = match tokio::time::timeout(self.config.fetch_timeout, self.source.fetch()).await
        {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => return FetchOutcome::Failed(e),
            Err(_) => return FetchOutcome::Failed(FeedError::Timeout(self.config.fetch_timeout)),
        };

        match parse_payload(&body) {
            Ok(batch) => {
                if batch.rejected > 0 {
                    debug!(
                        accepted = batch.records.len(),
                        rejected = batch.rejected,
                        "some feed records failed validation"
                    );
                }
                FetchOutcome::Live(batch.records)
            }
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    /// Turn a fetch outcome into the next cache entry.
    fn settle(&self, outcome: FetchOutcome) -> Result<CacheEntry, FeedError> {
        let now = self.clock.now_millis();

        match outcome {
            FetchOutcome::Live(records) => {
                let fetched_at = DateTime::<Utc>::from_timestamp_millis(now)
                    .ok_or(FeedError::ClockOutOfRange(now))?;
                let data = normalize_batch(&records, fetched_at);
                info!(records = data.len(), "refreshed live bus data");
                Ok(CacheEntry::new(
                    EntryOrigin::Live,
                    data,
                    Vec::new(),
                    now,
                    self.config.live_ttl,
                ))
            }
            FetchOutcome::Failed(reason) => {
                warn!(error = %reason, "upstream feed unavailable, serving mock data");
                let data = mock::generate(now).map_err(|e| FeedError::FallbackFailed {
                    upstream: reason.to_string(),
                    fallback: Box::new(e),
                })?;
                Ok(CacheEntry::new(
                    EntryOrigin::Mock,
                    data,
                    vec![reason.to_string()],
                    now,
                    self.config.mock_ttl,
                ))
            }
        }
    }

    /// Report the state of the slot at the current time.
    pub async fn status(&self) -> CacheStatus {
        let now = self.clock.now_millis();
        let guard = self.slot.read().await;

        match guard.as_ref() {
            None => CacheStatus {
                state: SlotState::Empty,
                origin: None,
                record_count: 0,
                fetched_at_millis: None,
                expires_at_millis: None,
            },
            Some(entry) => CacheStatus {
                state: if entry.is_fresh(now) {
                    SlotState::Fresh
                } else {
                    SlotState::Stale
                },
                origin: Some(entry.origin),
                record_count: entry.data.len(),
                fetched_at_millis: Some(entry.fetched_at_millis),
                expires_at_millis: Some(entry.expires_at_millis),
            },
        }
    }

    /// Empty the slot; the next read goes upstream.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
