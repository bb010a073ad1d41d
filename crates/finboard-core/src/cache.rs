//! Time-to-live response cache
//!
//! Memoizes successful fetches per URL. Entries are fresh while
//! `now - fetched_at <= ttl`; failed fetches are never stored, so the next
//! request for the same URL tries the analysis service again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::fetch::{report_failure, Fetcher};
use crate::models::Notices;

/// Default freshness window (one hour)
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests
///
/// Clones share the same instant, so a test can keep one handle and move
/// time forward while the cache holds another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A cached JSON payload
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub fetched_at: DateTime<Utc>,
}

/// Per-session response cache
pub struct ResponseCache<C: Clock = SystemClock> {
    ttl: Duration,
    clock: C,
    entries: HashMap<String, CacheEntry>,
}

impl ResponseCache<SystemClock> {
    /// Cache with the default one hour TTL and wall-clock time
    pub fn new() -> Self {
        Self::with_clock(Duration::seconds(DEFAULT_TTL_SECS), SystemClock)
    }
}

impl Default for ResponseCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ResponseCache<C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `url`, if any
    pub fn get(&self, url: &str) -> Option<&Value> {
        let entry = self.entries.get(url)?;
        if self.clock.now() - entry.fetched_at <= self.ttl {
            Some(&entry.value)
        } else {
            None
        }
    }

    /// Store `value` for `url`, replacing any previous entry
    pub fn insert(&mut self, url: &str, value: Value) {
        let entry = CacheEntry {
            value,
            fetched_at: self.clock.now(),
        };
        self.entries.insert(url.to_string(), entry);
    }

    /// Return the cached value or fetch it
    ///
    /// A failed fetch, or a `null` body, pushes one error notice and yields
    /// `None`; nothing is stored for that URL.
    pub async fn cached_fetch(
        &mut self,
        fetcher: &dyn Fetcher,
        url: &str,
        notices: &mut Notices,
    ) -> Option<Value> {
        if let Some(value) = self.get(url) {
            debug!(url = %url, "Cache hit");
            return Some(value.clone());
        }

        debug!(url = %url, "Cache miss");
        match fetcher.fetch(url).await {
            Ok(Value::Null) => {
                let err = Error::InvalidData("analysis service returned null".into());
                notices.push(report_failure(url, &err));
                None
            }
            Ok(value) => {
                self.insert(url, value.clone());
                Some(value)
            }
            Err(e) => {
                notices.push(report_failure(url, &e));
                None
            }
        }
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        debug!(entries = self.entries.len(), "Cache cleared");
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
