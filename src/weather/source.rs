/*
 *  weather/source.rs
 *
 *  PaperWeather - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cached snapshot source with stale fallback and a single connect retry
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{debug, info, warn};
use rand::Rng;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::weather::{FetchError, WeatherProvider, WeatherSnapshot};

#[derive(Debug, Error)]
pub enum SourceError {
    /// Fetch failed and nothing has ever been cached.
    #[error("no weather data available: {cause}")]
    NoDataAvailable { cause: FetchError },
}

/// Timing knobs for a source. Both values come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePolicy {
    pub ttl: Duration,
    pub retry_backoff: Duration,
}

impl Default for SourcePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            retry_backoff: Duration::from_millis(1500),
        }
    }
}

/// Last successfully fetched snapshot.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub snapshot: WeatherSnapshot,
    pub fetched_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        self.age(now) < self.ttl
    }
}

/// A snapshot plus whether it came from an expired cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotReading {
    pub snapshot: WeatherSnapshot,
    pub is_stale: bool,
}

/// Owns the provider and the single-slot cache.
///
/// The cache is only replaced by a successful fetch; a failed fetch never
/// clears it.
pub struct WeatherSource<P> {
    provider: P,
    policy: SourcePolicy,
    cache: Option<CacheEntry>,
}

impl<P: WeatherProvider> WeatherSource<P> {
    pub fn new(provider: P, policy: SourcePolicy) -> Self {
        Self { provider, policy, cache: None }
    }

    pub fn policy(&self) -> SourcePolicy {
        self.policy
    }

    pub fn cached(&self) -> Option<&CacheEntry> {
        self.cache.as_ref()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Latest snapshot: cache within TTL, else a fetch, else the expired
    /// cache marked stale.
    pub async fn current_snapshot(&mut self) -> Result<SnapshotReading, SourceError> {
        if let Some(entry) = &self.cache {
            if entry.is_fresh(Instant::now()) {
                debug!(
                    "{}: cache hit, age {}s of {}s",
                    self.provider.name(),
                    entry.age(Instant::now()).as_secs(),
                    entry.ttl.as_secs()
                );
                return Ok(SnapshotReading { snapshot: entry.snapshot.clone(), is_stale: false });
            }
        }

        match self.fetch_with_retry().await {
            Ok(snapshot) => {
                info!(
                    "{}: fetched snapshot for {} at {}",
                    self.provider.name(),
                    snapshot.location,
                    snapshot.timestamp
                );
                self.cache = Some(CacheEntry {
                    snapshot: snapshot.clone(),
                    fetched_at: Instant::now(),
                    ttl: self.policy.ttl,
                });
                Ok(SnapshotReading { snapshot, is_stale: false })
            }
            Err(cause) => match &self.cache {
                Some(entry) => {
                    warn!(
                        "{}: fetch failed ({}), serving cached snapshot from {}s ago",
                        self.provider.name(),
                        cause,
                        entry.age(Instant::now()).as_secs()
                    );
                    Ok(SnapshotReading { snapshot: entry.snapshot.clone(), is_stale: true })
                }
                None => Err(SourceError::NoDataAvailable { cause }),
            },
        }
    }

    async fn fetch_with_retry(&mut self) -> Result<WeatherSnapshot, FetchError> {
        match self.provider.fetch().await {
            Err(e) if e.is_transient_connect() => {
                let wait = with_jitter(self.policy.retry_backoff);
                warn!("{}: {}, retrying once in {}ms", self.provider.name(), e, wait.as_millis());
                tokio::time::sleep(wait).await;
                self.provider.fetch().await
            }
            other => other,
        }
    }
}

/// Base backoff plus up to 25% random jitter.
fn with_jitter(base: Duration) -> Duration {
    let max = base.as_millis() as u64 / 4;
    if max == 0 {
        return base;
    }
    base + Duration::from_millis(rand::rng().random_range(0..=max))
}
