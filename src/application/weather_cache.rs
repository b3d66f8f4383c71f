// Short-lived cache for upstream weather lookups
use crate::application::clock::Clock;
use crate::application::fleet_repository::WeatherSource;
use crate::domain::vehicle::Position;
use crate::domain::weather::WeatherReading;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Map whose entries expire `ttl` after insertion, measured on an injected clock.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Live value for `key`; an expired entry is evicted and reported as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let entry = entries.get(key)?;
        if now <= entry.expires_at {
            return Some(entry.value.clone());
        }

        entries.remove(key);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries.lock().insert(key, Entry { value, expires_at });
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn remove_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.expires_at);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Weather source that answers repeated lookups for a position from cache.
pub struct CachedWeatherSource {
    inner: Arc<dyn WeatherSource>,
    cache: TtlCache<String, WeatherReading>,
}

impl CachedWeatherSource {
    pub fn new(inner: Arc<dyn WeatherSource>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl, clock),
        }
    }
}

#[async_trait]
impl WeatherSource for CachedWeatherSource {
    async fn current(&self, position: Position) -> anyhow::Result<WeatherReading> {
        let key = position.key();
        if let Some(reading) = self.cache.get(&key) {
            tracing::debug!("Weather cache hit for {}", key);
            return Ok(reading);
        }

        let reading = self.inner.current(position).await?;
        let evicted = self.cache.remove_expired();
        self.cache.insert(key, reading.clone());
        tracing::debug!("Weather cache refreshed, {} evicted, {} held", evicted, self.cache.len());
        Ok(reading)
    }
}
