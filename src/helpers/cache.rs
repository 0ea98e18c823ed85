//! Key-value cache used for session caching, one-shot auth tokens,
//! view-dedup markers and the scraper status record.
//!
//! Two backends implement [`Cache`]: Redis (shared between processes) and an
//! in-process map used when Redis is unreachable and in tests. Values are
//! strings; [`get_json`](trait.Cache.html#method.get_json) and friends add
//! serde on top.

use crate::configuration::RedisSettings;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache value can't be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>)
        -> Result<(), CacheError>;

    /// Stores the value only when the key is absent. Returns whether it was stored.
    async fn set_if_absent(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError>;

    /// Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Drops expired entries, optionally only under `prefix`. Backends with native
    /// expiry report zero.
    async fn evict_expired(&self, prefix: Option<&str>) -> usize;

    fn backend(&self) -> &'static str;
}

impl<'c> dyn Cache + 'c {
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw, ttl).await
    }
}

pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("NX");
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }
        let stored: Option<String> = cmd.query_async(&mut conn).await?;
        Ok(stored.is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn evict_expired(&self, _prefix: Option<&str>) -> usize {
        0
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Backend("memory cache lock poisoned".to_string()))
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.lock()?;
        let expired = match entries.get(key) {
            Some(entry) => entry.is_expired(Instant::now()),
            None => return Ok(None),
        };
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.lock()?
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<bool, CacheError> {
        let mut entries = self.lock()?;
        let now = Instant::now();
        if let Some(entry) = entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(false);
            }
        }
        let expires_at = ttl.map(|ttl| now + ttl);
        entries.insert(key.to_string(), Entry { value, expires_at });
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let removed = self.lock()?.remove(key);
        Ok(removed.map_or(false, |entry| !entry.is_expired(Instant::now())))
    }

    async fn evict_expired(&self, prefix: Option<&str>) -> usize {
        let mut entries = match self.lock() {
            Ok(entries) => entries,
            Err(err) => {
                tracing::error!("{}", err);
                return 0;
            }
        };
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|key, entry| {
            let in_scope = prefix.map_or(true, |prefix| key.starts_with(prefix));
            !(in_scope && entry.is_expired(now))
        });
        before - entries.len()
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Connects to Redis, falling back to the in-process cache so the app still
/// starts without cache connectivity.
pub async fn connect(settings: &RedisSettings) -> Arc<dyn Cache> {
    let timeout = Duration::from_secs(settings.connect_timeout_secs);
    match tokio::time::timeout(timeout, RedisCache::connect(&settings.url)).await {
        Ok(Ok(cache)) => {
            tracing::info!("Connected to Redis cache");
            Arc::new(cache)
        }
        Ok(Err(err)) => {
            tracing::warn!("Redis is unavailable ({}), using in-process cache", err);
            Arc::new(MemoryCache::new())
        }
        Err(_) => {
            tracing::warn!("Redis connection timed out, using in-process cache");
            Arc::new(MemoryCache::new())
        }
    }
}
