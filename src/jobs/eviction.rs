use crate::helpers::Cache;
use crate::services::auth::telegram;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub async fn evict_once(cache: &dyn Cache, prefix: Option<&str>) -> usize {
    let evicted = cache.evict_expired(prefix).await;
    if evicted > 0 {
        tracing::debug!(
            "Evicted {} expired {} entries",
            evicted,
            prefix.unwrap_or("cache")
        );
    }
    evicted
}

fn spawn_eviction(
    name: &'static str,
    cache: Arc<dyn Cache>,
    prefix: Option<&'static str>,
    interval_secs: u64,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        tracing::info!("{} loop started ({} backend)", name, cache.backend());
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    evict_once(cache.as_ref(), prefix).await;
                }
            }
        }
        tracing::info!("{} loop stopped", name);
    })
}

pub fn spawn_cache_eviction(
    cache: Arc<dyn Cache>,
    interval_secs: u64,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    spawn_eviction("Cache eviction", cache, None, interval_secs, shutdown)
}

pub fn spawn_auth_token_eviction(
    cache: Arc<dyn Cache>,
    interval_secs: u64,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    spawn_eviction(
        "Auth token eviction",
        cache,
        Some(telegram::KEY_PREFIX),
        interval_secs,
        shutdown,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::MemoryCache;

    #[tokio::test]
    async fn eviction_loop_removes_expired_tokens_and_stops() {
        let memory = Arc::new(MemoryCache::new());
        memory
            .set("tg_auth:abc", "{}".to_string(), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        memory
            .set("tg_auth:live", "{}".to_string(), None)
            .await
            .unwrap();
        let cache: Arc<dyn Cache> = memory.clone();

        tokio::time::sleep(Duration::from_millis(30)).await;
        let shutdown = CancellationToken::new();
        let handle = spawn_auth_token_eviction(cache, 1, shutdown.clone());

        // the first tick fires immediately
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(memory.evict_expired(None).await, 0);
        assert!(memory.get("tg_auth:live").await.unwrap().is_some());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop did not stop")
            .unwrap();
    }
}
