use super::cache::CacheStorage;
use super::cache::CachedResponse;
use super::strategy::DYNAMIC_CACHE;
use super::strategy::STATIC_ASSETS;
use super::strategy::STATIC_CACHE;
use super::strategy::Strategy;
use super::strategy::stale_caches;
use super::strategy::strategy_for;
use async_trait::async_trait;
use axum::http::Method;
use std::sync::Arc;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    Network(String),
}

#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &Url) -> Result<CachedResponse, FetchError>;
}

/// Caching proxy with the same rules the browser worker runs.
pub struct OfflineWorker<F: Fetcher> {
    storage: Arc<CacheStorage>,
    fetcher: Arc<F>,
}

impl<F: Fetcher> OfflineWorker<F> {
    pub fn new(storage: Arc<CacheStorage>, fetcher: Arc<F>) -> Self {
        Self { storage, fetcher }
    }

    /// Pre-caches the static assets. Fails if any of them can't be fetched.
    pub async fn install(&self, origin: &Url) -> Result<(), FetchError> {
        for asset in STATIC_ASSETS {
            let url = origin
                .join(asset)
                .map_err(|e| FetchError::Network(e.to_string()))?;
            let response = self.fetcher.fetch(&url).await?;
            self.storage.put(STATIC_CACHE, url.as_str(), response);
        }
        tracing::info!("offline worker installed {} assets", STATIC_ASSETS.len());
        Ok(())
    }

    pub fn activate(&self) -> Vec<String> {
        let keys = self.storage.keys();
        let stale: Vec<String> = stale_caches(keys.iter().map(String::as_str))
            .into_iter()
            .map(str::to_string)
            .collect();

        for name in &stale {
            self.storage.delete(name);
        }
        stale
    }

    /// `None` when the request bypasses the worker.
    pub async fn handle(&self, method: &Method, url: &Url) -> Option<CachedResponse> {
        let strategy = strategy_for(method, url)?;
        let response = match strategy {
            Strategy::CacheFirst => self.cache_first(url).await,
            Strategy::NetworkFirst => self.network_first(url).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(url).await,
        };
        Some(response)
    }

    async fn cache_first(&self, url: &Url) -> CachedResponse {
        if let Some(cached) = self.storage.match_any(url.as_str()) {
            return cached;
        }

        match self.fetcher.fetch(url).await {
            Ok(response) => {
                if response.ok() {
                    self.storage
                        .put(STATIC_CACHE, url.as_str(), response.clone());
                }
                response
            }
            Err(e) => {
                tracing::debug!("network failed, no cache available: {}", e);
                CachedResponse::offline()
            }
        }
    }

    async fn network_first(&self, url: &Url) -> CachedResponse {
        match self.fetcher.fetch(url).await {
            Ok(response) => {
                if response.ok() {
                    self.storage
                        .put(DYNAMIC_CACHE, url.as_str(), response.clone());
                }
                response
            }
            Err(_) => self
                .storage
                .match_any(url.as_str())
                .unwrap_or_else(CachedResponse::offline),
        }
    }

    async fn stale_while_revalidate(&self, url: &Url) -> CachedResponse {
        let cached = self.storage.match_in(DYNAMIC_CACHE, url.as_str());

        if let Some(cached) = cached {
            let storage = self.storage.clone();
            let fetcher = self.fetcher.clone();
            let url = url.clone();
            tokio::spawn(async move {
                if let Ok(fresh) = fetcher.fetch(&url).await
                    && fresh.ok()
                {
                    storage.put(DYNAMIC_CACHE, url.as_str(), fresh);
                }
            });
            return cached;
        }

        match self.fetcher.fetch(url).await {
            Ok(response) => {
                if response.ok() {
                    self.storage
                        .put(DYNAMIC_CACHE, url.as_str(), response.clone());
                }
                response
            }
            Err(_) => CachedResponse::offline(),
        }
    }
}
