use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn offline() -> Self {
        Self {
            status: 503,
            content_type: "text/plain".to_string(),
            body: b"Offline".to_vec(),
        }
    }
}

type Cache = Arc<DashMap<String, CachedResponse>>;

/// Named caches of url to response.
#[derive(Default)]
pub struct CacheStorage {
    caches: DashMap<String, Cache>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn open(&self, name: &str) -> Cache {
        self.caches
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(DashMap::new()))
            .clone()
    }

    pub fn put(&self, cache: &str, url: &str, response: CachedResponse) {
        self.open(cache).insert(url.to_string(), response);
    }

    pub fn match_in(&self, cache: &str, url: &str) -> Option<CachedResponse> {
        self.caches
            .get(cache)
            .and_then(|c| c.get(url).map(|r| r.clone()))
    }

    /// Looks through every cache, like the browser's `caches.match`.
    pub fn match_any(&self, url: &str) -> Option<CachedResponse> {
        self.caches
            .iter()
            .find_map(|c| c.value().get(url).map(|r| r.clone()))
    }

    pub fn remove(&self, cache: &str, url: &str) -> Option<CachedResponse> {
        self.caches
            .get(cache)
            .and_then(|c| c.remove(url).map(|(_, r)| r))
    }

    pub fn delete(&self, cache: &str) -> bool {
        self.caches.remove(cache).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.caches.iter().map(|c| c.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn entry_count(&self) -> usize {
        self.caches.iter().map(|c| c.value().len()).sum()
    }

    /// Write-read-delete round trip used by the storage health check.
    pub fn self_test(&self) -> bool {
        const CACHE: &str = "__monitor_test__";
        let marker = CachedResponse {
            status: 200,
            content_type: "text/plain".to_string(),
            body: b"test".to_vec(),
        };

        self.put(CACHE, "/", marker.clone());
        let readable = self.match_in(CACHE, "/") == Some(marker);
        let deleted = self.delete(CACHE);
        readable && deleted
    }
}
