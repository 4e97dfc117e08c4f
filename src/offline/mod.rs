pub mod cache;
pub mod strategy;
pub mod worker;

use crate::theme::MAIN_JS;
use crate::theme::PREFERENCE_CSS;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use serde_json::json;
use strategy::CACHE_FIRST_EXTENSIONS;
use strategy::CACHE_NAME;
use strategy::DYNAMIC_CACHE;
use strategy::STATIC_ASSETS;
use strategy::STATIC_CACHE;

pub use cache::CacheStorage;

const WORKER_BODY: &str = r#"
self.addEventListener('install', event => {
  event.waitUntil(
    caches.open(STATIC_CACHE)
      .then(cache => cache.addAll(STATIC_ASSETS))
      .then(() => self.skipWaiting())
  );
});

self.addEventListener('activate', event => {
  event.waitUntil(
    caches.keys()
      .then(keys => Promise.all(
        keys
          .filter(key => key.startsWith(CACHE_NAME) && key !== STATIC_CACHE && key !== DYNAMIC_CACHE)
          .map(key => caches.delete(key))
      ))
      .then(() => self.clients.claim())
  );
});

self.addEventListener('fetch', event => {
  const { request } = event;
  const url = new URL(request.url);

  if (request.method !== 'GET') return;
  if (url.protocol === 'chrome-extension:') return;

  if (CACHE_FIRST.test(url.pathname) || url.pathname.startsWith('/assets/')) {
    event.respondWith(cacheFirst(request));
  } else if (url.pathname.startsWith('/api/')) {
    event.respondWith(networkFirst(request));
  } else if (!url.pathname.startsWith('/api')) {
    event.respondWith(staleWhileRevalidate(request));
  }
});

async function cacheFirst(request) {
  const cachedResponse = await caches.match(request);
  if (cachedResponse) {
    return cachedResponse;
  }

  try {
    const networkResponse = await fetch(request);
    if (networkResponse.ok) {
      const cache = await caches.open(STATIC_CACHE);
      cache.put(request, networkResponse.clone());
    }
    return networkResponse;
  } catch (error) {
    return new Response('Offline', { status: 503 });
  }
}

async function networkFirst(request) {
  try {
    const networkResponse = await fetch(request);
    if (networkResponse.ok) {
      const cache = await caches.open(DYNAMIC_CACHE);
      cache.put(request, networkResponse.clone());
    }
    return networkResponse;
  } catch (error) {
    const cachedResponse = await caches.match(request);
    return cachedResponse || new Response('Offline', { status: 503 });
  }
}

async function staleWhileRevalidate(request) {
  const cache = await caches.open(DYNAMIC_CACHE);
  const cachedResponse = await cache.match(request);

  const fetchPromise = fetch(request).then(networkResponse => {
    if (networkResponse.ok) {
      cache.put(request, networkResponse.clone());
    }
    return networkResponse;
  }).catch(() => cachedResponse || new Response('Offline', { status: 503 }));

  return cachedResponse || fetchPromise;
}
"#;

/// The browser worker, with its tables taken from the same constants the
/// in-process worker uses.
pub fn service_worker_script() -> String {
    let assets = serde_json::to_string(STATIC_ASSETS).unwrap_or_else(|_| "[]".to_string());
    format!(
        "const CACHE_NAME = '{}';\nconst STATIC_CACHE = '{}';\nconst DYNAMIC_CACHE = '{}';\nconst STATIC_ASSETS = {};\nconst CACHE_FIRST = /\\.(?:{})$/;\n{}",
        CACHE_NAME,
        STATIC_CACHE,
        DYNAMIC_CACHE,
        assets,
        CACHE_FIRST_EXTENSIONS.join("|"),
        WORKER_BODY
    )
}

pub fn manifest() -> serde_json::Value {
    json!({
        "name": "Union Connect Hub",
        "short_name": "TEE 1104",
        "description": "Member portal for TEE 1104 Union",
        "start_url": "/",
        "display": "standalone",
        "background_color": "#ffffff",
        "theme_color": "#4f46e5",
        "icons": [
            { "src": "/logo.svg", "sizes": "any", "type": "image/svg+xml" }
        ]
    })
}

pub async fn serve_service_worker() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        service_worker_script(),
    )
}

pub async fn serve_stylesheet() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        PREFERENCE_CSS,
    )
}

pub async fn serve_main_script() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript")],
        MAIN_JS,
    )
}

pub async fn serve_manifest() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/manifest+json")],
        manifest().to_string(),
    )
}
