use axum::http::Method;
use url::Url;

pub const CACHE_NAME: &str = "union-connect-v1";
pub const STATIC_CACHE: &str = "union-connect-v1-static";
pub const DYNAMIC_CACHE: &str = "union-connect-v1-dynamic";

pub const STATIC_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    "/assets/css/index.css",
    "/assets/js/main.js",
    "/favicon.ico",
];

pub const CACHE_FIRST_EXTENSIONS: &[&str] = &["js", "css", "woff", "woff2", "ttf", "eot"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cacheFirst",
            Strategy::NetworkFirst => "networkFirst",
            Strategy::StaleWhileRevalidate => "staleWhileRevalidate",
        }
    }
}

/// `None` means the request goes straight to the network untouched.
pub fn strategy_for(method: &Method, url: &Url) -> Option<Strategy> {
    if method != Method::GET || url.scheme() == "chrome-extension" {
        return None;
    }

    let path = url.path();
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.contains('/'));

    if extension.is_some_and(|ext| CACHE_FIRST_EXTENSIONS.contains(&ext))
        || path.starts_with("/assets/")
    {
        Some(Strategy::CacheFirst)
    } else if path.starts_with("/api/") {
        Some(Strategy::NetworkFirst)
    } else if !path.starts_with("/api") {
        Some(Strategy::StaleWhileRevalidate)
    } else {
        None
    }
}

/// Caches from an older worker version that activation should delete.
pub fn stale_caches<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    names
        .into_iter()
        .filter(|name| {
            name.starts_with(CACHE_NAME) && *name != STATIC_CACHE && *name != DYNAMIC_CACHE
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("test urls are valid")
    }

    #[test]
    fn test_strategy_selection() {
        let get = Method::GET;
        assert_eq!(
            strategy_for(&get, &url("http://localhost/assets/logo.png")),
            Some(Strategy::CacheFirst)
        );
        assert_eq!(
            strategy_for(&get, &url("http://localhost/sw.js")),
            Some(Strategy::CacheFirst)
        );
        assert_eq!(
            strategy_for(&get, &url("http://localhost/fonts/inter.woff2")),
            Some(Strategy::CacheFirst)
        );
        assert_eq!(
            strategy_for(&get, &url("http://localhost/api/tickets")),
            Some(Strategy::NetworkFirst)
        );
        assert_eq!(
            strategy_for(&get, &url("http://localhost/tickets?q=safety")),
            Some(Strategy::StaleWhileRevalidate)
        );
        assert_eq!(
            strategy_for(&get, &url("http://localhost/")),
            Some(Strategy::StaleWhileRevalidate)
        );
        assert_eq!(strategy_for(&get, &url("http://localhost/apiary")), None);
    }

    #[test]
    fn test_bypass() {
        assert_eq!(
            strategy_for(&Method::POST, &url("http://localhost/tickets/new")),
            None
        );
        assert_eq!(
            strategy_for(&Method::GET, &url("chrome-extension://abc/script.js")),
            None
        );
    }

    #[test]
    fn test_stale_caches() {
        let names = [
            "union-connect-v1-static",
            "union-connect-v1-dynamic",
            "union-connect-v1-old",
            "someone-else",
        ];
        assert_eq!(stale_caches(names), vec!["union-connect-v1-old"]);
    }
}
