use crate::auth::MemoryUserStore;
use crate::config::Config;
use crate::offline::CacheStorage;
use crate::security::RateLimiter;
use crate::seo::SeoConfig;
use crate::seo::SeoManager;
use crate::telemetry::Analytics;
use crate::telemetry::ApplicationMonitor;
use crate::telemetry::ErrorLog;
use crate::telemetry::PerformanceMonitor;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Everything a handler can reach. Cloned per request, so every field is a
/// cheap handle onto shared state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub user_store: MemoryUserStore,
    pub rate_limiter: RateLimiter,
    pub analytics: Arc<Analytics>,
    pub errors: Arc<ErrorLog>,
    pub performance: Arc<PerformanceMonitor>,
    pub monitor: Arc<ApplicationMonitor>,
    pub seo: Arc<SeoManager>,
    pub cache: Arc<CacheStorage>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let production = config.is_production();

        let analytics = Arc::new(Analytics::new(
            config.analytics_enabled(),
            !production,
            config.analytics_queue_size,
        ));
        let errors = Arc::new(ErrorLog::new(config.max_error_entries, production));
        let performance = Arc::new(PerformanceMonitor::new(config.environment));
        let cache = Arc::new(CacheStorage::new());
        let monitor = Arc::new(ApplicationMonitor::new(
            errors.clone(),
            performance.clone(),
            analytics.clone(),
            cache.clone(),
        ));

        Self {
            user_store: MemoryUserStore::new(),
            rate_limiter: RateLimiter::new(
                config.login_max_attempts,
                config.login_window(),
            ),
            seo: Arc::new(SeoManager::new(SeoConfig::for_site(&config.site_url))),
            config: Arc::new(config),
            analytics,
            errors,
            performance,
            monitor,
            cache,
        }
    }

    /// Drops signed-in users that went idle and closed rate-limit windows.
    pub fn sweep(&self) {
        let users = self.user_store.prune_idle(self.config.session_idle());
        let windows = self.rate_limiter.prune_expired();
        if users + windows > 0 {
            tracing::debug!("swept {} idle users and {} rate-limit windows", users, windows);
        }
    }

    /// Sweeps on every tick until the handle is aborted.
    pub fn start_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                state.sweep();
            }
        })
    }

    /// Stand-in for the round trip to a backend that does not exist yet.
    pub async fn simulate_latency(&self) {
        let delay = self.config.simulated_latency();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
