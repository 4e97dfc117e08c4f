use clap::Parser;
use clap::ValueEnum;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Production,
}

/// Runtime settings. Every flag can also come from the environment (or a
/// `.env` file loaded by `dotenvy` before parsing).
#[derive(Debug, Clone, Parser)]
#[command(name = "union-connect", about = "Union Connect Hub member portal")]
pub struct Config {
    #[arg(long, env = "SITE_ADDR", default_value = "0.0.0.0:3000")]
    pub site_addr: String,

    #[arg(long, env = "SITE_URL", default_value = "http://localhost:3000")]
    pub site_url: String,

    #[arg(long, env = "APP_ENV", value_enum, default_value = "development")]
    pub environment: Environment,

    /// Defaults to on in production.
    #[arg(long, env = "ANALYTICS_ENABLED")]
    pub analytics_enabled: Option<bool>,

    #[arg(long, env = "SIMULATED_LATENCY_MS", default_value_t = 1000)]
    pub simulated_latency_ms: u64,

    #[arg(long, env = "HEALTH_INTERVAL_SECS", default_value_t = 30)]
    pub health_interval_secs: u64,

    #[arg(long, env = "MAX_ERROR_ENTRIES", default_value_t = 50)]
    pub max_error_entries: usize,

    #[arg(long, env = "ANALYTICS_QUEUE_SIZE", default_value_t = 100)]
    pub analytics_queue_size: usize,

    #[arg(long, env = "LOGIN_MAX_ATTEMPTS", default_value_t = 5)]
    pub login_max_attempts: u32,

    #[arg(long, env = "LOGIN_WINDOW_SECS", default_value_t = 60)]
    pub login_window_secs: u64,

    #[arg(long, env = "SECURE_COOKIES", default_value_t = false)]
    pub secure_cookies: bool,

    /// Sessions and signed-in users are dropped after this long unused.
    #[arg(long, env = "SESSION_IDLE_MINS", default_value_t = 30)]
    pub session_idle_mins: u64,

    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value_t = 60)]
    pub sweep_interval_secs: u64,
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn analytics_enabled(&self) -> bool {
        self.analytics_enabled.unwrap_or(self.is_production())
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs)
    }

    pub fn login_window(&self) -> Duration {
        Duration::from_secs(self.login_window_secs)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_mins * 60)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_addr: "0.0.0.0:3000".to_string(),
            site_url: "http://localhost:3000".to_string(),
            environment: Environment::Development,
            analytics_enabled: None,
            simulated_latency_ms: 1000,
            health_interval_secs: 30,
            max_error_entries: 50,
            analytics_queue_size: 100,
            login_max_attempts: 5,
            login_window_secs: 60,
            secure_cookies: false,
            session_idle_mins: 30,
            sweep_interval_secs: 60,
        }
    }
}
