use super::analytics::Analytics;
use super::analytics::Visitor;
use super::errors::ErrorEntry;
use super::errors::ErrorLog;
use super::errors::ErrorOrigin;
use super::performance::PROD_SLOW;
use super::performance::PerformanceMonitor;
use crate::offline::CacheStorage;
use async_trait::async_trait;
use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub status: HealthStatus,
    pub message: String,
}

impl CheckOutcome {
    fn new(status: HealthStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CheckError(pub String);

#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self) -> Result<CheckOutcome, CheckError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    pub name: String,
    pub status: HealthStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub response_time_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub overall: HealthStatus,
    pub checks: Vec<HealthCheckResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorSummary {
    pub count: usize,
    pub recent: Vec<ErrorEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemMetrics {
    pub uptime_ms: u64,
    pub errors: ErrorSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitoringReport {
    pub timestamp: DateTime<Utc>,
    pub health: HealthReport,
    pub metrics: SystemMetrics,
    pub performance: BTreeMap<String, f64>,
}

/// Only errors this recent count toward the error rate.
const ERROR_WINDOW_MINUTES: i64 = 5;

pub struct ErrorRateCheck {
    errors: Arc<ErrorLog>,
}

#[async_trait]
impl HealthCheck for ErrorRateCheck {
    fn name(&self) -> &'static str {
        "errors"
    }

    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        let count = self
            .errors
            .count_within(TimeDelta::minutes(ERROR_WINDOW_MINUTES));
        Ok(match count {
            c if c > 10 => CheckOutcome::new(
                HealthStatus::Unhealthy,
                format!("High error rate: {} errors", c),
            ),
            c if c > 5 => CheckOutcome::new(
                HealthStatus::Degraded,
                format!("Elevated error rate: {} errors", c),
            ),
            c => CheckOutcome::new(
                HealthStatus::Healthy,
                format!("Error rate normal: {} errors", c),
            ),
        })
    }
}

pub struct PerformanceCheck {
    performance: Arc<PerformanceMonitor>,
}

#[async_trait]
impl HealthCheck for PerformanceCheck {
    fn name(&self) -> &'static str {
        "performance"
    }

    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        let slow = self.performance.slow_operations(PROD_SLOW);
        Ok(match slow.len() {
            0 => CheckOutcome::new(HealthStatus::Healthy, "Performance normal"),
            n if n > 3 => {
                CheckOutcome::new(HealthStatus::Degraded, "Multiple slow operations detected")
            }
            n => CheckOutcome::new(
                HealthStatus::Degraded,
                format!("{} slow operation(s)", n),
            ),
        })
    }
}

pub struct StorageCheck {
    storage: Arc<CacheStorage>,
}

#[async_trait]
impl HealthCheck for StorageCheck {
    fn name(&self) -> &'static str {
        "storage"
    }

    async fn check(&self) -> Result<CheckOutcome, CheckError> {
        if self.storage.self_test() {
            Ok(CheckOutcome::new(HealthStatus::Healthy, "Storage accessible"))
        } else {
            Ok(CheckOutcome::new(
                HealthStatus::Unhealthy,
                "Storage not accessible",
            ))
        }
    }
}

pub struct ApplicationMonitor {
    checks: Vec<Box<dyn HealthCheck>>,
    results: DashMap<String, HealthCheckResult>,
    started: Instant,
    task: Mutex<Option<JoinHandle<()>>>,
    errors: Arc<ErrorLog>,
    performance: Arc<PerformanceMonitor>,
    analytics: Arc<Analytics>,
}

impl ApplicationMonitor {
    /// A monitor with the built-in error, performance and storage checks.
    pub fn new(
        errors: Arc<ErrorLog>,
        performance: Arc<PerformanceMonitor>,
        analytics: Arc<Analytics>,
        storage: Arc<CacheStorage>,
    ) -> Self {
        let mut monitor = Self {
            checks: Vec::new(),
            results: DashMap::new(),
            started: Instant::now(),
            task: Mutex::new(None),
            errors: errors.clone(),
            performance: performance.clone(),
            analytics,
        };
        monitor.register(Box::new(ErrorRateCheck { errors }));
        monitor.register(Box::new(PerformanceCheck { performance }));
        monitor.register(Box::new(StorageCheck { storage }));
        monitor
    }

    pub fn register(&mut self, check: Box<dyn HealthCheck>) {
        self.checks.push(check);
    }

    pub async fn run_health_checks(&self) {
        let visitor = Visitor {
            session_id: "system".to_string(),
            user_id: None,
            page: "monitor".to_string(),
        };

        for check in &self.checks {
            let name = check.name();
            let start = Instant::now();
            let outcome = check.check().await;
            let response_time_ms = start.elapsed().as_secs_f64() * 1000.0;

            let (status, message) = match outcome {
                Ok(outcome) => {
                    if outcome.status != HealthStatus::Healthy {
                        tracing::warn!(
                            "health check \"{}\" is {}: {}",
                            name,
                            outcome.status.as_str(),
                            outcome.message
                        );
                        self.analytics.track(
                            &visitor,
                            "health_check_warning",
                            json!({
                                "check": name,
                                "status": outcome.status,
                                "message": outcome.message,
                            }),
                        );
                    }
                    (outcome.status, outcome.message)
                }
                Err(e) => {
                    self.errors.log_error(
                        e.to_string(),
                        json!({ "healthCheck": name }),
                        ErrorOrigin::default(),
                    );
                    (HealthStatus::Unhealthy, format!("Check failed: {}", e))
                }
            };

            self.results.insert(
                name.to_string(),
                HealthCheckResult {
                    name: name.to_string(),
                    status,
                    message,
                    timestamp: Utc::now(),
                    response_time_ms,
                },
            );
        }
    }

    /// Runs the checks now and then on every tick until stopped. Starting
    /// an already running monitor does nothing.
    pub fn start(self: &Arc<Self>, every: Duration) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if task.is_some() {
            return;
        }

        let monitor = self.clone();
        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                // the first tick completes immediately
                interval.tick().await;
                monitor.run_health_checks().await;
            }
        }));
        tracing::info!("application monitoring started");
    }

    pub fn stop(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = task.take() {
            handle.abort();
            tracing::info!("application monitoring stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn health_status(&self) -> HealthReport {
        let mut checks: Vec<HealthCheckResult> =
            self.results.iter().map(|r| r.value().clone()).collect();
        checks.sort_by(|a, b| a.name.cmp(&b.name));

        let overall = if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthReport { overall, checks }
    }

    pub fn system_metrics(&self) -> SystemMetrics {
        let recent = self.errors.recent();
        SystemMetrics {
            uptime_ms: self.started.elapsed().as_millis() as u64,
            errors: ErrorSummary {
                count: recent.len(),
                recent: recent.into_iter().take(5).collect(),
            },
        }
    }

    pub fn report(&self) -> MonitoringReport {
        MonitoringReport {
            timestamp: Utc::now(),
            health: self.health_status(),
            metrics: self.system_metrics(),
            performance: self.performance.metrics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use serde_json::Value;

    struct Broken;

    #[async_trait]
    impl HealthCheck for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn check(&self) -> Result<CheckOutcome, CheckError> {
            Err(CheckError("disk unreadable".into()))
        }
    }

    struct Parts {
        errors: Arc<ErrorLog>,
        performance: Arc<PerformanceMonitor>,
        analytics: Arc<Analytics>,
    }

    fn monitor() -> (ApplicationMonitor, Parts) {
        let parts = Parts {
            errors: Arc::new(ErrorLog::new(50, false)),
            performance: Arc::new(PerformanceMonitor::new(Environment::Development)),
            analytics: Arc::new(Analytics::new(false, false, 100)),
        };
        let monitor = ApplicationMonitor::new(
            parts.errors.clone(),
            parts.performance.clone(),
            parts.analytics.clone(),
            Arc::new(CacheStorage::new()),
        );
        (monitor, parts)
    }

    fn log_errors(errors: &ErrorLog, n: usize) {
        for i in 0..n {
            errors.log_error(format!("e{}", i), Value::Null, ErrorOrigin::default());
        }
    }

    #[tokio::test]
    async fn test_all_healthy() {
        let (monitor, _parts) = monitor();
        monitor.run_health_checks().await;

        let report = monitor.health_status();
        assert_eq!(report.overall, HealthStatus::Healthy);
        let names: Vec<_> = report.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["errors", "performance", "storage"]);
    }

    #[tokio::test]
    async fn test_error_thresholds() {
        let (monitor, parts) = monitor();

        log_errors(&parts.errors, 6);
        monitor.run_health_checks().await;
        assert_eq!(monitor.health_status().overall, HealthStatus::Degraded);

        log_errors(&parts.errors, 5);
        monitor.run_health_checks().await;
        assert_eq!(monitor.health_status().overall, HealthStatus::Unhealthy);

        // warnings are tracked for analytics
        assert!(
            parts
                .analytics
                .queued()
                .iter()
                .any(|e| e.name == "health_check_warning")
        );
    }

    #[tokio::test]
    async fn test_recovers_once_errors_age_out() {
        let (monitor, parts) = monitor();

        log_errors(&parts.errors, 11);
        monitor.run_health_checks().await;
        assert_eq!(monitor.health_status().overall, HealthStatus::Unhealthy);

        parts
            .errors
            .age_entries(TimeDelta::minutes(ERROR_WINDOW_MINUTES + 1));
        monitor.run_health_checks().await;
        assert_eq!(monitor.health_status().overall, HealthStatus::Healthy);
        assert_eq!(parts.errors.count(), 11);
    }

    #[tokio::test]
    async fn test_slow_operations_degrade() {
        let (monitor, parts) = monitor();
        parts
            .performance
            .record("render_payments", Duration::from_millis(2500));
        monitor.run_health_checks().await;

        let report = monitor.health_status();
        assert_eq!(report.overall, HealthStatus::Degraded);
        let perf = report
            .checks
            .iter()
            .find(|c| c.name == "performance")
            .expect("performance check ran");
        assert_eq!(perf.message, "1 slow operation(s)");
    }

    #[tokio::test]
    async fn test_failing_check_is_unhealthy_and_logged() {
        let (mut monitor, parts) = monitor();
        monitor.register(Box::new(Broken));
        monitor.run_health_checks().await;

        let report = monitor.health_status();
        assert_eq!(report.overall, HealthStatus::Unhealthy);
        let broken = report
            .checks
            .iter()
            .find(|c| c.name == "broken")
            .expect("broken check ran");
        assert_eq!(broken.message, "Check failed: disk unreadable");
        assert_eq!(parts.errors.count(), 1);
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let (monitor, _parts) = monitor();
        let monitor = Arc::new(monitor);

        monitor.start(Duration::from_secs(30));
        assert!(monitor.is_active());
        monitor.start(Duration::from_secs(30));

        for _ in 0..100 {
            if !monitor.health_status().checks.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert_eq!(monitor.health_status().checks.len(), 3);

        monitor.stop();
        assert!(!monitor.is_active());
    }

    #[tokio::test]
    async fn test_report_includes_recent_errors() {
        let (monitor, parts) = monitor();
        log_errors(&parts.errors, 7);

        let report = monitor.report();
        assert_eq!(report.metrics.errors.count, 7);
        assert_eq!(report.metrics.errors.recent.len(), 5);
        assert_eq!(report.metrics.errors.recent[0].message, "e6");
    }
}
