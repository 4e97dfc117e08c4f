use crate::config::Environment;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use std::time::Instant;

const DEV_SLOW: Duration = Duration::from_secs(1);
pub const PROD_SLOW: Duration = Duration::from_secs(2);

/// Latest duration per operation name.
pub struct PerformanceMonitor {
    environment: Environment,
    metrics: DashMap<String, Duration>,
}

impl PerformanceMonitor {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            metrics: DashMap::new(),
        }
    }

    pub fn measure<T>(&self, name: &str, f: impl FnOnce() -> T) -> T {
        let _measurement = self.start_measurement(name);
        f()
    }

    pub async fn measure_async<F: Future>(&self, name: &str, fut: F) -> F::Output {
        let _measurement = self.start_measurement(name);
        fut.await
    }

    /// The duration is recorded when the returned guard is dropped.
    pub fn start_measurement(&self, name: &str) -> Measurement<'_> {
        Measurement {
            monitor: self,
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    pub fn record(&self, name: &str, duration: Duration) {
        self.metrics.insert(name.to_string(), duration);

        match self.environment {
            Environment::Development if duration > DEV_SLOW => {
                tracing::warn!(
                    "slow operation detected: {} took {:.2}ms",
                    name,
                    duration.as_secs_f64() * 1000.0
                );
            }
            Environment::Production if duration > PROD_SLOW => {
                tracing::warn!(
                    target: "monitoring",
                    operation = name,
                    duration_ms = duration.as_millis() as u64,
                    "reporting slow operation"
                );
            }
            _ => {}
        }
    }

    /// Milliseconds per operation, sorted by name.
    pub fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().as_secs_f64() * 1000.0))
            .collect()
    }

    pub fn slow_operations(&self, threshold: Duration) -> Vec<String> {
        let mut slow: Vec<String> = self
            .metrics
            .iter()
            .filter(|entry| *entry.value() > threshold)
            .map(|entry| entry.key().clone())
            .collect();
        slow.sort();
        slow
    }

    pub fn clear(&self) {
        self.metrics.clear();
    }
}

pub struct Measurement<'a> {
    monitor: &'a PerformanceMonitor,
    name: String,
    start: Instant,
}

impl Drop for Measurement<'_> {
    fn drop(&mut self) {
        self.monitor.record(&self.name, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_records() {
        let monitor = PerformanceMonitor::new(Environment::Development);
        let value = monitor.measure("render_home", || 2 + 2);
        assert_eq!(value, 4);
        assert!(monitor.metrics().contains_key("render_home"));
    }

    #[tokio::test]
    async fn test_measure_async_records() {
        let monitor = PerformanceMonitor::new(Environment::Production);
        let value = monitor
            .measure_async("create_ticket", async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                "done"
            })
            .await;

        assert_eq!(value, "done");
        assert!(monitor.metrics()["create_ticket"] >= 5.0);
    }

    #[test]
    fn test_slow_operations_and_clear() {
        let monitor = PerformanceMonitor::new(Environment::Production);
        monitor.record("fast", Duration::from_millis(20));
        monitor.record("slow_b", Duration::from_millis(2500));
        monitor.record("slow_a", Duration::from_secs(3));

        assert_eq!(monitor.slow_operations(PROD_SLOW), vec!["slow_a", "slow_b"]);

        // the latest measurement replaces the previous one
        monitor.record("slow_a", Duration::from_millis(10));
        assert_eq!(monitor.slow_operations(PROD_SLOW), vec!["slow_b"]);

        monitor.clear();
        assert!(monitor.metrics().is_empty());
    }

    #[test]
    fn test_guard_records_on_drop() {
        let monitor = PerformanceMonitor::new(Environment::Development);
        {
            let _m = monitor.start_measurement("block");
        }
        assert_eq!(monitor.metrics().len(), 1);
    }
}
