use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::MutexGuard;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorEntry {
    pub message: String,
    pub context: Value,
    pub timestamp: DateTime<Utc>,
    pub path: Option<String>,
    pub user_agent: Option<String>,
    pub user_id: Option<String>,
}

/// Where an error happened, as far as the caller knows.
#[derive(Debug, Clone, Default)]
pub struct ErrorOrigin {
    pub path: Option<String>,
    pub user_agent: Option<String>,
    pub user_id: Option<String>,
}

/// Bounded in-memory log of recent failures, newest first. It is read by
/// the health checks and the monitoring report.
pub struct ErrorLog {
    max_entries: usize,
    production: bool,
    entries: Mutex<VecDeque<ErrorEntry>>,
}

impl ErrorLog {
    pub fn new(max_entries: usize, production: bool) -> Self {
        Self {
            max_entries,
            production,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<ErrorEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn log_error(&self, message: impl Into<String>, context: Value, origin: ErrorOrigin) {
        let entry = ErrorEntry {
            message: message.into(),
            context,
            timestamp: Utc::now(),
            path: origin.path,
            user_agent: origin.user_agent,
            user_id: origin.user_id,
        };

        if self.production {
            self.report(&entry);
        } else {
            tracing::error!(
                path = ?entry.path,
                context = %entry.context,
                "{}",
                entry.message
            );
        }

        let mut entries = self.entries();
        entries.push_front(entry);
        entries.truncate(self.max_entries);
    }

    fn report(&self, entry: &ErrorEntry) {
        match serde_json::to_string(entry) {
            Ok(json) => tracing::error!(target: "monitoring", "{}", json),
            Err(e) => tracing::error!("failed to serialize error entry: {}", e),
        }
    }

    pub fn recent(&self) -> Vec<ErrorEntry> {
        self.entries().iter().cloned().collect()
    }

    /// The `n` newest entries.
    pub fn latest(&self, n: usize) -> Vec<ErrorEntry> {
        self.entries().iter().take(n).cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.entries().len()
    }

    /// Entries logged within `window` of now.
    pub fn count_within(&self, window: TimeDelta) -> usize {
        let since = Utc::now() - window;
        self.entries()
            .iter()
            .take_while(|entry| entry.timestamp >= since)
            .count()
    }

    #[cfg(test)]
    pub(crate) fn age_entries(&self, by: TimeDelta) {
        for entry in self.entries().iter_mut() {
            entry.timestamp -= by;
        }
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_newest_first_and_bounded() {
        let log = ErrorLog::new(3, false);
        for i in 0..5 {
            log.log_error(format!("error {}", i), Value::Null, ErrorOrigin::default());
        }

        let messages: Vec<_> = log.recent().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["error 4", "error 3", "error 2"]);
        assert_eq!(log.count(), 3);
    }

    #[test]
    fn test_entry_keeps_origin() {
        let log = ErrorLog::new(50, true);
        log.log_error(
            "handler panicked",
            json!({ "component": "tickets" }),
            ErrorOrigin {
                path: Some("/tickets".into()),
                user_agent: Some("curl/8".into()),
                user_id: None,
            },
        );

        let entry = log.recent().pop().expect("entry was logged");
        assert_eq!(entry.path.as_deref(), Some("/tickets"));
        assert_eq!(entry.context["component"], "tickets");

        log.clear();
        assert_eq!(log.count(), 0);
    }

    #[test]
    fn test_count_within_ignores_old_entries() {
        let log = ErrorLog::new(50, false);
        for i in 0..4 {
            log.log_error(format!("old {}", i), Value::Null, ErrorOrigin::default());
        }
        log.age_entries(TimeDelta::minutes(10));
        log.log_error("fresh", Value::Null, ErrorOrigin::default());

        assert_eq!(log.count(), 5);
        assert_eq!(log.count_within(TimeDelta::minutes(5)), 1);
        assert_eq!(log.latest(2)[0].message, "fresh");
        assert_eq!(log.latest(2)[1].message, "old 3");
    }
}
