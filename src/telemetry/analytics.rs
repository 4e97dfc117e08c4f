use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tower_sessions::Session;
use uuid::Uuid;

pub const SESSION_KEY: &str = "analytics_session";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsEvent {
    pub name: String,
    pub properties: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    pub session_id: String,
}

/// Who an event belongs to. Built per request from the visitor's session
/// and, when signed in, the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Visitor {
    pub session_id: String,
    pub user_id: Option<String>,
    pub page: String,
}

impl Visitor {
    /// Reuses the session's analytics id, minting one on first visit.
    pub async fn from_session(
        session: &Session,
        user_id: Option<String>,
        page: &str,
    ) -> Result<Self, tower_sessions::session::Error> {
        let session_id = match session.get::<String>(SESSION_KEY).await? {
            Some(id) => id,
            None => {
                let id = new_session_id();
                session.insert(SESSION_KEY, &id).await?;
                id
            }
        };

        Ok(Self {
            session_id,
            user_id,
            page: page.to_string(),
        })
    }
}

fn new_session_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "session_{}_{}",
        Utc::now().timestamp_millis(),
        &random[..9]
    )
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("analytics sink unavailable: {0}")]
    Unavailable(String),
}

pub trait EventSink: Send + Sync {
    fn send(&self, event: &AnalyticsEvent) -> Result<(), SinkError>;

    fn send_batch(&self, events: &[AnalyticsEvent]) -> Result<(), SinkError> {
        events.iter().try_for_each(|event| self.send(event))
    }
}

/// Ships events to the log stream as JSON lines.
pub struct LogSink;

impl EventSink for LogSink {
    fn send(&self, event: &AnalyticsEvent) -> Result<(), SinkError> {
        let line = serde_json::to_string(event).map_err(|e| SinkError::Unavailable(e.to_string()))?;
        tracing::info!(target: "analytics", "{}", line);
        Ok(())
    }

    fn send_batch(&self, events: &[AnalyticsEvent]) -> Result<(), SinkError> {
        tracing::info!(target: "analytics", "sending batch of {} events", events.len());
        events.iter().try_for_each(|event| self.send(event))
    }
}

pub struct Analytics {
    enabled: AtomicBool,
    development: bool,
    max_queue: usize,
    queue: Mutex<VecDeque<AnalyticsEvent>>,
    sink: Box<dyn EventSink>,
}

impl Analytics {
    pub fn new(enabled: bool, development: bool, max_queue: usize) -> Self {
        Self::with_sink(enabled, development, max_queue, Box::new(LogSink))
    }

    pub fn with_sink(
        enabled: bool,
        development: bool,
        max_queue: usize,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            development,
            max_queue,
            queue: Mutex::new(VecDeque::new()),
            sink,
        }
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<AnalyticsEvent>> {
        // a panic while holding the lock leaves the queue itself intact
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn track(&self, visitor: &Visitor, name: &str, properties: Value) {
        let mut props = match properties {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        let now = Utc::now();
        props.insert("page".to_string(), json!(visitor.page));
        props.insert("timestamp".to_string(), json!(now.timestamp_millis()));

        let event = AnalyticsEvent {
            name: name.to_string(),
            properties: props,
            timestamp: now,
            user_id: visitor.user_id.clone(),
            session_id: visitor.session_id.clone(),
        };

        if self.development {
            let properties = Value::Object(event.properties.clone());
            tracing::debug!(
                event = name,
                user_id = ?event.user_id,
                "analytics event: {}",
                properties
            );
        }

        if self.is_enabled()
            && let Err(e) = self.sink.send(&event)
        {
            tracing::error!("failed to send analytics event: {}", e);
        }

        let mut queue = self.queue();
        queue.push_back(event);
        while queue.len() > self.max_queue {
            queue.pop_front();
        }
    }

    pub fn identify(&self, visitor: &Visitor, user_id: &str, role: &str) {
        let visitor = Visitor {
            user_id: Some(user_id.to_string()),
            ..visitor.clone()
        };
        self.track(
            &visitor,
            "user_identified",
            json!({ "userId": user_id, "role": role }),
        );
    }

    pub fn track_page_view(&self, visitor: &Visitor, title: &str) {
        self.track(
            visitor,
            "page_view",
            json!({ "path": visitor.page, "title": title }),
        );
    }

    pub fn track_form_submit(&self, visitor: &Visitor, form: &str, success: bool) {
        self.track(
            visitor,
            "form_submit",
            json!({ "form": form, "success": success }),
        );
    }

    pub fn track_feature_usage(&self, visitor: &Visitor, feature: &str) {
        self.track(visitor, "feature_used", json!({ "feature": feature }));
    }

    pub fn track_error(&self, visitor: &Visitor, message: &str, context: Value) {
        self.track(
            visitor,
            "error",
            json!({ "message": message, "context": context }),
        );
    }

    pub fn track_performance(&self, visitor: &Visitor, metric: &str, value_ms: f64) {
        self.track(
            visitor,
            "performance",
            json!({ "metric": metric, "value": value_ms }),
        );
    }

    pub fn track_conversion(&self, visitor: &Visitor, goal: &str, value: Option<f64>) {
        self.track(
            visitor,
            "conversion",
            json!({ "goal": goal, "value": value }),
        );
    }

    /// Sends everything queued as one batch. On failure the events go
    /// back to the front of the queue, still bounded.
    pub fn flush(&self) -> Result<usize, SinkError> {
        let events: Vec<AnalyticsEvent> = self.queue().drain(..).collect();
        if events.is_empty() {
            return Ok(0);
        }

        match self.sink.send_batch(&events) {
            Ok(()) => Ok(events.len()),
            Err(e) => {
                tracing::error!("failed to flush analytics queue: {}", e);
                let mut queue = self.queue();
                for event in events.into_iter().rev() {
                    queue.push_front(event);
                }
                while queue.len() > self.max_queue {
                    queue.pop_front();
                }
                Err(e)
            }
        }
    }

    pub fn queued(&self) -> Vec<AnalyticsEvent> {
        self.queue().iter().cloned().collect()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}
