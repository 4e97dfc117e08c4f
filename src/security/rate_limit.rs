use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window attempt counter, keyed by whatever the caller wants to
/// throttle (sign-in uses the username).
#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<DashMap<String, Window>>,
    max_attempts: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            window,
        }
    }

    pub fn is_allowed(&self, key: &str) -> bool {
        self.is_allowed_at(key, Instant::now())
    }

    pub fn remaining_attempts(&self, key: &str) -> u32 {
        self.remaining_attempts_at(key, Instant::now())
    }

    pub fn time_until_reset(&self, key: &str) -> Duration {
        self.time_until_reset_at(key, Instant::now())
    }

    pub fn reset(&self, key: &str) {
        self.attempts.remove(key);
    }

    pub fn tracked_keys(&self) -> usize {
        self.attempts.len()
    }

    /// Forgets every window that has already closed. Returns how many went.
    pub fn prune_expired(&self) -> usize {
        self.prune_expired_at(Instant::now())
    }

    fn prune_expired_at(&self, now: Instant) -> usize {
        let before = self.attempts.len();
        self.attempts.retain(|_, window| now <= window.reset_at);
        before - self.attempts.len()
    }

    fn is_allowed_at(&self, key: &str, now: Instant) -> bool {
        let mut entry = self.attempts.entry(key.to_string()).or_insert(Window {
            count: 0,
            reset_at: now + self.window,
        });

        if now > entry.reset_at {
            *entry = Window {
                count: 1,
                reset_at: now + self.window,
            };
            return true;
        }

        if entry.count >= self.max_attempts {
            return false;
        }

        entry.count += 1;
        true
    }

    fn remaining_attempts_at(&self, key: &str, now: Instant) -> u32 {
        match self.attempts.get(key) {
            Some(w) if now <= w.reset_at => self.max_attempts.saturating_sub(w.count),
            _ => self.max_attempts,
        }
    }

    fn time_until_reset_at(&self, key: &str, now: Instant) -> Duration {
        match self.attempts.get(key) {
            Some(w) if now <= w.reset_at => w.reset_at - now,
            _ => Duration::ZERO,
        }
    }
}
