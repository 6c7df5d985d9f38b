//! Save coalescing
//!
//! Every change schedules a save; saves for the same nation inside the
//! window collapse into one, carrying the latest state. The deadline moves
//! with each new change (trailing edge).

use ahash::AHashMap;
use tokio::time::{Duration, Instant};

#[derive(Debug)]
pub struct SaveDebouncer<T> {
    window: Duration,
    pending: AHashMap<String, (Instant, T)>,
}

impl<T> SaveDebouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: AHashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `value` under `key`, replacing anything already waiting
    pub fn schedule(&mut self, key: impl Into<String>, value: T, now: Instant) {
        self.pending.insert(key.into(), (now + self.window, value));
    }

    /// Remove and return every entry whose window has closed
    pub fn take_due(&mut self, now: Instant) -> Vec<(String, T)> {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        let mut out: Vec<(String, T)> = due
            .into_iter()
            .filter_map(|key| self.pending.remove(&key).map(|(_, value)| (key, value)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Everything still waiting, regardless of deadline
    pub fn drain_all(&mut self) -> Vec<(String, T)> {
        let mut out: Vec<(String, T)> = self
            .pending
            .drain()
            .map(|(key, (_, value))| (key, value))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Drop a pending save, e.g. when the nation was deleted
    pub fn cancel(&mut self, key: &str) -> Option<T> {
        self.pending.remove(key).map(|(_, value)| value)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|(deadline, _)| *deadline).min()
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
