// Alert engine - applies the alert window and suppresses repeat alerts.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::core::model::AstroEvent;

/// Alert window used when no configuration is given, in minutes.
pub const DEFAULT_ALERT_WINDOW_MINUTES: i64 = 60;

/// Alert engine state
pub struct AlertEngine {
    /// How far ahead of an event an alert may fire
    window: Duration,
    /// Dedup keys of events already alerted on
    sent: HashSet<String>,
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_ALERT_WINDOW_MINUTES))
    }
}

impl AlertEngine {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            sent: HashSet::new(),
        }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self::new(Duration::minutes(i64::from(minutes)))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// True when the event has not been alerted on and is due.
    ///
    /// Untimed events are always due. Timed events are due once they are
    /// no more than `window` away.
    pub fn should_alert(&self, event: &AstroEvent, now: DateTime<Utc>) -> bool {
        if self.sent.contains(&event.dedup_key()) {
            return false;
        }
        match event.time_until(now) {
            Some(remaining) => remaining <= self.window,
            None => true,
        }
    }

    /// Events that merit an alert right now. Nothing is marked as sent;
    /// call [`AlertEngine::mark_sent`] after dispatching.
    pub fn evaluate<'a>(&self, events: &'a [AstroEvent], now: DateTime<Utc>) -> Vec<&'a AstroEvent> {
        events
            .iter()
            .filter(|event| self.should_alert(event, now))
            .collect()
    }

    pub fn mark_sent(&mut self, event: &AstroEvent) {
        self.sent.insert(event.dedup_key());
    }

    pub fn has_sent(&self, key: &str) -> bool {
        self.sent.contains(key)
    }

    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }

    /// Forget every sent alert.
    pub fn reset(&mut self) {
        self.sent.clear();
    }
}
