//! Event and alert logs, kept in `history.json` next to the user store.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::model::AstroEvent;
use super::storage::{self, StoreError};

pub const HISTORY_FILE: &str = "history.json";
pub const DEFAULT_RECENT_LIMIT: usize = 50;
/// Rows kept per log; older ones are dropped on write.
pub const MAX_ROWS: usize = 5_000;

/// An event as it was seen for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub id: u64,
    /// Category tag (`ISS`, `Meteor`, ...)
    pub event_type: String,
    pub event_data: AstroEvent,
    pub location: String,
    pub event_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLogEntry {
    pub id: u64,
    pub user_id: Option<u64>,
    pub event_id: Option<u64>,
    pub alert_sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HistoryDocument {
    #[serde(default)]
    next_event_id: u64,
    #[serde(default)]
    next_alert_id: u64,
    #[serde(default)]
    events: Vec<LoggedEvent>,
    #[serde(default)]
    alerts: Vec<AlertLogEntry>,
}

impl HistoryDocument {
    fn push_event(&mut self, event: &AstroEvent, location: &str, now: DateTime<Utc>) -> u64 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        self.events.push(LoggedEvent {
            id,
            event_type: event.category.tag().to_string(),
            event_data: event.clone(),
            location: location.to_string(),
            event_time: event.time.unwrap_or(now),
            created_at: now,
        });
        trim_front(&mut self.events);
        id
    }

    fn push_alert(
        &mut self,
        user_id: Option<u64>,
        event_id: Option<u64>,
        sent: bool,
        now: DateTime<Utc>,
    ) -> u64 {
        let id = self.next_alert_id;
        self.next_alert_id += 1;
        self.alerts.push(AlertLogEntry {
            id,
            user_id,
            event_id,
            alert_sent: sent,
            sent_at: sent.then_some(now),
            created_at: now,
        });
        trim_front(&mut self.alerts);
        id
    }
}

/// Drop the oldest rows beyond [`MAX_ROWS`].
fn trim_front<T>(rows: &mut Vec<T>) {
    if rows.len() > MAX_ROWS {
        let excess = rows.len() - MAX_ROWS;
        rows.drain(..excess);
    }
}

pub struct HistoryStore {
    path: PathBuf,
    document: HistoryDocument,
}

impl HistoryStore {
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(HISTORY_FILE);
        let mut document: HistoryDocument = storage::load_or_default(&path);
        let max_event = document.events.iter().map(|e| e.id).max().unwrap_or(0);
        let max_alert = document.alerts.iter().map(|a| a.id).max().unwrap_or(0);
        document.next_event_id = document.next_event_id.max(max_event + 1);
        document.next_alert_id = document.next_alert_id.max(max_alert + 1);
        Self { path, document }
    }

    /// Record an event; untimed events are stamped with `now`.
    pub fn log_event(
        &mut self,
        event: &AstroEvent,
        location: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut next = self.document.clone();
        let id = next.push_event(event, location, now);
        self.commit(next)?;
        Ok(id)
    }

    /// Latest events by event time, newest first.
    pub fn recent_events(&self, limit: usize) -> Vec<&LoggedEvent> {
        let mut events: Vec<&LoggedEvent> = self.document.events.iter().collect();
        events.sort_by(|a, b| b.event_time.cmp(&a.event_time));
        events.truncate(limit);
        events
    }

    pub fn log_alert(
        &mut self,
        user_id: Option<u64>,
        event_id: Option<u64>,
        sent: bool,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut next = self.document.clone();
        let id = next.push_alert(user_id, event_id, sent, now);
        self.commit(next)?;
        Ok(id)
    }

    /// Event row plus the alert row pointing at it, written in one commit.
    /// Returns `(event_id, alert_id)`.
    pub fn log_dispatch(
        &mut self,
        event: &AstroEvent,
        location: &str,
        user_id: Option<u64>,
        sent: bool,
        now: DateTime<Utc>,
    ) -> Result<(u64, u64), StoreError> {
        let mut next = self.document.clone();
        let event_id = next.push_event(event, location, now);
        let alert_id = next.push_alert(user_id, Some(event_id), sent, now);
        self.commit(next)?;
        Ok((event_id, alert_id))
    }

    pub fn alerts(&self) -> &[AlertLogEntry] {
        &self.document.alerts
    }

    /// Number of alerts created on a UTC day.
    pub fn alerts_on(&self, day: NaiveDate) -> usize {
        self.document
            .alerts
            .iter()
            .filter(|a| a.created_at.date_naive() == day)
            .count()
    }

    pub fn event(&self, id: u64) -> Option<&LoggedEvent> {
        self.document.events.iter().find(|e| e.id == id)
    }

    fn commit(&mut self, next: HistoryDocument) -> Result<(), StoreError> {
        storage::save(&self.path, &next)?;
        self.document = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 12, 18, 0, 0).unwrap()
    }

    fn timed(name: &str, hours: i64) -> AstroEvent {
        let mut event = AstroEvent::adhoc(name);
        event.time = Some(now() + Duration::hours(hours));
        event
    }

    #[test]
    fn test_recent_events_order_and_limit() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::open(dir.path());

        history.log_event(&timed("ISS Transit", 2), "london", now()).unwrap();
        history.log_event(&timed("Falcon Launch", 6), "london", now()).unwrap();
        let untimed = history
            .log_event(&AstroEvent::adhoc("Aurora Forecast"), "london", now())
            .unwrap();

        let recent = history.recent_events(DEFAULT_RECENT_LIMIT);
        let names: Vec<_> = recent.iter().map(|e| e.event_data.name.as_str()).collect();
        assert_eq!(names, vec!["Falcon Launch", "ISS Transit", "Aurora Forecast"]);
        assert_eq!(history.event(untimed).unwrap().event_time, now());
        assert_eq!(history.event(untimed).unwrap().event_type, "Aurora");

        assert_eq!(history.recent_events(1).len(), 1);
    }

    #[test]
    fn test_alert_log_persists() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::open(dir.path());
        let event_id = history.log_event(&timed("ISS Transit", 1), "delhi", now()).unwrap();
        history.log_alert(None, Some(event_id), true, now()).unwrap();
        history
            .log_alert(Some(3), None, false, now() + Duration::days(1))
            .unwrap();

        let reopened = HistoryStore::open(dir.path());
        assert_eq!(reopened.alerts().len(), 2);
        assert_eq!(reopened.alerts()[0].sent_at, Some(now()));
        assert!(reopened.alerts()[1].sent_at.is_none());
        assert_eq!(reopened.alerts_on(now().date_naive()), 1);

        let mut reopened = reopened;
        let next = reopened.log_alert(None, None, true, now()).unwrap();
        assert_eq!(next, 3);
    }

    #[test]
    fn test_log_dispatch_links_rows() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::open(dir.path());
        let (event_id, alert_id) = history
            .log_dispatch(&timed("ISS Transit", 1), "tokyo", Some(7), true, now())
            .unwrap();

        let reopened = HistoryStore::open(dir.path());
        assert_eq!(reopened.event(event_id).unwrap().location, "tokyo");
        let alert = &reopened.alerts()[0];
        assert_eq!(alert.id, alert_id);
        assert_eq!(alert.event_id, Some(event_id));
        assert_eq!(alert.user_id, Some(7));
    }

    #[test]
    fn test_logs_keep_newest_rows() {
        let mut rows: Vec<usize> = (0..MAX_ROWS + 3).collect();
        trim_front(&mut rows);
        assert_eq!(rows.len(), MAX_ROWS);
        assert_eq!(rows[0], 3);
    }
}
