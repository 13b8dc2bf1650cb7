//! Check-and-alert for a single location.
//!
//! Pulls events from the source, lets the [`AlertEngine`] pick the due ones,
//! then pushes each through the console and mail channels.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::accounts::Preferences;
use super::alerts::engine::AlertEngine;
use super::alerts::model::Alert;
use super::detector::EventSource;
use super::history::HistoryStore;
use super::model::AstroEvent;
use super::notify::{ConsoleChannel, Delivery, Mailer, NotifyError};

pub struct Monitor {
    source: Arc<dyn EventSource>,
    engine: Mutex<AlertEngine>,
    mailer: Arc<dyn Mailer>,
    console: Arc<ConsoleChannel>,
    recipient: String,
    history: Option<Arc<Mutex<HistoryStore>>>,
    preferences: Option<Preferences>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic mid-update leaves plain data behind; keep going with it
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Monitor {
    pub fn new(
        source: Arc<dyn EventSource>,
        engine: AlertEngine,
        mailer: Arc<dyn Mailer>,
        console: Arc<ConsoleChannel>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            source,
            engine: Mutex::new(engine),
            mailer,
            console,
            recipient: recipient.into(),
            history: None,
            preferences: None,
        }
    }

    /// Record every dispatched alert (and its event) in `history`.
    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = Some(Arc::new(Mutex::new(history)));
        self
    }

    /// Only alert on the categories `preferences` asks for.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = Some(preferences);
        self
    }

    fn wanted(&self, event: &AstroEvent) -> bool {
        self.preferences
            .as_ref()
            .map_or(true, |prefs| prefs.wants(event.category.tag()))
    }

    pub fn sent_count(&self) -> usize {
        lock(&self.engine).sent_count()
    }

    /// Check one location and dispatch alerts for due events.
    /// Returns the number of alerts sent.
    pub async fn check_and_alert(&self, location_id: &str, now: DateTime<Utc>) -> usize {
        log::info!("Checking for events in {}...", location_id);
        let events = self.source.events_for(location_id, now).await;

        let mut sent = 0;
        for event in events.iter().filter(|e| self.wanted(e)) {
            // Claim under the lock so a concurrent check cannot send it too
            {
                let mut engine = lock(&self.engine);
                if !engine.should_alert(event, now) {
                    continue;
                }
                engine.mark_sent(event);
            }

            let alert = Alert::for_event(event, location_id, now);
            let delivered = self.dispatch(&alert).await;
            self.record(event, location_id, delivered, now).await;
            sent += 1;
        }

        if sent == 0 {
            log::info!("No new alerts at this time for {}.", location_id);
        } else {
            log::info!("Sent {} alert(s) for {}!", sent, location_id);
        }
        sent
    }

    /// Dispatch an ad hoc alert, bypassing the window and the dedup set.
    pub async fn send_test_alert(&self, name: &str, now: DateTime<Utc>) -> Result<Delivery, NotifyError> {
        let event = AstroEvent::adhoc(name);
        let alert = Alert::for_event(&event, "test", now);
        if let Err(e) = self.console.show_alert(&alert) {
            log::warn!("Failed to write console alert: {}", e);
        }
        self.send_mail(&alert).await
    }

    /// Console first, then mail. True if the mail went out.
    async fn dispatch(&self, alert: &Alert) -> bool {
        if let Err(e) = self.console.show_alert(alert) {
            log::warn!("Failed to write console alert: {}", e);
        }
        match self.send_mail(alert).await {
            Ok(delivery) => {
                log::debug!("Alert '{}' delivered via {:?}", alert.subject, delivery);
                true
            }
            Err(e) => {
                log::warn!("Alert '{}' mail failed: {}", alert.subject, e);
                false
            }
        }
    }

    async fn send_mail(&self, alert: &Alert) -> Result<Delivery, NotifyError> {
        let mailer = Arc::clone(&self.mailer);
        let recipient = self.recipient.clone();
        let subject = alert.subject.clone();
        let body = alert.message.clone();
        // SMTP is blocking I/O
        tokio::task::spawn_blocking(move || mailer.send(&recipient, &subject, &body))
            .await
            .map_err(|e| NotifyError::Task(e.to_string()))?
    }

    async fn record(&self, event: &AstroEvent, location_id: &str, delivered: bool, now: DateTime<Utc>) {
        let Some(history) = &self.history else {
            return;
        };
        let history = Arc::clone(history);
        let event = event.clone();
        let location_id = location_id.to_string();
        // Rewrites history.json
        let result = tokio::task::spawn_blocking(move || {
            lock(&history).log_dispatch(&event, &location_id, None, delivered, now)
        })
        .await;
        match result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => log::warn!("Failed to record alert history: {}", e),
            Err(e) => log::warn!("History task failed: {}", e),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::notify::console::tests::Captured;
    use crate::core::detector::EventDetector;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use tempfile::tempdir;

    pub(crate) struct FixedSource(pub Vec<AstroEvent>);

    #[async_trait]
    impl EventSource for FixedSource {
        async fn events_for(&self, _location_id: &str, _now: DateTime<Utc>) -> Vec<AstroEvent> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String)>>,
        pub fail: bool,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, recipient: &str, subject: &str, _body: &str) -> Result<Delivery, NotifyError> {
            self.sent
                .lock()
                .unwrap()
                .push((recipient.to_string(), subject.to_string()));
            if self.fail {
                Err(NotifyError::Address(recipient.to_string()))
            } else {
                Ok(Delivery::Console)
            }
        }
    }

    pub(crate) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 12, 18, 0, 0).unwrap()
    }

    pub(crate) fn timed(name: &str, minutes: i64) -> AstroEvent {
        let mut event = AstroEvent::adhoc(name);
        event.time = Some(now() + Duration::minutes(minutes));
        event
    }

    fn monitor(events: Vec<AstroEvent>, mailer: Arc<RecordingMailer>) -> (Monitor, Captured) {
        let captured = Captured::default();
        let console = Arc::new(ConsoleChannel::new(Box::new(captured.clone())));
        let monitor = Monitor::new(
            Arc::new(FixedSource(events)),
            AlertEngine::default(),
            mailer,
            console,
            "user@example.com",
        );
        (monitor, captured)
    }

    #[tokio::test]
    async fn test_check_sends_due_events_once() {
        let mailer = Arc::new(RecordingMailer::default());
        let (monitor, captured) = monitor(
            vec![
                timed("ISS Transit", 30),
                timed("SpaceX Falcon 9 Launch", 360),
                AstroEvent::adhoc("Aurora Borealis Forecast"),
            ],
            mailer.clone(),
        );

        assert_eq!(monitor.check_and_alert("london", now()).await, 2);
        assert_eq!(monitor.check_and_alert("london", now()).await, 0);

        let sent = mailer.sent.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![
                ("user@example.com".to_string(), "Alert: ISS Transit".to_string()),
                (
                    "user@example.com".to_string(),
                    "Alert: Aurora Borealis Forecast".to_string()
                ),
            ]
        );
        assert!(captured.text().contains("ASTRONOMICAL ALERT! (london)"));
        assert_eq!(monitor.sent_count(), 2);
    }

    #[tokio::test]
    async fn test_event_enters_window_later() {
        let mailer = Arc::new(RecordingMailer::default());
        let (monitor, _) = monitor(vec![timed("SpaceX Falcon 9 Launch", 90)], mailer);

        assert_eq!(monitor.check_and_alert("london", now()).await, 0);
        assert_eq!(
            monitor
                .check_and_alert("london", now() + Duration::minutes(31))
                .await,
            1
        );
    }

    #[tokio::test]
    async fn test_mail_failure_still_marks_and_records() {
        let dir = tempdir().unwrap();
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..RecordingMailer::default()
        });
        let (monitor, _) = monitor(vec![timed("ISS Transit", 5)], mailer);
        let monitor = monitor.with_history(HistoryStore::open(dir.path()));

        assert_eq!(monitor.check_and_alert("delhi", now()).await, 1);
        assert_eq!(monitor.check_and_alert("delhi", now()).await, 0);

        let history = HistoryStore::open(dir.path());
        assert_eq!(history.recent_events(10).len(), 1);
        assert_eq!(history.alerts().len(), 1);
        assert!(!history.alerts()[0].alert_sent);
    }

    #[tokio::test]
    async fn test_test_alert_bypasses_dedup() {
        let mailer = Arc::new(RecordingMailer::default());
        let (monitor, captured) = monitor(Vec::new(), mailer.clone());

        for _ in 0..2 {
            monitor
                .send_test_alert("System Test - ISS Transit", now())
                .await
                .unwrap();
        }
        assert_eq!(mailer.sent.lock().unwrap().len(), 2);
        assert_eq!(monitor.sent_count(), 0);
        assert!(captured.text().contains("INTERNATIONAL SPACE STATION"));
    }

    #[tokio::test]
    async fn test_sample_events_alert_once_across_checks() {
        let mailer = Arc::new(RecordingMailer::default());
        let monitor = Monitor::new(
            Arc::new(EventDetector::offline()),
            AlertEngine::from_minutes(180),
            mailer.clone(),
            Arc::new(ConsoleChannel::new(Box::new(Captured::default()))),
            "user@example.com",
        );

        let mut counts = Vec::new();
        for k in 0..4 {
            let at = now() + Duration::minutes(5 * k);
            counts.push(monitor.check_and_alert("london", at).await);
        }
        assert!(counts[0] > 0);
        assert_eq!(&counts[1..], &[0, 0, 0]);

        let iss_mails = mailer
            .sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, subject)| subject == "Alert: International Space Station Transit")
            .count();
        assert_eq!(iss_mails, 1);
    }

    #[tokio::test]
    async fn test_preferences_filter_categories() {
        let mailer = Arc::new(RecordingMailer::default());
        let (monitor, _) = monitor(
            vec![timed("ISS Transit", 10), timed("Falcon 9 Launch", 20)],
            mailer.clone(),
        );
        let monitor = monitor.with_preferences(crate::core::accounts::Preferences {
            alert_types: vec!["Launch".to_string()],
            ..Default::default()
        });

        assert_eq!(monitor.check_and_alert("london", now()).await, 1);
        let sent = mailer.sent.lock().unwrap().clone();
        assert_eq!(sent[0].1, "Alert: Falcon 9 Launch");
        // The skipped event is not marked either
        assert_eq!(monitor.sent_count(), 1);
    }
}
