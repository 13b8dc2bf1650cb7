//! Background monitoring loop.
//!
//! One tokio task per running job. Each tick checks the job's locations in
//! order through the shared [`Monitor`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::monitor::Monitor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerStatus {
    pub is_running: bool,
    pub next_run: Option<DateTime<Utc>>,
    pub job_count: usize,
    pub locations: Vec<String>,
}

struct Job {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    locations: Vec<String>,
}

pub struct MonitoringScheduler {
    monitor: Arc<Monitor>,
    period: Duration,
    job: Option<Job>,
    next_run: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl MonitoringScheduler {
    pub fn new(monitor: Arc<Monitor>, period: Duration) -> Self {
        Self {
            monitor,
            period,
            job: None,
            next_run: Arc::new(Mutex::new(None)),
        }
    }

    /// Start checking `locations` every period, first check one period from now.
    /// A running job is stopped and replaced.
    pub async fn start(&mut self, locations: Vec<String>) {
        if self.job.is_some() {
            log::info!("Replacing running monitoring job");
            self.stop().await;
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let monitor = Arc::clone(&self.monitor);
        let next_run = Arc::clone(&self.next_run);
        let period = self.period;
        let job_locations = locations.clone();

        set_next_run(&next_run, Some(Utc::now() + chrono_period(period)));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        run_pass(&monitor, &job_locations).await;
                        set_next_run(&next_run, Some(Utc::now() + chrono_period(period)));
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            set_next_run(&next_run, None);
            log::info!("Monitoring loop stopped");
        });

        log::info!(
            "Monitoring started for {} location(s), every {}s",
            locations.len(),
            period.as_secs_f64()
        );
        self.job = Some(Job {
            stop_tx,
            handle,
            locations,
        });
    }

    /// Signal the running job and wait for it to finish.
    pub async fn stop(&mut self) {
        let Some(job) = self.job.take() else {
            return;
        };
        let _ = job.stop_tx.send(true);
        if let Err(e) = job.handle.await {
            log::error!("Monitoring task ended abnormally: {}", e);
        }
        set_next_run(&self.next_run, None);
    }

    pub fn status(&self) -> SchedulerStatus {
        let is_running = self
            .job
            .as_ref()
            .map_or(false, |job| !job.handle.is_finished());
        SchedulerStatus {
            is_running,
            next_run: if is_running {
                *self.next_run.lock().unwrap_or_else(|p| p.into_inner())
            } else {
                None
            },
            job_count: usize::from(self.job.is_some()),
            locations: self
                .job
                .as_ref()
                .map(|job| job.locations.clone())
                .unwrap_or_default(),
        }
    }

    /// One immediate pass over `locations`. Returns the number of alerts sent.
    pub async fn run_once(&self, locations: &[String]) -> usize {
        run_pass(&self.monitor, locations).await
    }
}

impl Drop for MonitoringScheduler {
    fn drop(&mut self) {
        if let Some(job) = &self.job {
            let _ = job.stop_tx.send(true);
        }
    }
}

async fn run_pass(monitor: &Arc<Monitor>, locations: &[String]) -> usize {
    let mut total = 0;
    for location in locations {
        // Own task per location so a panic is contained to that location
        let monitor = Arc::clone(monitor);
        let location_id = location.clone();
        let check = tokio::spawn(async move { monitor.check_and_alert(&location_id, Utc::now()).await });
        match check.await {
            Ok(sent) => total += sent,
            Err(e) => log::error!("Check for {} failed: {}", location, e),
        }
    }
    total
}

fn set_next_run(slot: &Mutex<Option<DateTime<Utc>>>, value: Option<DateTime<Utc>>) {
    *slot.lock().unwrap_or_else(|p| p.into_inner()) = value;
}

fn chrono_period(period: Duration) -> chrono::Duration {
    chrono::Duration::from_std(period).unwrap_or_else(|_| chrono::Duration::zero())
}
