// Event detection: aggregates satellite passes, meteor showers, aurora and
// launches for a location.
//
// - sample.rs: static fallback data and the aurora estimate
// - http.rs: live providers, each falling back to sample data

pub mod http;
pub mod sample;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use self::http::HttpProviders;
use crate::core::locations;
use crate::core::model::AstroEvent;

/// Anything that can list upcoming events for a location.
///
/// Implementations swallow their own failures; an empty list is the worst case.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn events_for(&self, location_id: &str, now: DateTime<Utc>) -> Vec<AstroEvent>;
}

pub struct EventDetector {
    live: Option<HttpProviders>,
}

impl EventDetector {
    /// Detector serving sample data only; never touches the network.
    pub fn offline() -> Self {
        Self { live: None }
    }

    pub fn live(providers: HttpProviders) -> Self {
        Self {
            live: Some(providers),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }
}

#[async_trait]
impl EventSource for EventDetector {
    async fn events_for(&self, location_id: &str, now: DateTime<Utc>) -> Vec<AstroEvent> {
        let location = locations::resolve(location_id);
        let mut events = Vec::new();

        match &self.live {
            Some(providers) => {
                events.extend(providers.iss_passes(&location, now).await);
                events.extend(providers.meteor_showers(now));
                events.push(providers.aurora_forecast(&location, now).await);
                events.extend(providers.rocket_launches(now).await);
            }
            None => {
                events.extend(sample::iss_passes(now));
                events.extend(sample::meteor_showers(now));
                events.push(sample::aurora_forecast(
                    &location,
                    now,
                    sample::SAMPLE_SOURCE,
                ));
                events.extend(sample::rocket_launches(now));
            }
        }

        upcoming(events, now)
    }
}

/// Drop timed events that already happened and order the rest by time,
/// untimed events last.
pub fn upcoming(mut events: Vec<AstroEvent>, now: DateTime<Utc>) -> Vec<AstroEvent> {
    events.retain(|e| e.time.map_or(true, |t| t > now));
    events.sort_by_key(|e| (e.time.is_none(), e.time));
    events
}
