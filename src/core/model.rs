use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Category of an astronomical or launch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    SatellitePass,
    MeteorShower,
    Aurora,
    Launch,
    Other,
}

impl EventCategory {
    /// Guess a category from a free-form event title.
    pub fn classify(name: &str) -> Self {
        if name.contains("ISS") {
            Self::SatellitePass
        } else if name.contains("Meteor") {
            Self::MeteorShower
        } else if name.contains("Aurora") {
            Self::Aurora
        } else if name.contains("Launch") {
            Self::Launch
        } else {
            Self::Other
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SatellitePass => "Satellite Transit",
            Self::MeteorShower => "Meteor Shower",
            Self::Aurora => "Aurora",
            Self::Launch => "Rocket Launch",
            Self::Other => "Event",
        }
    }

    /// Short tag stored in preferences (`alert_types`) and the event log.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::SatellitePass => "ISS",
            Self::MeteorShower => "Meteor",
            Self::Aurora => "Aurora",
            Self::Launch => "Launch",
            Self::Other => "Other",
        }
    }
}

/// Category-specific attributes of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventDetails {
    SatellitePass {
        duration: String,
        /// Degrees above the horizon, when the provider reports it
        max_altitude: Option<f64>,
        brightness: String,
        direction: String,
    },
    MeteorShower {
        zhr: u32,
        moon_phase: String,
        visibility: String,
        constellation: String,
        velocity: Option<String>,
    },
    Aurora {
        probability: f64,
        kp_index: f64,
        best_time: String,
        visibility: String,
    },
    Launch {
        mission: String,
        site: String,
        visibility: String,
    },
    None,
}

/// A single upcoming occurrence shown on the dashboard and fed to alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstroEvent {
    pub name: String,
    pub category: EventCategory,
    /// Pass/launch time or shower peak. Forecasts have none.
    pub time: Option<DateTime<Utc>>,
    pub source: String,
    pub details: EventDetails,
}

impl AstroEvent {
    /// Event with no details, categorised from its name.
    pub fn adhoc(name: &str) -> Self {
        Self {
            name: name.to_string(),
            category: EventCategory::classify(name),
            time: None,
            source: "Manual".to_string(),
            details: EventDetails::None,
        }
    }

    /// Key used to suppress repeat alerts for the same occurrence.
    pub fn dedup_key(&self) -> String {
        match self.time {
            Some(time) => format!("{}_{}", self.name, time.to_rfc3339()),
            None => format!("{}_none", self.name),
        }
    }

    pub fn time_until(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.time.map(|t| t - now)
    }

    /// "2 days, 5 hours" or "3h 12m"; `None` for untimed events.
    pub fn countdown_text(&self, now: DateTime<Utc>) -> Option<String> {
        let remaining = self.time_until(now)?;
        let days = remaining.num_days();
        let hours = remaining.num_hours() - days * 24;
        if days > 0 {
            Some(format!("{} days, {} hours", days, hours))
        } else {
            let minutes = remaining.num_minutes() - remaining.num_hours() * 60;
            Some(format!("{}h {}m", remaining.num_hours(), minutes))
        }
    }

    /// One-line summary of the interesting attributes, joined with " | ".
    pub fn detail_line(&self) -> Option<String> {
        let mut parts = Vec::new();
        match &self.details {
            EventDetails::SatellitePass {
                duration,
                max_altitude,
                ..
            } => {
                parts.push(format!("Duration: {}", duration));
                if let Some(alt) = max_altitude {
                    parts.push(format!("Altitude: {:.0}°", alt));
                }
            }
            EventDetails::MeteorShower { zhr, .. } => parts.push(format!("Rate: {}/hr", zhr)),
            EventDetails::Aurora {
                probability,
                kp_index,
                ..
            } => {
                parts.push(format!("Probability: {:.0}%", probability));
                parts.push(format!("KP: {:.1}", kp_index));
            }
            EventDetails::Launch { mission, site, .. } => {
                parts.push(format!("Mission: {}", mission));
                parts.push(format!("Site: {}", site));
            }
            EventDetails::None => {}
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" | "))
        }
    }
}
