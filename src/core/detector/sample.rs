//! Static event data used when live providers are disabled or failing.

use chrono::{DateTime, Datelike, Duration, DurationRound, TimeZone, Utc};

use crate::core::locations::Location;
use crate::core::model::{AstroEvent, EventCategory, EventDetails};

pub const SAMPLE_SOURCE: &str = "Sample Data";
pub const METEOR_SOURCE: &str = "IMO Database";

/// Showers returned per request.
const METEOR_LOOKAHEAD: usize = 2;

/// Start of the current hour. Sample passes and launches hang off this so a
/// simulated occurrence keeps one time (and one dedup key) for the hour.
fn sample_anchor(now: DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(Duration::hours(1)).unwrap_or(now)
}

pub fn iss_passes(now: DateTime<Utc>) -> Vec<AstroEvent> {
    vec![AstroEvent {
        name: "International Space Station Transit".to_string(),
        category: EventCategory::SatellitePass,
        time: Some(sample_anchor(now) + Duration::hours(2)),
        source: SAMPLE_SOURCE.to_string(),
        details: EventDetails::SatellitePass {
            duration: "6 minutes".to_string(),
            max_altitude: Some(67.0),
            brightness: "Magnitude -3.9 (Very Bright)".to_string(),
            direction: "West to East".to_string(),
        },
    }]
}

pub fn rocket_launches(now: DateTime<Utc>) -> Vec<AstroEvent> {
    vec![AstroEvent {
        name: "SpaceX Falcon 9 Launch".to_string(),
        category: EventCategory::Launch,
        time: Some(sample_anchor(now) + Duration::hours(6)),
        source: SAMPLE_SOURCE.to_string(),
        details: EventDetails::Launch {
            mission: "Starlink Group 8-1".to_string(),
            site: "Cape Canaveral, Florida".to_string(),
            visibility: "Live Stream Available".to_string(),
        },
    }]
}

struct Shower {
    name: &'static str,
    month: u32,
    day: u32,
    hour: u32,
    zhr: u32,
    moon_phase: &'static str,
    visibility: &'static str,
    constellation: &'static str,
    velocity: &'static str,
}

const SHOWERS: &[Shower] = &[
    Shower {
        name: "Quadrantid Meteor Shower",
        month: 1,
        day: 3,
        hour: 8,
        zhr: 120,
        moon_phase: "New Moon",
        visibility: "Excellent",
        constellation: "Boötes",
        velocity: "41 km/s",
    },
    Shower {
        name: "Lyrid Meteor Shower",
        month: 4,
        day: 22,
        hour: 14,
        zhr: 18,
        moon_phase: "Waxing Gibbous",
        visibility: "Good",
        constellation: "Lyra",
        velocity: "49 km/s",
    },
    Shower {
        name: "Perseid Meteor Shower",
        month: 8,
        day: 12,
        hour: 20,
        zhr: 100,
        moon_phase: "Waning Crescent",
        visibility: "Excellent",
        constellation: "Perseus",
        velocity: "59 km/s",
    },
    Shower {
        name: "Geminid Meteor Shower",
        month: 12,
        day: 14,
        hour: 7,
        zhr: 150,
        moon_phase: "First Quarter",
        visibility: "Good",
        constellation: "Gemini",
        velocity: "35 km/s",
    },
];

/// Next showers from the annual calendar, peaking after `now`.
///
/// The calendar for the following year is included so mid-December still
/// shows the Quadrantids.
pub fn meteor_showers(now: DateTime<Utc>) -> Vec<AstroEvent> {
    let year = now.year();
    [year, year + 1]
        .iter()
        .flat_map(|y| SHOWERS.iter().filter_map(move |s| shower_event(s, *y)))
        .filter(|e| e.time.is_some_and(|peak| peak > now))
        .take(METEOR_LOOKAHEAD)
        .collect()
}

fn shower_event(shower: &Shower, year: i32) -> Option<AstroEvent> {
    let peak = Utc
        .with_ymd_and_hms(year, shower.month, shower.day, shower.hour, 0, 0)
        .single()?;
    Some(AstroEvent {
        name: shower.name.to_string(),
        category: EventCategory::MeteorShower,
        time: Some(peak),
        source: METEOR_SOURCE.to_string(),
        details: EventDetails::MeteorShower {
            zhr: shower.zhr,
            moon_phase: shower.moon_phase.to_string(),
            visibility: shower.visibility.to_string(),
            constellation: shower.constellation.to_string(),
            velocity: Some(shower.velocity.to_string()),
        },
    })
}

/// Rough aurora chance in percent from latitude and closeness to an equinox.
pub fn aurora_probability(lat: f64, day_of_year: u32) -> f64 {
    let base = ((lat.abs() - 40.0) * 2.0).max(0.0);
    let day = i64::from(day_of_year);
    let equinox_distance = (day - 80).abs().min((day - 266).abs()) as f64;
    let seasonal = (30.0 - equinox_distance).max(0.0) / 3.0;
    (base + seasonal).min(80.0)
}

pub fn aurora_forecast(location: &Location, now: DateTime<Utc>, source: &str) -> AstroEvent {
    let probability = aurora_probability(location.lat, now.ordinal());
    let kp_index = (probability / 15.0 * 10.0).round() / 10.0;
    AstroEvent {
        name: "Aurora Borealis Forecast".to_string(),
        category: EventCategory::Aurora,
        time: None,
        source: source.to_string(),
        details: EventDetails::Aurora {
            probability,
            kp_index,
            best_time: "22:00-02:00 Local".to_string(),
            visibility: if probability > 30.0 { "Good" } else { "Fair" }.to_string(),
        },
    }
}
