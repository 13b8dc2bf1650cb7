// Message templates for alerts.
//
// Each category gets its own wording; attributes an event lacks fall back to
// generic phrases so an ad hoc event still renders.

use crate::core::model::{AstroEvent, EventCategory, EventDetails};

pub fn subject_for(event: &AstroEvent) -> String {
    format!("Alert: {}", event.name)
}

/// Render the body of an alert for an event.
pub fn format_message(event: &AstroEvent) -> String {
    match event.category {
        EventCategory::SatellitePass => format_satellite_pass(event),
        EventCategory::MeteorShower => format_meteor_shower(event),
        EventCategory::Aurora => format_aurora(event),
        EventCategory::Launch => format_launch(event),
        EventCategory::Other => format_generic(event),
    }
}

fn time_or(event: &AstroEvent, fmt: &str, fallback: &str) -> String {
    event
        .time
        .map(|t| t.format(fmt).to_string())
        .unwrap_or_else(|| fallback.to_string())
}

fn format_satellite_pass(event: &AstroEvent) -> String {
    let (direction, duration, altitude, brightness) = match &event.details {
        EventDetails::SatellitePass {
            duration,
            max_altitude,
            brightness,
            direction,
        } => (
            direction.as_str(),
            duration.as_str(),
            max_altitude.map_or_else(|| "unknown".to_string(), |a| format!("{:.0}°", a)),
            brightness.as_str(),
        ),
        _ => ("up", "5-6 minutes", "unknown".to_string(), "Very bright"),
    };
    let time = time_or(event, "%H:%M", "tonight");

    format!(
        "INTERNATIONAL SPACE STATION PASSING OVERHEAD!\n\n\
         Look {direction} at {time} for {duration}.\n\
         Maximum altitude: {altitude}.\n\
         Brightness: {brightness}\n\n\
         The ISS will be clearly visible moving across the sky."
    )
}

fn format_meteor_shower(event: &AstroEvent) -> String {
    let (zhr, moon_phase, visibility) = match &event.details {
        EventDetails::MeteorShower {
            zhr,
            moon_phase,
            visibility,
            ..
        } => (*zhr, moon_phase.as_str(), visibility.as_str()),
        _ => (0, "Favorable", "Good"),
    };
    let peak = time_or(event, "%B %d at %H:%M", "soon");

    format!(
        "METEOR SHOWER ALERT!\n\n\
         {name} peaks on {peak}.\n\
         Expected rate: {zhr} meteors per hour under ideal conditions.\n\
         Moon Phase: {moon_phase}\n\
         Visibility: {visibility}\n\n\
         Find a dark location away from city lights for best viewing!",
        name = event.name
    )
}

fn format_aurora(event: &AstroEvent) -> String {
    let (kp_index, best_time, visibility) = match &event.details {
        EventDetails::Aurora {
            kp_index,
            best_time,
            visibility,
            ..
        } => (*kp_index, best_time.as_str(), visibility.as_str()),
        _ => (0.0, "midnight to 3 AM", "Possible with dark skies"),
    };

    format!(
        "NORTHERN LIGHTS POSSIBILITY!\n\n\
         There's a chance to see aurora tonight!\n\
         KP Index: {kp_index:.1}\n\
         Best viewing time: {best_time}\n\
         Visibility: {visibility}\n\n\
         Look toward the northern horizon from dark locations."
    )
}

fn format_launch(event: &AstroEvent) -> String {
    let (mission, site) = match &event.details {
        EventDetails::Launch { mission, site, .. } => (mission.as_str(), site.as_str()),
        _ => ("Unknown", "Unknown"),
    };
    let time = time_or(event, "%B %d at %H:%M UTC", "a time to be announced");

    format!(
        "ROCKET LAUNCH ALERT!\n\n\
         {name} scheduled for {time}\n\
         Mission: {mission}\n\
         Launch Site: {site}\n\n\
         Watch live streams online for this launch!",
        name = event.name
    )
}

fn format_generic(event: &AstroEvent) -> String {
    format!(
        "ASTRONOMICAL EVENT ALERT!\n\n\
         {} is happening soon!\n\n\
         Check your astronomy apps for detailed viewing information.",
        event.name
    )
}
