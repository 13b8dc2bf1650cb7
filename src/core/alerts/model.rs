// Alert model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::{format_message, subject_for};
use crate::core::model::{AstroEvent, EventCategory};

/// A rendered alert, ready for the console and email channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Dedup key of the originating event
    pub key: String,
    pub location: String,
    pub event_name: String,
    pub category: EventCategory,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn for_event(event: &AstroEvent, location: &str, now: DateTime<Utc>) -> Self {
        Self {
            key: event.dedup_key(),
            location: location.to_string(),
            event_name: event.name.clone(),
            category: event.category,
            subject: subject_for(event),
            message: format_message(event),
            created_at: now,
        }
    }
}
