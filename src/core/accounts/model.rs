//! User records and the preference bag.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::locations::DEFAULT_LOCATION;

/// Where a user wants alerts delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMethod {
    #[default]
    Email,
    Console,
}

impl std::str::FromStr for NotificationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "console" => Ok(Self::Console),
            other => Err(format!("unknown notification method '{other}'")),
        }
    }
}

/// Per-user preferences.
///
/// Keys other than the known ones are kept in `extra` so a stored bag reads
/// back exactly as it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_location")]
    pub default_location: String,
    #[serde(default = "default_alert_types")]
    pub alert_types: Vec<String>,
    #[serde(default)]
    pub notification_method: NotificationMethod,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_alert_types() -> Vec<String> {
    ["ISS", "Meteor", "Aurora", "Launch"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_location: default_location(),
            alert_types: default_alert_types(),
            notification_method: NotificationMethod::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl Preferences {
    /// True if alerts of this type tag (`ISS`, `Meteor`, ...) are wanted.
    pub fn wants(&self, tag: &str) -> bool {
        self.alert_types.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub password_digest: String,
    #[serde(default)]
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
}

/// Lowercase hex SHA-256 of the password.
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
