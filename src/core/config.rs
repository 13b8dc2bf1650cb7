use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

use super::detector::http::{ProviderEndpoints, DEFAULT_AURORA_URL, DEFAULT_ISS_PASS_URL, DEFAULT_LAUNCH_URL};
use super::locations::DEFAULT_MONITORED;
use super::notify::EmailSettings;

/// Application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Where users.json and history.json live
    pub data_dir: PathBuf,
    /// Seconds between scheduled checks
    pub check_interval_secs: u64,
    /// Minutes before an event inside which alerts fire
    pub alert_window_minutes: u32,
    pub monitored_locations: Vec<String>,
    /// Address alert mails go to
    pub alert_recipient: String,
    /// Query the live providers instead of serving sample data only
    #[serde(default = "default_true")]
    pub live_sources: bool,
    pub http_timeout_secs: u64,
    #[serde(default = "default_iss_url")]
    pub iss_pass_url: String,
    #[serde(default = "default_aurora_url")]
    pub aurora_url: String,
    #[serde(default = "default_launch_url")]
    pub launch_url: String,
    /// Create the demo account when the users file is first created
    #[serde(default = "default_true")]
    pub seed_demo_user: bool,
    #[serde(default)]
    pub email: EmailSettings,
}

fn default_true() -> bool {
    true
}

fn default_iss_url() -> String {
    DEFAULT_ISS_PASS_URL.to_string()
}

fn default_aurora_url() -> String {
    DEFAULT_AURORA_URL.to_string()
}

fn default_launch_url() -> String {
    DEFAULT_LAUNCH_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());

        Self {
            data_dir: PathBuf::from(home).join(".stellarwatch/data"),
            check_interval_secs: 300,
            alert_window_minutes: 60,
            monitored_locations: DEFAULT_MONITORED.iter().map(|s| s.to_string()).collect(),
            alert_recipient: "user@example.com".to_string(),
            live_sources: true,
            http_timeout_secs: 10,
            iss_pass_url: default_iss_url(),
            aurora_url: default_aurora_url(),
            launch_url: default_launch_url(),
            seed_demo_user: true,
            email: EmailSettings::default(),
        }
    }
}

impl Settings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    pub fn endpoints(&self) -> ProviderEndpoints {
        ProviderEndpoints {
            iss_pass_url: self.iss_pass_url.clone(),
            aurora_url: self.aurora_url.clone(),
            launch_url: self.launch_url.clone(),
        }
    }

    /// Apply `CHECK_INTERVAL`, `ALERT_WINDOW`, `EMAIL_TEST_MODE`, `SMTP_SERVER`,
    /// `SMTP_PORT`, `SENDER_EMAIL` and `SENDER_PASSWORD` from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Same as [`Settings::apply_env_overrides`] with an explicit lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parsed(&lookup, "CHECK_INTERVAL") {
            self.check_interval_secs = v;
        }
        if let Some(v) = parsed(&lookup, "ALERT_WINDOW") {
            self.alert_window_minutes = v;
        }
        if let Some(v) = lookup("EMAIL_TEST_MODE") {
            self.email.test_mode = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = lookup("SMTP_SERVER") {
            self.email.smtp_server = v;
        }
        if let Some(v) = parsed(&lookup, "SMTP_PORT") {
            self.email.smtp_port = v;
        }
        if let Some(v) = lookup("SENDER_EMAIL") {
            self.email.sender_email = v;
        }
        if let Some(v) = lookup("SENDER_PASSWORD") {
            self.email.sender_password = v;
        }
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    /// Default config dir: `$HOME/.stellarwatch`.
    pub fn default_dir() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".stellarwatch")
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            if let Ok(content) = fs::read_to_string(&self.config_path) {
                match serde_json::from_str(&content) {
                    Ok(settings) => return settings,
                    Err(e) => log::warn!("Ignoring invalid {:?}: {}", self.config_path, e),
                }
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}
