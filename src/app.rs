//! Command-line front end.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::runtime::Builder;

use crate::core::{
    accounts::{
        auth::{LOGIN_OK, REGISTRATION_OK},
        AuthError, AuthService, NotificationMethod, Preferences, UserStore,
    },
    alerts::engine::AlertEngine,
    config::{ConfigManager, Settings},
    detector::{http::HttpProviders, EventDetector, EventSource},
    history::{HistoryStore, DEFAULT_RECENT_LIMIT},
    locations::{self, DEFAULT_LOCATION},
    model::AstroEvent,
    monitor::Monitor,
    notify::{ConsoleChannel, EmailNotifier},
    scheduler::{MonitoringScheduler, SchedulerStatus},
    storage::StoreError,
};
use crate::error::{Error, Result};

const DEFAULT_TEST_ALERT: &str = "System Test - ISS Transit";

/// `stellar-watch` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "stellar-watch",
    about = "Astronomical event dashboard and alert monitor",
    version
)]
struct Cli {
    /// Directory holding settings.json. Defaults to `$HOME/.stellarwatch`.
    #[arg(long = "config-dir", value_name = "path", global = true)]
    config_dir: Option<PathBuf>,
    /// Serve sample data only; never contact the providers.
    #[arg(long, global = true)]
    offline: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account.
    Register {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Check a username and password.
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Show or change a user's preferences.
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// List known locations by continent.
    Locations {
        #[arg(long)]
        continent: Option<String>,
        #[arg(long)]
        country: Option<String>,
        /// Only the quick-access shortcuts.
        #[arg(long)]
        quick: bool,
    },
    /// Upcoming events for one location.
    Events {
        #[arg(default_value = DEFAULT_LOCATION)]
        location: String,
    },
    /// Event counts for every known location.
    Global,
    /// Run one check-and-alert pass for a location now.
    Scan {
        location: String,
        /// Limit alerts to this user's alert types.
        #[arg(long)]
        user: Option<String>,
    },
    /// List the events that would alert for a location, without sending.
    Check {
        location: String,
        #[arg(long)]
        user: Option<String>,
    },
    /// Dispatch an ad hoc alert through every channel.
    TestAlert {
        #[arg(default_value = DEFAULT_TEST_ALERT)]
        name: String,
    },
    /// Run the monitoring loop until Ctrl-C.
    Monitor {
        /// Locations to watch. Defaults to the configured list.
        locations: Vec<String>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Recently logged events.
    History {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
}

#[derive(Debug, Subcommand)]
enum PrefsAction {
    Show {
        username: String,
    },
    Set {
        username: String,
        #[arg(long)]
        location: Option<String>,
        /// Comma separated tags, e.g. `ISS,Aurora`.
        #[arg(long = "alert-types", value_delimiter = ',')]
        alert_types: Option<Vec<String>>,
        #[arg(long)]
        method: Option<NotificationMethod>,
        /// Extra `key=value` pairs; values are parsed as JSON when possible.
        #[arg(long = "set", value_name = "key=value")]
        extra: Vec<String>,
    },
}

pub fn run() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_dir = cli.config_dir.unwrap_or_else(ConfigManager::default_dir);
    let mut settings = ConfigManager::new(config_dir).load();
    settings.apply_env_overrides();

    let context = Context {
        settings,
        offline: cli.offline,
    };
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(context.execute(cli.command))
}

struct Context {
    settings: Settings,
    offline: bool,
}

impl Context {
    async fn execute(self, command: Command) -> Result<()> {
        match command {
            Command::Register {
                username,
                email,
                password,
            } => {
                let id = self.auth()?.register(&username, &password, &email)?;
                println!("{} (user id {})", REGISTRATION_OK, id);
            }
            Command::Login { username, password } => {
                self.auth()?.login(&username, &password)?;
                println!("{}", LOGIN_OK);
            }
            Command::Prefs { action } => self.prefs(action)?,
            Command::Locations {
                continent,
                country,
                quick,
            } => show_locations(continent.as_deref(), country.as_deref(), quick),
            Command::Events { location } => self.events(&location).await?,
            Command::Global => self.global().await?,
            Command::Scan { location, user } => {
                require_location(&location)?;
                let scheduler = MonitoringScheduler::new(
                    Arc::new(self.monitor(user.as_deref())?),
                    self.settings.check_interval(),
                );
                let sent = scheduler.run_once(&[location]).await;
                println!("Scan complete: {} alert(s) sent", sent);
            }
            Command::Check { location, user } => self.check(&location, user.as_deref()).await?,
            Command::TestAlert { name } => {
                let delivery = self.monitor(None)?.send_test_alert(&name, Utc::now()).await?;
                println!("Test alert dispatched ({:?})", delivery);
            }
            Command::Monitor { locations, user } => {
                self.monitor_loop(locations, user.as_deref()).await?
            }
            Command::History { limit } => self.history(limit),
        }
        Ok(())
    }

    fn auth(&self) -> Result<AuthService> {
        let store = UserStore::open_seeded(&self.settings.data_dir, self.settings.seed_demo_user)?;
        Ok(AuthService::new(store))
    }

    fn detector(&self) -> Result<EventDetector> {
        if self.offline || !self.settings.live_sources {
            return Ok(EventDetector::offline());
        }
        let providers = HttpProviders::new(self.settings.endpoints(), self.settings.http_timeout())?;
        Ok(EventDetector::live(providers))
    }

    /// Preferences of `user`, if one was named.
    fn user_preferences(&self, user: Option<&str>) -> Result<Option<Preferences>> {
        let Some(user) = user else {
            return Ok(None);
        };
        let auth = self.auth()?;
        let prefs = auth
            .preferences(user)
            .cloned()
            .ok_or_else(|| AuthError::UnknownUser(user.to_string()))?;
        Ok(Some(prefs))
    }

    fn monitor(&self, user: Option<&str>) -> Result<Monitor> {
        let console = Arc::new(ConsoleChannel::stdout());
        let mailer = EmailNotifier::new(self.settings.email.clone(), Arc::clone(&console));
        let monitor = Monitor::new(
            Arc::new(self.detector()?),
            AlertEngine::from_minutes(self.settings.alert_window_minutes),
            Arc::new(mailer),
            console,
            self.settings.alert_recipient.clone(),
        );
        let monitor = monitor.with_history(HistoryStore::open(&self.settings.data_dir));
        Ok(match self.user_preferences(user)? {
            Some(prefs) => monitor.with_preferences(prefs),
            None => monitor,
        })
    }

    fn prefs(&self, action: PrefsAction) -> Result<()> {
        let mut auth = self.auth()?;
        match action {
            PrefsAction::Show { username } => {
                let prefs = auth
                    .preferences(&username)
                    .ok_or_else(|| AuthError::UnknownUser(username.clone()))?;
                let json = serde_json::to_string_pretty(prefs).map_err(StoreError::from)?;
                println!("{}", json);
            }
            PrefsAction::Set {
                username,
                location,
                alert_types,
                method,
                extra,
            } => {
                let mut prefs = auth
                    .preferences(&username)
                    .cloned()
                    .ok_or_else(|| AuthError::UnknownUser(username.clone()))?;
                if let Some(location) = location {
                    require_location(&location)?;
                    prefs.default_location = location;
                }
                if let Some(alert_types) = alert_types {
                    prefs.alert_types = alert_types;
                }
                if let Some(method) = method {
                    prefs.notification_method = method;
                }
                for pair in extra {
                    let (key, value) = pair
                        .split_once('=')
                        .ok_or_else(|| Error::InvalidPreference(pair.clone()))?;
                    let value = serde_json::from_str(value)
                        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
                    prefs.extra.insert(key.trim().to_string(), value);
                }
                auth.update_preferences(&username, prefs)?;
                println!("Preferences updated for {}", username);
            }
        }
        Ok(())
    }

    async fn events(&self, location_id: &str) -> Result<()> {
        let location = require_location(location_id)?;
        let now = Utc::now();
        let events = self.detector()?.events_for(location_id, now).await;

        println!("StellarWatch - {}, {}", location.name, location.country);
        println!(
            "Location: {:.4}, {:.4} ({})",
            location.lat, location.lon, location.continent
        );
        println!("Updated: {}", now.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("{}", "-".repeat(60));
        if events.is_empty() {
            println!("No upcoming events found.");
        }
        for event in &events {
            print_event(event, now);
        }
        Ok(())
    }

    async fn global(&self) -> Result<()> {
        let detector = self.detector()?;
        let now = Utc::now();
        for (continent, members) in locations::by_continent() {
            println!("{}", continent);
            for location in members {
                let count = detector.events_for(&location.id, now).await.len();
                println!("   {:<20} {:<22} {} event(s)", location.name, location.country, count);
            }
        }
        Ok(())
    }

    async fn check(&self, location_id: &str, user: Option<&str>) -> Result<()> {
        require_location(location_id)?;
        let prefs = self.user_preferences(user)?;
        let now = Utc::now();
        let events = self.detector()?.events_for(location_id, now).await;
        let engine = AlertEngine::from_minutes(self.settings.alert_window_minutes);
        let due: Vec<&AstroEvent> = engine
            .evaluate(&events, now)
            .into_iter()
            .filter(|e| prefs.as_ref().map_or(true, |p| p.wants(e.category.tag())))
            .collect();

        println!(
            "{} of {} event(s) inside the {}-minute window:",
            due.len(),
            events.len(),
            engine.window().num_minutes()
        );
        for event in due {
            print_event(event, now);
        }
        Ok(())
    }

    async fn monitor_loop(&self, locations: Vec<String>, user: Option<&str>) -> Result<()> {
        let locations = if locations.is_empty() {
            self.settings.monitored_locations.clone()
        } else {
            locations
        };
        for location in &locations {
            require_location(location)?;
        }

        let mut scheduler =
            MonitoringScheduler::new(Arc::new(self.monitor(user)?), self.settings.check_interval());
        scheduler.start(locations).await;
        print_status(&scheduler.status());
        println!("Press Ctrl-C to stop.");

        tokio::signal::ctrl_c().await?;
        scheduler.stop().await;
        print_status(&scheduler.status());
        Ok(())
    }

    fn history(&self, limit: usize) {
        let history = HistoryStore::open(&self.settings.data_dir);
        let today = Utc::now().date_naive();
        println!("Alerts today: {}", history.alerts_on(today));
        for logged in history.recent_events(limit) {
            println!(
                "#{:<4} {:<7} {:<14} {}  {}",
                logged.id,
                logged.event_type,
                logged.location,
                logged.event_time.format("%Y-%m-%d %H:%M"),
                logged.event_data.name
            );
        }
    }
}

fn require_location(id: &str) -> Result<&'static locations::Location> {
    locations::lookup(id).ok_or_else(|| Error::UnknownLocation(id.to_string()))
}

fn show_locations(continent: Option<&str>, country: Option<&str>, quick: bool) {
    if quick {
        for location in locations::quick_access() {
            println!("{:<16} {}", location.id, location.name);
        }
        return;
    }
    if let Some(country) = country {
        for location in locations::by_country(country) {
            println!("{:<16} {} ({})", location.id, location.name, location.continent);
        }
        return;
    }
    for (name, members) in locations::by_continent() {
        if continent.map_or(false, |c| !c.eq_ignore_ascii_case(name)) {
            continue;
        }
        println!("{} ({})", name, members.len());
        for location in members {
            println!("   {:<16} {}, {}", location.id, location.name, location.country);
        }
    }
}

fn print_event(event: &AstroEvent, now: chrono::DateTime<Utc>) {
    println!("{}: {}", event.category.display_name(), event.name);
    match event.time {
        Some(time) => {
            println!("   When: {}", time.format("%Y-%m-%d %H:%M UTC"));
            if let Some(countdown) = event.countdown_text(now) {
                println!("   In:   {}", countdown);
            }
        }
        None => println!("   When: Ongoing"),
    }
    if let Some(details) = event.detail_line() {
        println!("   {}", details);
    }
    println!("   Source: {}", event.source);
}

fn print_status(status: &SchedulerStatus) {
    println!(
        "Monitoring: {} | jobs: {} | next run: {} | locations: {}",
        if status.is_running { "running" } else { "stopped" },
        status.job_count,
        status
            .next_run
            .map_or_else(|| "-".to_string(), |t| t.format("%H:%M:%S UTC").to_string()),
        status.locations.join(", ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_prefs_set() {
        let cli = Cli::try_parse_from([
            "stellar-watch",
            "--offline",
            "prefs",
            "set",
            "demo",
            "--alert-types",
            "ISS,Aurora",
            "--method",
            "console",
            "--set",
            "alert_window=90",
        ])
        .unwrap();
        assert!(cli.offline);
        match cli.command {
            Command::Prefs {
                action:
                    PrefsAction::Set {
                        username,
                        alert_types,
                        method,
                        extra,
                        ..
                    },
            } => {
                assert_eq!(username, "demo");
                assert_eq!(alert_types, Some(vec!["ISS".to_string(), "Aurora".to_string()]));
                assert_eq!(method, Some(NotificationMethod::Console));
                assert_eq!(extra, vec!["alert_window=90".to_string()]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_events_defaults_to_home_location() {
        let cli = Cli::try_parse_from(["stellar-watch", "events"]).unwrap();
        assert!(matches!(cli.command, Command::Events { location } if location == DEFAULT_LOCATION));
    }

    #[test]
    fn test_parse_user_scoped_commands() {
        let cli = Cli::try_parse_from(["stellar-watch", "locations", "--quick"]).unwrap();
        assert!(matches!(cli.command, Command::Locations { quick: true, .. }));

        let cli = Cli::try_parse_from(["stellar-watch", "check", "london", "--user", "demo"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Check { ref location, user: Some(ref user) } if location == "london" && user == "demo"
        ));

        let cli = Cli::try_parse_from(["stellar-watch", "monitor", "tokyo", "oslo"]).unwrap();
        assert!(matches!(cli.command, Command::Monitor { ref locations, user: None } if locations.len() == 2));
    }

    #[test]
    fn test_require_location() {
        assert!(require_location("tokyo").is_ok());
        assert!(matches!(
            require_location("atlantis"),
            Err(Error::UnknownLocation(_))
        ));
    }
}
