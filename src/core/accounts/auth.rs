//! Registration, login and preference management on top of [`UserStore`].

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;

use super::model::{password_digest, Preferences};
use super::store::UserStore;
use crate::core::storage::StoreError;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid");
}

pub const REGISTRATION_OK: &str = "Registration successful";
pub const LOGIN_OK: &str = "Login successful";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username must not be empty")]
    EmptyUsername,
    #[error("Password must not be empty")]
    EmptyPassword,
    #[error("Invalid email address '{0}'")]
    InvalidEmail(String),
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Unknown user '{0}'")]
    UnknownUser(String),
    #[error("Registration failed: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(_) => Self::DuplicateUsername,
            other => Self::Storage(other),
        }
    }
}

pub struct AuthService {
    store: UserStore,
}

impl AuthService {
    pub fn new(store: UserStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    /// Create an account with default preferences. Returns the new user id.
    pub fn register(&mut self, username: &str, password: &str, email: &str) -> Result<u64, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        let email = email.trim();
        if !EMAIL_RE.is_match(email) {
            return Err(AuthError::InvalidEmail(email.to_string()));
        }
        if self.store.contains(username) {
            return Err(AuthError::DuplicateUsername);
        }

        let id = self.store.insert(
            username,
            email,
            password_digest(password),
            Preferences::default(),
            Utc::now(),
        )?;
        log::info!("Registered user '{}' (id {})", username, id);
        Ok(id)
    }

    /// Succeeds iff the user exists and the password digest matches.
    pub fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        match self.store.get(username.trim()) {
            Some(user) if user.password_digest == password_digest(password) => Ok(()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    pub fn preferences(&self, username: &str) -> Option<&Preferences> {
        self.store.get(username.trim()).map(|u| &u.preferences)
    }

    pub fn update_preferences(&mut self, username: &str, preferences: Preferences) -> Result<(), AuthError> {
        let username = username.trim();
        if self.store.set_preferences(username, preferences)? {
            Ok(())
        } else {
            Err(AuthError::UnknownUser(username.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::accounts::model::NotificationMethod;
    use tempfile::tempdir;

    fn service(dir: &std::path::Path) -> AuthService {
        AuthService::new(UserStore::open(dir))
    }

    #[test]
    fn test_register_then_login() {
        let dir = tempdir().unwrap();
        let mut auth = service(dir.path());

        auth.register("testuser", "testpass", "test@example.com").unwrap();
        assert!(auth.login("testuser", "testpass").is_ok());
        assert!(matches!(
            auth.login("testuser", "wrongpass"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody", "testpass"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let dir = tempdir().unwrap();
        let mut auth = service(dir.path());
        auth.register("testuser", "a", "a@example.com").unwrap();

        let err = auth.register("testuser", "b", "b@example.com").unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));
        assert_eq!(err.to_string(), "Username already exists");
        // Original password still works
        assert!(auth.login("testuser", "a").is_ok());
    }

    #[test]
    fn test_register_validation() {
        let dir = tempdir().unwrap();
        let mut auth = service(dir.path());

        assert!(matches!(
            auth.register("  ", "pw", "a@example.com"),
            Err(AuthError::EmptyUsername)
        ));
        assert!(matches!(
            auth.register("user", "", "a@example.com"),
            Err(AuthError::EmptyPassword)
        ));
        assert!(matches!(
            auth.register("user", "pw", "not-an-email"),
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(auth.store().is_empty());
    }

    #[test]
    fn test_preferences_round_trip() {
        let dir = tempdir().unwrap();
        let mut auth = service(dir.path());
        auth.register("testuser", "pw", "test@example.com").unwrap();
        assert_eq!(auth.preferences("testuser"), Some(&Preferences::default()));

        let mut prefs = Preferences {
            default_location: "tokyo".to_string(),
            alert_types: vec!["Aurora".to_string()],
            notification_method: NotificationMethod::Console,
            ..Preferences::default()
        };
        prefs
            .extra
            .insert("alert_window".to_string(), serde_json::json!(90));
        auth.update_preferences("testuser", prefs.clone()).unwrap();

        let reopened = service(dir.path());
        assert_eq!(reopened.preferences("testuser"), Some(&prefs));
    }

    #[test]
    fn test_update_unknown_user() {
        let dir = tempdir().unwrap();
        let mut auth = service(dir.path());
        assert!(auth.preferences("ghost").is_none());
        assert!(matches!(
            auth.update_preferences("ghost", Preferences::default()),
            Err(AuthError::UnknownUser(_))
        ));
    }

    #[test]
    fn test_usernames_trimmed_everywhere() {
        let dir = tempdir().unwrap();
        let mut auth = service(dir.path());
        auth.register(" padded ", "pw", "p@example.com").unwrap();

        assert!(auth.login("padded  ", "pw").is_ok());
        assert!(auth.preferences(" padded").is_some());

        let prefs = Preferences {
            default_location: "sydney".to_string(),
            ..Preferences::default()
        };
        auth.update_preferences("padded ", prefs).unwrap();
        assert_eq!(auth.preferences("padded").unwrap().default_location, "sydney");
    }
}
