//! Persistent storage for user accounts.
//!
//! All users live in one `users.json` document in the data directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{password_digest, Preferences, UserRecord};
use crate::core::storage::{self, StoreError};

pub const USERS_FILE: &str = "users.json";
pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo123";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UsersDocument {
    /// Id handed to the next registered user
    #[serde(default = "first_id")]
    next_id: u64,
    #[serde(default)]
    users: BTreeMap<String, UserRecord>,
}

fn first_id() -> u64 {
    1
}

pub struct UserStore {
    path: PathBuf,
    document: UsersDocument,
}

impl UserStore {
    /// Open the store in `data_dir`. A missing or corrupt file opens empty.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(USERS_FILE);
        let mut document: UsersDocument = storage::load_or_default(&path);
        // Repair a counter that fell behind (hand-edited files)
        let max_id = document.users.values().map(|u| u.id).max().unwrap_or(0);
        document.next_id = document.next_id.max(max_id + 1);
        Self { path, document }
    }

    /// Open the store, creating it with the demo account if the file is new.
    pub fn open_seeded(data_dir: &Path, seed_demo: bool) -> Result<Self, StoreError> {
        let fresh = !data_dir.join(USERS_FILE).exists();
        let mut store = Self::open(data_dir);
        if fresh && seed_demo {
            store.insert(
                DEMO_USERNAME,
                "demo@example.com",
                password_digest(DEMO_PASSWORD),
                Preferences::default(),
                Utc::now(),
            )?;
            log::info!("Created users file with demo account '{}'", DEMO_USERNAME);
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, username: &str) -> Option<&UserRecord> {
        self.document.users.get(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.document.users.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.document.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.users.is_empty()
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.document.users.keys().map(String::as_str)
    }

    /// Add a user and persist. Fails with `Conflict` if the name is taken.
    pub fn insert(
        &mut self,
        username: &str,
        email: &str,
        password_digest: String,
        preferences: Preferences,
        created_at: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        if self.contains(username) {
            return Err(StoreError::Conflict(username.to_string()));
        }
        let mut next = self.document.clone();
        let id = next.next_id;
        next.next_id += 1;
        next.users.insert(
            username.to_string(),
            UserRecord {
                id,
                username: username.to_string(),
                email: email.to_string(),
                password_digest,
                preferences,
                created_at,
            },
        );
        self.commit(next)?;
        Ok(id)
    }

    /// Replace a user's preferences. Returns false for unknown users.
    pub fn set_preferences(
        &mut self,
        username: &str,
        preferences: Preferences,
    ) -> Result<bool, StoreError> {
        if !self.contains(username) {
            return Ok(false);
        }
        let mut next = self.document.clone();
        if let Some(user) = next.users.get_mut(username) {
            user.preferences = preferences;
        }
        self.commit(next)?;
        Ok(true)
    }

    /// Write the new document; memory only changes once the write succeeded.
    fn commit(&mut self, next: UsersDocument) -> Result<(), StoreError> {
        storage::save(&self.path, &next)?;
        self.document = next;
        Ok(())
    }
}
