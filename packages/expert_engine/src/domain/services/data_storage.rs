//! JSON file persistence for rules, users, and inference history.
//!
//! Three files under one data directory: `rules.json`, `users.json`,
//! `inference_history.json`. Missing or unreadable files fall back to
//! defaults; the rule file is seeded with the built-in rule set and the
//! user file with the default admin account on first load.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::errors::StorageResult;
use crate::domain::models::{HistoryRecord, Rule, UserRecord, UsersFile, default_rules};
use crate::domain::services::password::hash_password;

const RULES_FILE: &str = "rules.json";
const USERS_FILE: &str = "users.json";
const HISTORY_FILE: &str = "inference_history.json";

/// Most recent records kept in the history file.
const HISTORY_CAP: usize = 1000;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RulesFile {
    rules: Vec<Rule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryFile {
    history: Vec<HistoryRecord>,
}

pub struct DataStorage {
    base: PathBuf,
}

impl DataStorage {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn load_json<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.base.join(file);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(file, %err, "data file unreadable, falling back to defaults");
                None
            }
        }
    }

    fn save_json<T: Serialize>(&self, file: &str, value: &T) -> StorageResult<()> {
        fs::create_dir_all(&self.base)?;
        let text = serde_json::to_string_pretty(value)?;
        fs::write(self.base.join(file), text)?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base
    }

    // ---- rules ----

    /// Load the rule list, seeding the built-in rules when the file is
    /// missing or empty.
    pub fn load_rules(&self) -> Vec<Rule> {
        let rules = self
            .load_json::<RulesFile>(RULES_FILE)
            .map(|file| file.rules)
            .unwrap_or_default();
        if !rules.is_empty() {
            return rules;
        }

        let defaults = default_rules();
        if let Err(err) = self.save_rules(&defaults) {
            warn!(%err, "could not persist default rules");
        } else {
            info!(count = defaults.len(), "seeded default rule set");
        }
        defaults
    }

    pub fn save_rules(&self, rules: &[Rule]) -> StorageResult<()> {
        self.save_json(
            RULES_FILE,
            &RulesFile {
                rules: rules.to_vec(),
            },
        )
    }

    // ---- users ----

    /// Load the user table, seeding the default admin account if absent.
    pub fn load_users(&self) -> UsersFile {
        let mut users = self.load_json::<UsersFile>(USERS_FILE).unwrap_or_default();
        if !users.users.contains_key(DEFAULT_ADMIN_USERNAME) {
            let Some(password_hash) = hash_password(DEFAULT_ADMIN_PASSWORD) else {
                warn!("could not hash default admin password");
                return users;
            };
            users.users.insert(
                DEFAULT_ADMIN_USERNAME.to_string(),
                UserRecord {
                    password_hash,
                    role: crate::domain::models::Role::Admin,
                    created_at: Utc::now(),
                },
            );
            if let Err(err) = self.save_users(&users) {
                warn!(%err, "could not persist default admin account");
            } else {
                info!("seeded default admin account");
            }
        }
        users
    }

    pub fn save_users(&self, users: &UsersFile) -> StorageResult<()> {
        self.save_json(USERS_FILE, users)
    }

    // ---- history ----

    pub fn load_history(&self) -> Vec<HistoryRecord> {
        self.load_json::<HistoryFile>(HISTORY_FILE)
            .map(|file| file.history)
            .unwrap_or_default()
    }

    /// Persist the history, dropping the oldest records beyond the cap.
    pub fn save_history(&self, mut history: Vec<HistoryRecord>) -> StorageResult<()> {
        if history.len() > HISTORY_CAP {
            history.drain(..history.len() - HISTORY_CAP);
        }
        self.save_json(HISTORY_FILE, &HistoryFile { history })
    }

    pub fn add_history(&self, record: HistoryRecord) -> StorageResult<()> {
        let mut history = self.load_history();
        history.push(record);
        self.save_history(history)
    }
}
