use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// A stored account. Passwords are kept only as Argon2id hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// On-disk shape of `users.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersFile {
    pub users: BTreeMap<String, UserRecord>,
}
