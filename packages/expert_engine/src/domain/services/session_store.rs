//! Session store: one reasoning-state instance per logged-in user.
//!
//! Sessions are an explicit keyed store with a defined lifecycle — created
//! on login, evicted on logout, expiry, or account deletion — rather than
//! ambient global state. Each entry carries its own [`ReasoningService`]
//! behind a mutex, which both isolates users from each other and
//! serializes calls against a single user's engine (the engine mutates its
//! stack and sets in place and is not reentrant).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::models::{Role, Rule};
use crate::domain::services::ReasoningService;

/// A live authenticated session.
#[derive(Clone)]
pub struct SessionEntry {
    pub username: String,
    pub role: Role,
    pub login_time: DateTime<Utc>,
    pub reasoning: Arc<Mutex<ReasoningService>>,
}

/// Token-keyed store of live sessions.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Create a session for a freshly authenticated user. The returned
    /// token is the bearer credential for all subsequent requests.
    pub async fn create(&self, username: &str, role: Role, rules: Vec<Rule>) -> String {
        let token = Uuid::new_v4().to_string();
        let entry = SessionEntry {
            username: username.to_string(),
            role,
            login_time: Utc::now(),
            reasoning: Arc::new(Mutex::new(ReasoningService::new(rules))),
        };
        self.sessions.write().await.insert(token.clone(), entry);
        info!(username, "session created");
        token
    }

    /// Resolve a bearer token. Expired sessions are evicted on access.
    pub async fn get(&self, token: &str) -> Option<SessionEntry> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(entry) if Utc::now() - entry.login_time <= self.ttl => {
                    return Some(entry.clone());
                }
                Some(_) => {} // expired, evict below
                None => return None,
            }
        }
        self.remove(token).await;
        None
    }

    /// Evict one session (logout).
    pub async fn remove(&self, token: &str) {
        if let Some(entry) = self.sessions.write().await.remove(token) {
            debug!(username = %entry.username, "session evicted");
        }
    }

    /// Evict every session belonging to a user (account deletion).
    pub async fn remove_user(&self, username: &str) {
        self.sessions
            .write()
            .await
            .retain(|_, entry| entry.username != username);
    }

    /// Propagate a role change to the user's live sessions.
    pub async fn update_role(&self, username: &str, role: Role) {
        for entry in self.sessions.write().await.values_mut() {
            if entry.username == username {
                entry.role = role;
            }
        }
    }

    /// Reload every live session's engine after a rule-set edit. Rule ids
    /// are positional, so per-session fact and search state derived from
    /// the old list is discarded in the process.
    pub async fn reload_all(&self, rules: &[Rule]) {
        let sessions = self.sessions.read().await;
        for entry in sessions.values() {
            entry.reasoning.lock().await.reload_rules(rules.to_vec());
        }
        info!(sessions = sessions.len(), "rule set reloaded into live sessions");
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::default_rules;

    fn store() -> SessionStore {
        SessionStore::new(Duration::hours(24))
    }

    #[tokio::test]
    async fn test_create_and_resolve() {
        let store = store();
        let token = store.create("alice", Role::User, default_rules()).await;

        let entry = store.get(&token).await.expect("session should resolve");
        assert_eq!(entry.username, "alice");
        assert_eq!(entry.role, Role::User);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let store = store();
        assert!(store.get("not-a-token").await.is_none());
    }

    #[tokio::test]
    async fn test_logout_evicts() {
        let store = store();
        let token = store.create("alice", Role::User, default_rules()).await;
        store.remove(&token).await;
        assert!(store.get(&token).await.is_none());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_expired_session_evicted_on_access() {
        let store = SessionStore::new(Duration::seconds(-1));
        let token = store.create("alice", Role::User, default_rules()).await;
        assert!(store.get(&token).await.is_none());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_sessions_isolate_reasoning_state() {
        let store = store();
        let token_a = store.create("alice", Role::User, default_rules()).await;
        let token_b = store.create("bob", Role::User, default_rules()).await;

        let alice = store.get(&token_a).await.unwrap();
        alice
            .reasoning
            .lock()
            .await
            .set_user_facts(vec!["hair".to_string()])
            .unwrap();

        let bob = store.get(&token_b).await.unwrap();
        assert!(bob.reasoning.lock().await.user_facts().is_empty());
        assert_eq!(
            alice.reasoning.lock().await.user_facts(),
            &["hair".to_string()]
        );
    }

    #[tokio::test]
    async fn test_role_update_reaches_live_sessions() {
        let store = store();
        let token = store.create("alice", Role::User, default_rules()).await;
        store.update_role("alice", Role::Admin).await;
        assert_eq!(store.get(&token).await.unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn test_remove_user_evicts_all_their_sessions() {
        let store = store();
        let token_1 = store.create("alice", Role::User, default_rules()).await;
        let token_2 = store.create("alice", Role::User, default_rules()).await;
        let other = store.create("bob", Role::User, default_rules()).await;

        store.remove_user("alice").await;
        assert!(store.get(&token_1).await.is_none());
        assert!(store.get(&token_2).await.is_none());
        assert!(store.get(&other).await.is_some());
    }

    #[tokio::test]
    async fn test_reload_all_resets_session_facts() {
        let store = store();
        let token = store.create("alice", Role::User, default_rules()).await;
        let entry = store.get(&token).await.unwrap();
        entry
            .reasoning
            .lock()
            .await
            .set_user_facts(vec!["hair".to_string()])
            .unwrap();

        let new_rules = vec![Rule::new(["wings"], "aircraft")];
        store.reload_all(&new_rules).await;

        let reasoning = entry.reasoning.lock().await;
        assert!(reasoning.user_facts().is_empty());
        assert_eq!(reasoning.rules(), new_rules.as_slice());
    }
}
