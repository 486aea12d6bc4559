/// Integration tests for the expert system server
///
/// These tests exercise the library end-to-end: storage seeding, session
/// lifecycle, and complete forward/backward consultation flows against the
/// built-in animal identification rule set.
use chrono::Duration;
use tempfile::TempDir;

use expert_engine::domain::models::{
    BackwardStatus, HistoryRecord, InferenceKind, Role, Rule, default_rules,
};
use expert_engine::domain::services::{
    DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, DataStorage, ReasoningService, SessionStore,
    verify_password,
};

fn storage() -> (TempDir, DataStorage) {
    let dir = TempDir::new().unwrap();
    let storage = DataStorage::new(dir.path());
    (dir, storage)
}

#[tokio::test]
async fn test_integration_forward_consultation() {
    let (_dir, storage) = storage();
    let sessions = SessionStore::new(Duration::hours(24));
    let token = sessions
        .create("alice", Role::User, storage.load_rules())
        .await;

    let session = sessions.get(&token).await.unwrap();
    let mut reasoning = session.reasoning.lock().await;

    reasoning
        .set_user_facts(vec![
            "hair".to_string(),
            "eats-meat".to_string(),
            "tawny".to_string(),
            "dark-spots".to_string(),
        ])
        .unwrap();

    let result = reasoning.run_forward();
    assert_eq!(result.conclusions, vec!["leopard".to_string()]);
    // hair→mammal, eats-meat→carnivore, then the leopard rule.
    assert_eq!(reasoning.accumulated_path().len(), 3);
    assert!(reasoning.derived_facts().contains(&"leopard".to_string()));
}

#[tokio::test]
async fn test_integration_backward_consultation() {
    // The interactive flow the frontend drives: ask → confirm/deny →
    // resume, across as many rounds as the engine needs.
    let (_dir, storage) = storage();
    let sessions = SessionStore::new(Duration::hours(24));
    let token = sessions
        .create("alice", Role::User, storage.load_rules())
        .await;
    let session = sessions.get(&token).await.unwrap();
    let mut reasoning = session.reasoning.lock().await;

    let truths = ["hair", "eats-meat", "tawny", "dark-spots"];
    let mut result = reasoning.start_backward("leopard");
    let mut rounds = 0;
    while result.status == BackwardStatus::NeedsFacts {
        rounds += 1;
        assert!(rounds < 16, "consultation did not converge");
        let (yes, no): (Vec<String>, Vec<String>) = result
            .facts
            .iter()
            .cloned()
            .partition(|fact| truths.contains(&fact.as_str()));
        result = reasoning.continue_backward(&yes, &no).unwrap();
    }

    assert_eq!(result.status, BackwardStatus::Proved);
    assert_eq!(result.facts, vec!["leopard".to_string()]);
    // The session path covers every rule that fired along the way.
    assert_eq!(reasoning.accumulated_path().len(), 3);
    assert!(reasoning.user_facts().contains(&"hair".to_string()));
}

#[tokio::test]
async fn test_integration_backward_with_denied_branch() {
    // Denying the spotted-coat leaves steers the same session from leopard
    // to tiger on a second consultation.
    let (_dir, storage) = storage();
    let sessions = SessionStore::new(Duration::hours(24));
    let token = sessions
        .create("alice", Role::User, storage.load_rules())
        .await;
    let session = sessions.get(&token).await.unwrap();
    let mut reasoning = session.reasoning.lock().await;

    let truths = ["hair", "eats-meat", "tawny", "black-stripes"];
    let mut result = reasoning.start_backward("leopard");
    let mut rounds = 0;
    while result.status == BackwardStatus::NeedsFacts {
        rounds += 1;
        assert!(rounds < 16);
        let (yes, no): (Vec<String>, Vec<String>) = result
            .facts
            .iter()
            .cloned()
            .partition(|fact| truths.contains(&fact.as_str()));
        result = reasoning.continue_backward(&yes, &no).unwrap();
    }
    assert_eq!(result.status, BackwardStatus::Refuted);

    let mut result = reasoning.start_backward("tiger");
    let mut rounds = 0;
    while result.status == BackwardStatus::NeedsFacts {
        rounds += 1;
        assert!(rounds < 16);
        let (yes, no): (Vec<String>, Vec<String>) = result
            .facts
            .iter()
            .cloned()
            .partition(|fact| truths.contains(&fact.as_str()));
        result = reasoning.continue_backward(&yes, &no).unwrap();
    }
    assert_eq!(result.status, BackwardStatus::Proved);
    assert_eq!(result.facts, vec!["tiger".to_string()]);
}

#[tokio::test]
async fn test_integration_session_isolation() {
    let (_dir, storage) = storage();
    let sessions = SessionStore::new(Duration::hours(24));

    let token_a = sessions
        .create("alice", Role::User, storage.load_rules())
        .await;
    let token_b = sessions
        .create("bob", Role::User, storage.load_rules())
        .await;

    let alice = sessions.get(&token_a).await.unwrap();
    alice
        .reasoning
        .lock()
        .await
        .set_user_facts(vec!["hair".to_string()])
        .unwrap();
    alice.reasoning.lock().await.run_forward();

    let bob = sessions.get(&token_b).await.unwrap();
    let bob_reasoning = bob.reasoning.lock().await;
    assert!(bob_reasoning.user_facts().is_empty());
    assert!(bob_reasoning.derived_facts().is_empty());
    assert!(bob_reasoning.accumulated_path().is_empty());
}

#[tokio::test]
async fn test_integration_rule_edit_reloads_sessions() {
    let (_dir, storage) = storage();
    let sessions = SessionStore::new(Duration::hours(24));
    let token = sessions
        .create("alice", Role::User, storage.load_rules())
        .await;

    let session = sessions.get(&token).await.unwrap();
    session
        .reasoning
        .lock()
        .await
        .set_user_facts(vec!["hair".to_string()])
        .unwrap();

    // Admin appends a rule: persisted list and live sessions both change.
    let mut rules = storage.load_rules();
    rules.push(Rule::new(["scales"], "reptile"));
    storage.save_rules(&rules).unwrap();
    sessions.reload_all(&rules).await;

    let reasoning = session.reasoning.lock().await;
    assert_eq!(reasoning.rules().len(), default_rules().len() + 1);
    // Rule ids were renumbered, so the old fact state is gone.
    assert!(reasoning.user_facts().is_empty());
    assert_eq!(storage.load_rules().len(), default_rules().len() + 1);
}

#[tokio::test]
async fn test_integration_default_admin_can_authenticate() {
    let (_dir, storage) = storage();
    let users = storage.load_users();
    let admin = users.users.get(DEFAULT_ADMIN_USERNAME).unwrap();

    assert_eq!(admin.role, Role::Admin);
    assert!(verify_password(DEFAULT_ADMIN_PASSWORD, &admin.password_hash));
    assert!(!verify_password("wrong-password", &admin.password_hash));
}

#[tokio::test]
async fn test_integration_history_round_trip() {
    let (_dir, storage) = storage();

    storage
        .add_history(HistoryRecord {
            id: "record-1".to_string(),
            username: "alice".to_string(),
            kind: InferenceKind::Backward,
            facts: vec!["hair".to_string()],
            conclusion: "mammal".to_string(),
            path: vec![0],
            timestamp: chrono::Utc::now(),
        })
        .unwrap();

    let history = storage.load_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, InferenceKind::Backward);
    assert_eq!(history[0].conclusion, "mammal");
}

#[tokio::test]
async fn test_integration_engine_state_survives_restart() {
    // A suspended consultation can be serialized, stored, and resumed by
    // a different process instance.
    let rules = default_rules();
    let mut reasoning = ReasoningService::new(rules);

    let result = reasoning.start_backward("leopard");
    assert_eq!(result.status, BackwardStatus::NeedsFacts);

    let saved = serde_json::to_string(&reasoning).unwrap();
    let mut restored: ReasoningService = serde_json::from_str(&saved).unwrap();
    assert!(restored.backward_in_progress());

    let mut result = restored
        .continue_backward(&["hair".to_string()], &[])
        .unwrap();
    let truths = ["eats-meat", "tawny", "dark-spots"];
    let mut rounds = 0;
    while result.status == BackwardStatus::NeedsFacts {
        rounds += 1;
        assert!(rounds < 16);
        let (yes, no): (Vec<String>, Vec<String>) = result
            .facts
            .iter()
            .cloned()
            .partition(|fact| truths.contains(&fact.as_str()));
        result = restored.continue_backward(&yes, &no).unwrap();
    }
    assert_eq!(result.status, BackwardStatus::Proved);
}
