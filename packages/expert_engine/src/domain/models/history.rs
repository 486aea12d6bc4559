use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::services::RuleId;

/// Which chaining mode produced a history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceKind {
    Forward,
    Backward,
}

/// One completed inference, as persisted in `inference_history.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub username: String,
    #[serde(rename = "type")]
    pub kind: InferenceKind,
    /// User-asserted facts at the time of the inference.
    pub facts: Vec<String>,
    /// The established conclusion (forward: the selected terminal; backward:
    /// the proved target).
    pub conclusion: String,
    /// Accumulated rule-id path of the session at completion.
    pub path: Vec<RuleId>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_uses_type_field() {
        let record = HistoryRecord {
            id: "r1".to_string(),
            username: "alice".to_string(),
            kind: InferenceKind::Forward,
            facts: vec!["hair".to_string()],
            conclusion: "mammal".to_string(),
            path: vec![0],
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "forward");
    }
}
