use serde::{Deserialize, Serialize};

use crate::domain::services::RuleId;

/// Result of one forward-chaining run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardResult {
    /// Terminal conclusions in worklist pop order. The first entry is the
    /// selected conclusion; the ordering is a traversal artifact, not a
    /// confidence ranking.
    pub conclusions: Vec<String>,

    /// Rules fired during this run, in firing order, deduplicated.
    pub path: Vec<RuleId>,
}

/// Outcome of one backward-chaining step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackwardStatus {
    /// The goal was established; the search is complete.
    Proved,
    /// No derivation path remains; the goal is now marked false.
    Refuted,
    /// The search is suspended awaiting confirmation of leaf facts.
    NeedsFacts,
}

/// Result of one call to the backward chainer.
///
/// On `NeedsFacts` the frame stack is left untouched so a later call with
/// the same target resumes exactly where this one suspended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackwardResult {
    pub status: BackwardStatus,

    /// `Proved`: the target name. `NeedsFacts`: the leaf premises awaiting
    /// confirmation. `Refuted`: empty.
    pub facts: Vec<String>,

    /// Rules fired during this step, in firing order, deduplicated.
    pub path: Vec<RuleId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&BackwardStatus::NeedsFacts).unwrap();
        assert_eq!(json, "\"needs_facts\"");
    }
}
