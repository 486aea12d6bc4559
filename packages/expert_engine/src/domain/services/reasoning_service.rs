//! Per-session reasoning state.
//!
//! Each authenticated session owns one `ReasoningService`: an engine loaded
//! from the shared rule list plus the session-visible bookkeeping the HTTP
//! layer reports — which facts the user asserted versus which the engine
//! derived, the accumulated rule path across calls, and the progress of an
//! interactive backward search.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{BackwardResult, ForwardResult, Rule};
use crate::domain::services::{Reasoner, RuleId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningService {
    reasoner: Reasoner,
    rules: Vec<Rule>,
    user_facts: Vec<String>,
    derived_facts: Vec<String>,
    false_facts: Vec<String>,
    path_all: Vec<RuleId>,
    backward_target: Option<String>,
}

impl ReasoningService {
    pub fn new(rules: Vec<Rule>) -> Self {
        let mut reasoner = Reasoner::new();
        reasoner.reset(&rules);
        Self {
            reasoner,
            rules,
            user_facts: Vec::new(),
            derived_facts: Vec::new(),
            false_facts: Vec::new(),
            path_all: Vec::new(),
            backward_target: None,
        }
    }

    /// Swap in a fresh rule list after an admin edit.
    ///
    /// Rule ids are positional, so everything derived against the old list
    /// — facts, path, a half-finished backward search — is meaningless now
    /// and is discarded along with the engine state.
    pub fn reload_rules(&mut self, rules: Vec<Rule>) {
        self.rules = rules;
        self.reasoner.reset(&self.rules);
        self.user_facts.clear();
        self.derived_facts.clear();
        self.false_facts.clear();
        self.path_all.clear();
        self.backward_target = None;
    }

    /// Clear all fact and derivation state, keeping the rule base.
    pub fn reset_state(&mut self) {
        self.reasoner.clear_known();
        self.reasoner.clear_false();
        self.user_facts.clear();
        self.derived_facts.clear();
        self.false_facts.clear();
        self.path_all.clear();
        self.backward_target = None;
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn user_facts(&self) -> &[String] {
        &self.user_facts
    }

    pub fn derived_facts(&self) -> &[String] {
        &self.derived_facts
    }

    pub fn false_facts(&self) -> &[String] {
        &self.false_facts
    }

    pub fn accumulated_path(&self) -> &[RuleId] {
        &self.path_all
    }

    pub fn backward_target(&self) -> Option<&str> {
        self.backward_target.as_deref()
    }

    pub fn backward_in_progress(&self) -> bool {
        self.backward_target.is_some()
    }

    /// Names that appear only as premises: the leaf vocabulary a user can
    /// assert directly.
    pub fn atoms(&self) -> Vec<String> {
        let conclusions: std::collections::BTreeSet<&str> =
            self.rules.iter().map(|r| r.conclusion.as_str()).collect();
        let atoms: std::collections::BTreeSet<&str> = self
            .rules
            .iter()
            .flat_map(|r| r.premises.iter().map(String::as_str))
            .filter(|name| !conclusions.contains(name))
            .collect();
        atoms.into_iter().map(str::to_string).collect()
    }

    /// Names some rule can derive, sorted.
    pub fn conclusions(&self) -> Vec<String> {
        let conclusions: std::collections::BTreeSet<&str> =
            self.rules.iter().map(|r| r.conclusion.as_str()).collect();
        conclusions.into_iter().map(str::to_string).collect()
    }

    /// Replace the user-asserted fact set.
    ///
    /// Adding facts keeps the derivation history; removing any previously
    /// asserted fact invalidates it, so the accumulated path, derived
    /// facts, and any in-progress backward search are dropped.
    pub fn set_user_facts(&mut self, facts: Vec<String>) -> EngineResult<()> {
        let removed = self
            .user_facts
            .iter()
            .any(|old| !facts.contains(old));
        if removed {
            self.path_all.clear();
            self.derived_facts.clear();
            self.backward_target = None;
        }

        self.reasoner.clear_known();
        self.reasoner.add_known(&facts)?;
        self.user_facts = facts;
        Ok(())
    }

    /// Replace the known-false fact set.
    pub fn set_false_facts(&mut self, facts: Vec<String>) -> EngineResult<()> {
        self.reasoner.clear_false();
        self.reasoner.add_false(&facts)?;
        self.false_facts = facts;
        Ok(())
    }

    /// Run forward chaining and fold the new firings into the accumulated
    /// session path and derived-fact list.
    pub fn run_forward(&mut self) -> ForwardResult {
        let result = self.reasoner.forward();
        self.absorb_path(&result.path);
        result
    }

    /// Begin (or restart) a goal-directed search for `target`.
    pub fn start_backward(&mut self, target: &str) -> BackwardResult {
        self.backward_target = Some(target.to_string());
        self.step()
    }

    /// Answer an ask-suspension and resume the active search.
    ///
    /// `true_facts` and `false_facts` are the user's verdicts on the leaf
    /// facts from the last suspension; per the resumption contract a leaf
    /// the user did not confirm arrives in `false_facts`.
    pub fn continue_backward(
        &mut self,
        true_facts: &[String],
        false_facts: &[String],
    ) -> EngineResult<BackwardResult> {
        if self.backward_target.is_none() {
            return Err(EngineError::NoActiveGoal);
        }

        if !true_facts.is_empty() {
            self.reasoner.add_known(true_facts)?;
            for fact in true_facts {
                if !self.user_facts.contains(fact) {
                    self.user_facts.push(fact.clone());
                }
            }
        }
        if !false_facts.is_empty() {
            self.reasoner.add_false(false_facts)?;
            for fact in false_facts {
                if !self.false_facts.contains(fact) {
                    self.false_facts.push(fact.clone());
                }
            }
        }

        Ok(self.step())
    }

    fn step(&mut self) -> BackwardResult {
        let target = self
            .backward_target
            .clone()
            .expect("step only runs with an active target");
        let result = self.reasoner.step_backward(&target);
        self.absorb_path(&result.path);

        match result.status {
            crate::domain::models::BackwardStatus::NeedsFacts => {}
            _ => {
                debug!(target = %target, status = ?result.status, "backward search settled");
                self.backward_target = None;
            }
        }
        result
    }

    fn absorb_path(&mut self, path: &[RuleId]) {
        for &rule_id in path {
            if !self.path_all.contains(&rule_id) {
                self.path_all.push(rule_id);
            }
            if let Some(rule) = self.rules.get(rule_id) {
                if !self.derived_facts.contains(&rule.conclusion) {
                    self.derived_facts.push(rule.conclusion.clone());
                }
            }
        }
    }
}
