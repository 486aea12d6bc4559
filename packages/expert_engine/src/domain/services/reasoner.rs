//! Rule-reasoning engine: symbol-indexed rule base, forward-chaining
//! closure, and a resumable goal-directed backward search.
//!
//! The backward search must survive suspension across a stateless request
//! boundary, so it is driven by an explicit frame stack instead of
//! recursion: every field of [`Reasoner`] is plain data with serde derives,
//! and a host can persist and restore a session's reasoning state wholesale.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{BackwardResult, BackwardStatus, ForwardResult, Rule};

/// Interned id of a proposition name. Ids are allocated densely from zero
/// and never reused within one engine generation.
pub type SymbolId = usize;

/// Positional id of a rule in the current rule list. Invalidated by any
/// edit to the list; re-derive after calling [`Reasoner::reset`].
pub type RuleId = usize;

/// A rule with its names resolved to interned ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRule {
    premises: Vec<SymbolId>,
    conclusion: SymbolId,
}

/// Per-symbol reverse indices into the rule list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SymbolEntry {
    name: String,
    /// Rules whose conclusion is this symbol.
    derived_by: Vec<RuleId>,
    /// Rules listing this symbol among their premises.
    used_in: Vec<RuleId>,
}

/// One suspended goal of the backward search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct GoalFrame {
    goal: SymbolId,
    /// Index into `derived_by(goal)` of the rule currently under trial.
    cursor: usize,
}

/// The reasoning engine. One instance per logical user; not for concurrent
/// mutation — the hosting layer serializes calls against each instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reasoner {
    rules: Vec<StoredRule>,
    symbols: Vec<SymbolEntry>,
    ids: HashMap<String, SymbolId>,
    known: HashSet<SymbolId>,
    false_facts: HashSet<SymbolId>,
    /// Rules fired so far, in firing order.
    path: Vec<RuleId>,
    /// Companion set of `path` for deduplication.
    fired: HashSet<RuleId>,
    /// Backward-search frame stack, bottom = original target.
    stack: Vec<GoalFrame>,
    /// Goals currently on the stack. A derivable premise already present
    /// here marks a cyclic derivation path, which fails immediately
    /// instead of growing the stack without bound.
    on_stack: HashSet<SymbolId>,
    /// Target of the in-progress backward search, if any.
    active_goal: Option<SymbolId>,
}

impl Reasoner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all state and rebuild the rule base and its indices.
    ///
    /// Safe to call repeatedly; every premise and conclusion name is
    /// interned afresh, so rule and symbol ids from before the reset are
    /// meaningless afterwards.
    pub fn reset(&mut self, rules: &[Rule]) {
        *self = Self::default();
        for rule in rules {
            self.add_rule(rule);
        }
    }

    fn add_rule(&mut self, rule: &Rule) {
        let premises: Vec<SymbolId> = rule.premises.iter().map(|p| self.intern(p)).collect();
        let conclusion = self.intern(&rule.conclusion);
        let rule_id = self.rules.len();
        for &premise in &premises {
            self.symbols[premise].used_in.push(rule_id);
        }
        self.symbols[conclusion].derived_by.push(rule_id);
        self.rules.push(StoredRule {
            premises,
            conclusion,
        });
    }

    /// Map a name to its symbol id, allocating the next id on first sight.
    /// Any name is accepted, including names no rule mentions.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.symbols.len();
        self.ids.insert(name.to_string(), id);
        self.symbols.push(SymbolEntry {
            name: name.to_string(),
            ..SymbolEntry::default()
        });
        id
    }

    fn name(&self, id: SymbolId) -> &str {
        &self.symbols[id].name
    }

    /// Assert facts as known true. Stops at the first name already
    /// asserted false; names before it stay asserted.
    pub fn add_known<S: AsRef<str>>(&mut self, names: &[S]) -> EngineResult<()> {
        for name in names {
            let id = self.intern(name.as_ref());
            if self.false_facts.contains(&id) {
                return Err(EngineError::FactConflict(name.as_ref().to_string()));
            }
            self.known.insert(id);
        }
        Ok(())
    }

    /// Assert facts as known false. Stops at the first name already
    /// asserted true; names before it stay asserted.
    pub fn add_false<S: AsRef<str>>(&mut self, names: &[S]) -> EngineResult<()> {
        for name in names {
            let id = self.intern(name.as_ref());
            if self.known.contains(&id) {
                return Err(EngineError::FactConflict(name.as_ref().to_string()));
            }
            self.false_facts.insert(id);
        }
        Ok(())
    }

    /// Clear the known set. The derivation history is tied to the facts
    /// that produced it, so the path is discarded as well.
    pub fn clear_known(&mut self) {
        self.known.clear();
        self.path.clear();
        self.fired.clear();
    }

    pub fn clear_false(&mut self) {
        self.false_facts.clear();
    }

    pub fn is_known(&mut self, name: &str) -> bool {
        let id = self.intern(name);
        self.known.contains(&id)
    }

    /// Compute the deductive closure of the known set.
    ///
    /// A worklist is seeded with the current known symbols. Popping a
    /// symbol that no rule uses as a premise records it as a terminal
    /// conclusion; otherwise each rule using it is fired once all of its
    /// premises are known and its conclusion is not. Monotonic: `known`
    /// only grows, and a rule fires at most once per fact generation, so a
    /// second call with unchanged facts returns an empty path.
    pub fn forward(&mut self) -> ForwardResult {
        self.path.clear();
        self.fired.clear();
        let mut conclusions = Vec::new();
        let mut worklist: Vec<SymbolId> = self.known.iter().copied().collect();

        while let Some(current) = worklist.pop() {
            if self.symbols[current].used_in.is_empty() {
                conclusions.push(self.name(current).to_string());
                continue;
            }

            let candidates = self.symbols[current].used_in.clone();
            for rule_id in candidates {
                let conclusion = self.rules[rule_id].conclusion;
                if self.known.contains(&conclusion) {
                    continue;
                }
                let satisfied = self.rules[rule_id]
                    .premises
                    .iter()
                    .all(|premise| self.known.contains(premise));
                if satisfied {
                    if self.fired.insert(rule_id) {
                        self.path.push(rule_id);
                    }
                    self.known.insert(conclusion);
                    worklist.push(conclusion);
                }
            }
        }

        debug!(
            fired = self.path.len(),
            conclusions = conclusions.len(),
            "forward chaining finished"
        );
        ForwardResult {
            conclusions,
            path: self.path.clone(),
        }
    }

    /// Run the goal-directed search for `target` until it either settles
    /// or must suspend for external confirmation of leaf facts.
    ///
    /// Calling with a target different from the active goal abandons any
    /// in-progress search and starts over. Calling again with the same
    /// target after answering a `NeedsFacts` suspension (via [`add_known`]
    /// / [`add_false`]) resumes from the saved frame stack: the suspended
    /// frame's cursor is untouched, so the same candidate rule is
    /// re-evaluated against the updated fact sets.
    ///
    /// [`add_known`]: Reasoner::add_known
    /// [`add_false`]: Reasoner::add_false
    pub fn step_backward(&mut self, target: &str) -> BackwardResult {
        let target_id = self.intern(target);
        self.path.clear();
        self.fired.clear();

        if self.active_goal != Some(target_id) {
            if self.active_goal.is_some() {
                debug!(target, "goal switched, discarding in-progress proof");
            }
            self.stack.clear();
            self.on_stack.clear();
            self.push_goal(target_id);
            self.active_goal = Some(target_id);
        }

        while let Some(&GoalFrame { goal, cursor }) = self.stack.last() {
            // Already settled either way: nothing left to do for this goal.
            if self.known.contains(&goal) || self.false_facts.contains(&goal) {
                self.pop_goal();
                continue;
            }

            // Every candidate rule exhausted: the goal is unprovable.
            if cursor >= self.symbols[goal].derived_by.len() {
                self.false_facts.insert(goal);
                self.pop_goal();
                continue;
            }

            let rule_id = self.symbols[goal].derived_by[cursor];
            let premises = self.rules[rule_id].premises.clone();

            let mut usable = true;
            let mut subgoal: Option<SymbolId> = None;
            let mut to_ask: Vec<String> = Vec::new();

            for premise in premises {
                if self.false_facts.contains(&premise) {
                    usable = false;
                    break;
                }
                if self.known.contains(&premise) {
                    continue;
                }
                if self.symbols[premise].derived_by.is_empty() {
                    // Leaf premise: only external confirmation can settle it.
                    to_ask.push(self.name(premise).to_string());
                } else if self.on_stack.contains(&premise) {
                    // Cyclic derivation path; this rule cannot make progress.
                    usable = false;
                    break;
                } else if subgoal.is_none() {
                    subgoal = Some(premise);
                }
            }

            if !usable {
                self.stack.last_mut().expect("frame peeked above").cursor += 1;
                continue;
            }

            // Subgoals are resolved one at a time, left to right, before
            // any leaf premise of the same rule is asked.
            if let Some(subgoal) = subgoal {
                self.push_goal(subgoal);
                continue;
            }

            if !to_ask.is_empty() {
                // Suspend. The frame and cursor stay as-is so resumption
                // re-evaluates this same rule.
                debug!(target, pending = to_ask.len(), "suspending for leaf facts");
                return BackwardResult {
                    status: BackwardStatus::NeedsFacts,
                    facts: to_ask,
                    path: self.path.clone(),
                };
            }

            // All premises satisfied: the goal holds.
            self.known.insert(goal);
            if self.fired.insert(rule_id) {
                self.path.push(rule_id);
            }
            self.pop_goal();
        }

        self.active_goal = None;
        if self.known.contains(&target_id) {
            BackwardResult {
                status: BackwardStatus::Proved,
                facts: vec![target.to_string()],
                path: self.path.clone(),
            }
        } else {
            BackwardResult {
                status: BackwardStatus::Refuted,
                facts: Vec::new(),
                path: self.path.clone(),
            }
        }
    }

    fn push_goal(&mut self, goal: SymbolId) {
        self.stack.push(GoalFrame { goal, cursor: 0 });
        self.on_stack.insert(goal);
    }

    fn pop_goal(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.on_stack.remove(&frame.goal);
        }
    }
}
