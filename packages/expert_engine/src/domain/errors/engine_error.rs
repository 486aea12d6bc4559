use thiserror::Error;

/// Error types for the rule-reasoning engine
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// A fact was asserted both true and false
    #[error("Fact '{0}' cannot be both known and false")]
    FactConflict(String),

    /// A backward step was requested without an active goal
    #[error("No backward search in progress")]
    NoActiveGoal,
}

pub type EngineResult<T> = Result<T, EngineError>;
