mod history;
mod inference;
mod rule;
mod user;

pub use history::{HistoryRecord, InferenceKind};
pub use inference::{BackwardResult, BackwardStatus, ForwardResult};
pub use rule::{Rule, default_rules};
pub use user::{Role, UserRecord, UsersFile};
