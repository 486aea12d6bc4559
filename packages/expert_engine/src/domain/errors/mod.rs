mod engine_error;
mod storage_error;

pub use engine_error::{EngineError, EngineResult};
pub use storage_error::{StorageError, StorageResult};
