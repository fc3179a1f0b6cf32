use thiserror::Error;

use crate::models::JobStatus;

/// Engine-level failure taxonomy. Every variant carries a stable machine
/// token (`kind`) next to the free-text detail.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The operation cannot start: required input is absent or empty.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// No source yielded usable text at all.
    #[error("no usable input: {0}")]
    NoUsableInput(String),

    /// An uploaded catalog could not be read.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    /// A terminal job transition was attempted twice.
    #[error("job {0} already finalized")]
    JobFinalized(i64),
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Precondition(_) => "PRECONDITION",
            EngineError::NoUsableInput(_) => "NO_USABLE_INPUT",
            EngineError::InvalidUpload(_) => "INVALID_UPLOAD",
            EngineError::Csv(_) => "CSV_ERROR",
            EngineError::Db(_) => "DB_ERROR",
            EngineError::JobFinalized(_) => "JOB_FINALIZED",
        }
    }
}

/// A computation that finished, possibly by falling back. `Degraded` means a
/// preferred upstream result was unusable and a local computation replaced
/// it; callers map that to DONE_WITH_WARNINGS without inspecting free text.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Clean(T),
    Degraded { value: T, warning: String },
}

impl<T> Outcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Outcome::Clean(v) => v,
            Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Clean(v) => v,
            Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Outcome::Clean(_) => None,
            Outcome::Degraded { warning, .. } => Some(warning),
        }
    }

    pub fn job_status(&self) -> JobStatus {
        match self {
            Outcome::Clean(_) => JobStatus::Done,
            Outcome::Degraded { .. } => JobStatus::DoneWithWarnings,
        }
    }
}
