use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Job lifecycle: RUNNING at creation, then exactly one terminal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Running,
    /// Clean success
    Done,
    /// Completed, but the result is degraded (e.g. a fallback was used)
    DoneWithWarnings,
    /// Aborted by a precondition failure or an unexpected error
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Running => "RUNNING",
            JobStatus::Done => "DONE",
            JobStatus::DoneWithWarnings => "DONE_WITH_WARNINGS",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

/// One recorded engine execution (job table row).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub user_id: String,
    pub action: String,
    pub status: String,
    pub payload_json: Option<String>,
    pub result_json: Option<String>,
    pub raw: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection without the payload/result snapshots.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: i64,
    pub user_id: String,
    pub action: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
