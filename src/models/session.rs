use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-user assistant conversation state (assistant_session table).
/// Created on first use; shared store so multiple instances stay consistent.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AssistantSession {
    pub user_id: String,
    pub stage: String,
    pub selected_plan: Option<String>,
    pub updated_at: DateTime<Utc>,
}
