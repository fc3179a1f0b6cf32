use sqlx::PgPool;

use crate::error::EngineError;
use crate::models::{Job, JobStatus, JobSummary};

/// Open a job in RUNNING state and return its id.
pub async fn create_job(
    pool: &PgPool,
    user_id: &str,
    action: &str,
    payload_json: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO job (user_id, action, status, payload_json)
        VALUES ($1, $2, 'RUNNING', $3)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(action)
    .bind(payload_json)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// The single terminal transition. The conditional UPDATE guarantees a job
/// is finalized at most once; a second attempt is an error.
pub async fn finish_job(
    pool: &PgPool,
    job_id: i64,
    status: JobStatus,
    result_json: Option<&str>,
    raw: Option<&str>,
    error: Option<&str>,
) -> Result<(), EngineError> {
    if !status.is_terminal() {
        return Err(EngineError::Precondition(format!(
            "{} is not a terminal job status",
            status.as_str()
        )));
    }

    let updated = sqlx::query(
        r#"
        UPDATE job
        SET status = $2, result_json = $3, raw = $4, error = $5, updated_at = now()
        WHERE id = $1 AND status = 'RUNNING'
        "#,
    )
    .bind(job_id)
    .bind(status.as_str())
    .bind(result_json)
    .bind(raw)
    .bind(error)
    .execute(pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(EngineError::JobFinalized(job_id));
    }
    Ok(())
}

pub async fn list_jobs(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<JobSummary>, sqlx::Error> {
    sqlx::query_as::<_, JobSummary>(
        r#"
        SELECT id, user_id, action, status, created_at, updated_at
        FROM job
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn get_job(pool: &PgPool, job_id: i64) -> Result<Option<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>(
        r#"
        SELECT id, user_id, action, status, payload_json, result_json, raw, error,
               created_at, updated_at
        FROM job
        WHERE id = $1
        "#,
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await
}
