use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db;
use crate::error::Outcome;
use crate::models::{
    CompanyProfile, CompatibilityReport, Decision, DocumentAnalysis, JobStatus, MatchResult,
    ProviderOffer, RequiredItem, Tender, TenderEvaluation,
};
use crate::service;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

/// Demo fallback when no user is supplied.
fn resolve_user(q: &UserQuery) -> String {
    q.user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or("demo")
        .to_string()
}

#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub status: String,
    pub message: String,
}

fn error_response(code: StatusCode, status: &str, message: String) -> Response {
    (
        code,
        Json(ApiMessage {
            success: false,
            status: status.to_string(),
            message,
        }),
    )
        .into_response()
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "DB_ERROR",
        format!("Error: {e}"),
    )
}

fn json_snapshot<T: Serialize>(value: &T) -> Option<String> {
    serde_json::to_string(value).ok()
}

/// Terminal job write; a failure here must not mask the handler result.
async fn close_job(
    pool: &PgPool,
    job_id: i64,
    status: JobStatus,
    result_json: Option<&str>,
    error: Option<&str>,
) {
    if let Err(e) = db::finish_job(pool, job_id, status, result_json, None, error).await {
        tracing::warn!("failed to close job {}: {}", job_id, e);
    }
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

// ----------------- Company -----------------

pub async fn company_get(State(state): State<AppState>, Query(q): Query<UserQuery>) -> Response {
    let user = resolve_user(&q);
    match db::get_company(&state.pool, &user).await {
        Ok(profile) => {
            Json(profile.unwrap_or_else(|| CompanyProfile::empty(&user))).into_response()
        }
        Err(e) => internal_error(e),
    }
}

pub async fn company_set(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
    Json(profile): Json<CompanyProfile>,
) -> Response {
    let user = resolve_user(&q);
    match db::upsert_company(&state.pool, &user, &profile).await {
        Ok(saved) => Json(saved).into_response(),
        Err(e) => internal_error(e),
    }
}

// ----------------- Inventory -----------------

#[derive(Debug, Serialize)]
pub struct InventoryUploadResponse {
    pub user_id: String,
    pub imported: usize,
}

pub async fn inventory_list(State(state): State<AppState>, Query(q): Query<UserQuery>) -> Response {
    let user = resolve_user(&q);
    match db::list_inventory(&state.pool, &user).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => internal_error(e),
    }
}

/// CSV body in, wholesale catalog replacement.
pub async fn inventory_upload(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
    body: String,
) -> Response {
    let user = resolve_user(&q);
    let items = match service::parse_inventory_csv(&body) {
        Ok(items) => items,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.kind(), e.to_string()),
    };
    match db::replace_inventory(&state.pool, &user, &items).await {
        Ok(imported) => Json(InventoryUploadResponse {
            user_id: user,
            imported,
        })
        .into_response(),
        Err(e) => internal_error(e),
    }
}

// ----------------- Matching -----------------

#[derive(Debug, Deserialize, Serialize)]
pub struct MatchRequest {
    pub required_items: Vec<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

pub async fn match_items(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
    Json(req): Json<MatchRequest>,
) -> Response {
    let user = resolve_user(&q);
    let job_id = match db::create_job(
        &state.pool,
        &user,
        "match_inventory",
        json_snapshot(&req).as_deref(),
    )
    .await
    {
        Ok(id) => id,
        Err(e) => return internal_error(e),
    };

    let (company, inventory) = match load_context(&state.pool, &user).await {
        Ok(ctx) => ctx,
        Err(e) => {
            close_job(&state.pool, job_id, JobStatus::Failed, None, Some(&e)).await;
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", e);
        }
    };

    let boost = company.boost_keywords();
    let results: Vec<MatchResult> = service::match_inventory(
        &req.required_items,
        &inventory,
        req.top_k.unwrap_or(service::DEFAULT_TOP_K),
        (!boost.is_empty()).then_some(boost.as_slice()),
    );

    close_job(
        &state.pool,
        job_id,
        JobStatus::Done,
        json_snapshot(&results).as_deref(),
        None,
    )
    .await;
    Json(results).into_response()
}

// ----------------- Compatibility / decision -----------------

#[derive(Debug, Deserialize, Serialize)]
pub struct CompatibilityRequest {
    pub items: Vec<RequiredItem>,
    #[serde(default)]
    pub min_score: Option<f64>,
}

pub async fn compatibility_check(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
    Json(req): Json<CompatibilityRequest>,
) -> Response {
    let user = resolve_user(&q);
    let job_id = match db::create_job(
        &state.pool,
        &user,
        "inventory_compatibility",
        json_snapshot(&req).as_deref(),
    )
    .await
    {
        Ok(id) => id,
        Err(e) => return internal_error(e),
    };

    let (company, inventory) = match load_context(&state.pool, &user).await {
        Ok(ctx) => ctx,
        Err(e) => {
            close_job(&state.pool, job_id, JobStatus::Failed, None, Some(&e)).await;
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", e);
        }
    };

    let boost = company.boost_keywords();
    let report = service::inventory_compatibility(
        &req.items,
        &inventory,
        req.min_score.unwrap_or(service::DEFAULT_MIN_SCORE),
        (!boost.is_empty()).then_some(boost.as_slice()),
    );

    close_job(
        &state.pool,
        job_id,
        JobStatus::Done,
        json_snapshot(&report).as_deref(),
        None,
    )
    .await;
    Json(report).into_response()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DecisionRequest {
    pub items: Vec<RequiredItem>,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub decision: Decision,
    #[serde(flatten)]
    pub report: CompatibilityReport,
}

/// Fast-track go/no-go: coverage score mapped to APTA / EVALUAR / DESCARTAR.
pub async fn fast_track_decision(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
    Json(req): Json<DecisionRequest>,
) -> Response {
    let user = resolve_user(&q);
    let job_id = match db::create_job(
        &state.pool,
        &user,
        "compra_agil_decision",
        json_snapshot(&req).as_deref(),
    )
    .await
    {
        Ok(id) => id,
        Err(e) => return internal_error(e),
    };

    if req.items.is_empty() {
        close_job(
            &state.pool,
            job_id,
            JobStatus::Failed,
            None,
            Some("ficha sin ítems para evaluar"),
        )
        .await;
        return error_response(
            StatusCode::BAD_REQUEST,
            "PRECONDITION",
            "items requerido".to_string(),
        );
    }

    let (company, inventory) = match load_context(&state.pool, &user).await {
        Ok(ctx) => ctx,
        Err(e) => {
            close_job(&state.pool, job_id, JobStatus::Failed, None, Some(&e)).await;
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", e);
        }
    };

    let boost = company.boost_keywords();
    let report = service::inventory_compatibility(
        &req.items,
        &inventory,
        service::DEFAULT_MIN_SCORE,
        (!boost.is_empty()).then_some(boost.as_slice()),
    );
    let response = DecisionResponse {
        decision: Decision::from_compat_score(report.compat_score),
        report,
    };

    close_job(
        &state.pool,
        job_id,
        JobStatus::Done,
        json_snapshot(&response).as_deref(),
        None,
    )
    .await;
    Json(response).into_response()
}

// ----------------- Opportunity evaluation -----------------

#[derive(Debug, Deserialize, Serialize)]
pub struct EvaluateRequest {
    pub tender: Tender,
    #[serde(default)]
    pub provider_offers: Vec<ProviderOffer>,
    /// Optional pre-computed evaluation from an external reasoning service;
    /// if it does not parse, the deterministic evaluator takes over.
    #[serde(default)]
    pub external_result: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub ok: bool,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub result: TenderEvaluation,
}

pub async fn evaluate_opportunity(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
    Json(req): Json<EvaluateRequest>,
) -> Response {
    let user = resolve_user(&q);
    let job_id = match db::create_job(
        &state.pool,
        &user,
        "automation_evaluate",
        json_snapshot(&req).as_deref(),
    )
    .await
    {
        Ok(id) => id,
        Err(e) => return internal_error(e),
    };

    let (company, inventory) = match load_context(&state.pool, &user).await {
        Ok(ctx) => ctx,
        Err(e) => {
            close_job(&state.pool, job_id, JobStatus::Failed, None, Some(&e)).await;
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR", e);
        }
    };

    let outcome: Outcome<TenderEvaluation> = match req.external_result {
        Some(raw) => match serde_json::from_value::<TenderEvaluation>(raw) {
            Ok(parsed) => Outcome::Clean(parsed),
            Err(e) => Outcome::Degraded {
                value: service::evaluate_tender(
                    &req.tender,
                    &inventory,
                    &company,
                    &req.provider_offers,
                ),
                warning: format!(
                    "No se pudo parsear el resultado externo ({e}); se usó el evaluador local."
                ),
            },
        },
        None => Outcome::Clean(service::evaluate_tender(
            &req.tender,
            &inventory,
            &company,
            &req.provider_offers,
        )),
    };

    if !outcome.value().ok {
        let message = outcome
            .value()
            .error
            .clone()
            .unwrap_or_else(|| "evaluación rechazada".to_string());
        close_job(
            &state.pool,
            job_id,
            JobStatus::Failed,
            json_snapshot(outcome.value()).as_deref(),
            Some(&message),
        )
        .await;
        return Json(EvaluateResponse {
            ok: false,
            status: "ERROR".to_string(),
            warning: None,
            result: outcome.into_value(),
        })
        .into_response();
    }

    let status = outcome.job_status();
    let warning = outcome.warning().map(str::to_string);
    close_job(
        &state.pool,
        job_id,
        status,
        json_snapshot(outcome.value()).as_deref(),
        warning.as_deref(),
    )
    .await;
    Json(EvaluateResponse {
        ok: true,
        status: if warning.is_some() { "DEGRADED" } else { "OK" }.to_string(),
        warning,
        result: outcome.into_value(),
    })
    .into_response()
}

// ----------------- Document analysis -----------------

/// Inputs shorter than this carry no analyzable text (e.g. a scanned page).
const MIN_ANALYZABLE_CHARS: usize = 30;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub extracted_chars: usize,
    #[serde(flatten)]
    pub analysis: DocumentAnalysis,
    pub inventory_matches: Vec<MatchResult>,
}

pub async fn analyze_document_text(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
    Json(req): Json<AnalyzeRequest>,
) -> Response {
    let user = resolve_user(&q);
    let chars = req.text.chars().count();
    let job_id = match db::create_job(
        &state.pool,
        &user,
        "analyze_document",
        json_snapshot(&serde_json::json!({ "chars": chars })).as_deref(),
    )
    .await
    {
        Ok(id) => id,
        Err(e) => return internal_error(e),
    };

    if chars < MIN_ANALYZABLE_CHARS {
        close_job(
            &state.pool,
            job_id,
            JobStatus::Failed,
            None,
            Some("no se pudo extraer texto suficiente del documento"),
        )
        .await;
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "NO_USABLE_INPUT",
            "No se pudo extraer suficiente texto del documento.".to_string(),
        );
    }

    let analysis = service::analyze_document(&req.text);

    let inventory = match db::list_inventory(&state.pool, &user).await {
        Ok(inv) => inv,
        Err(e) => {
            let msg = e.to_string();
            close_job(&state.pool, job_id, JobStatus::Failed, None, Some(&msg)).await;
            return internal_error(msg);
        }
    };
    let inventory_matches = if analysis.required_items.is_empty() {
        Vec::new()
    } else {
        service::match_inventory(
            &analysis.required_items,
            &inventory,
            service::DEFAULT_TOP_K,
            None,
        )
    };

    close_job(
        &state.pool,
        job_id,
        JobStatus::Done,
        json_snapshot(&serde_json::json!({ "summary": analysis.summary })).as_deref(),
        None,
    )
    .await;
    Json(AnalyzeResponse {
        extracted_chars: chars,
        analysis,
        inventory_matches,
    })
    .into_response()
}

// ----------------- Jobs (history) -----------------

#[derive(Debug, Deserialize)]
pub struct JobsQuery {
    pub user_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn jobs_list(State(state): State<AppState>, Query(q): Query<JobsQuery>) -> Response {
    let user = resolve_user(&UserQuery {
        user_id: q.user_id.clone(),
    });
    match db::list_jobs(
        &state.pool,
        &user,
        q.limit.unwrap_or(50),
        q.offset.unwrap_or(0),
    )
    .await
    {
        Ok(jobs) => Json(jobs).into_response(),
        Err(e) => internal_error(e),
    }
}

pub async fn jobs_get(State(state): State<AppState>, Path(job_id): Path<i64>) -> Response {
    match db::get_job(&state.pool, job_id).await {
        Ok(Some(job)) => Json(job).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Job {job_id} no encontrado"),
        ),
        Err(e) => internal_error(e),
    }
}

// ----------------- Assistant -----------------

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub user_id: Option<String>,
    pub chat_id: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
    pub user_id: String,
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_plan: Option<String>,
    pub reply: String,
}

pub async fn assistant_webhook(
    State(state): State<AppState>,
    Json(req): Json<WebhookRequest>,
) -> Response {
    let user = req
        .user_id
        .or(req.chat_id)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "demo".to_string());

    let session = match db::get_or_create_session(&state.pool, &user).await {
        Ok(s) => s,
        Err(e) => return internal_error(e),
    };
    let current = service::Stage::parse(&session.stage).unwrap_or(service::Stage::Idle);
    let routed = service::route_command(&req.text, current);

    let next = routed.stage.unwrap_or(current);
    if let Err(e) = db::save_session(
        &state.pool,
        &user,
        next.as_str(),
        routed.selected_plan.as_deref(),
    )
    .await
    {
        return internal_error(e);
    }

    Json(WebhookResponse {
        ok: true,
        user_id: user,
        stage: next.as_str().to_string(),
        selected_plan: routed.selected_plan.or(session.selected_plan),
        reply: routed.reply,
    })
    .into_response()
}

// ----------------- Shared -----------------

/// Company profile (empty default) + inventory for a user.
async fn load_context(
    pool: &PgPool,
    user: &str,
) -> Result<(CompanyProfile, Vec<crate::models::InventoryItem>), String> {
    let company = db::get_company(pool, user)
        .await
        .map_err(|e| e.to_string())?
        .unwrap_or_else(|| CompanyProfile::empty(user));
    let inventory = db::list_inventory(pool, user)
        .await
        .map_err(|e| e.to_string())?;
    Ok((company, inventory))
}
