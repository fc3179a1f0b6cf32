use axum::{
    routing::{get, post},
    Router,
};
use tender_match_rust::{api, api::AppState, create_pool, db, AppConfig};
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local-time log format
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    let pool = create_pool(&config.database.url).await?;
    info!("Database pool created");

    db::init_schema(&pool).await?;
    info!("Schema ready");

    let state = AppState { pool };

    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/company", get(api::company_get).post(api::company_set))
        .route("/api/inventory", get(api::inventory_list))
        .route("/api/inventory/upload", post(api::inventory_upload))
        .route("/api/match", post(api::match_items))
        .route("/api/compatibility", post(api::compatibility_check))
        .route("/api/decision", post(api::fast_track_decision))
        .route("/api/evaluate", post(api::evaluate_opportunity))
        .route("/api/analyze", post(api::analyze_document_text))
        .route("/api/jobs", get(api::jobs_list))
        .route("/api/jobs/:job_id", get(api::jobs_get))
        .route("/api/assistant/webhook", post(api::assistant_webhook))
        .layer(ServiceBuilder::new())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/match         - rank inventory against required items");
    info!("  POST /api/compatibility - coverage score for a tender");
    info!("  POST /api/evaluate      - priced bidding plans");
    info!("  POST /api/analyze       - heuristic document analysis");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
