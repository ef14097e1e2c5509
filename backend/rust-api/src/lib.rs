use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    // The frontend is served separately, so the API allows cross-origin
    // reads and submissions.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any); // TODO: restrict to the frontend origin in production

    Router::new()
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        .nest("/api/v1/trivia", trivia_routes())
        .with_state(app_state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn trivia_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/daily", get(handlers::trivia::get_daily_trivia))
        .route("/daily/answers", post(handlers::trivia::submit_answer))
        .route("/daily/reset", post(handlers::trivia::reset_progress))
        .route("/daily/stats", get(handlers::trivia::get_progress_stats))
        .route("/unlimited", get(handlers::trivia::get_unlimited_batch))
}
