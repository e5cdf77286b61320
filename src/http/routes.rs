use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Speech-to-text proxy
        .route("/api/transcribe", post(handlers::transcribe))
        // Analysis agents
        .route("/api/agents/mood", post(handlers::analyze_mood))
        .route("/api/agents/sentiment", post(handlers::analyze_sentiment))
        .route("/api/agents/summary", post(handlers::analyze_summary))
        // Payment placeholders
        .route("/api/stripe/create-checkout", post(handlers::create_checkout))
        .route("/api/stripe/webhook", post(handlers::stripe_webhook))
        // Request logging + browser-origin access
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
