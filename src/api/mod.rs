use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::pipeline::FactChecker;

pub mod handlers;
pub mod models;

pub fn create_router(checker: Arc<FactChecker>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/analyze", post(handlers::analyze_handler))
        .route("/api/health", get(handlers::health_handler))
        .with_state(checker)
        .layer(cors)
}
