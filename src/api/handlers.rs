use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;
use std::time::Instant;

use crate::pipeline::FactChecker;
use crate::report::Report;

use super::models::AnalyzeRequest;

pub async fn analyze_handler(
    State(checker): State<Arc<FactChecker>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Report>, (StatusCode, String)> {
    let start = Instant::now();

    let claim = request.text.trim();
    if claim.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Text cannot be empty".to_string()));
    }

    let outcome = checker.run(claim).await;
    let report = Report::from_outcome(claim, &outcome);

    tracing::info!(
        verdict = %report.verdict,
        processing_time_ms = start.elapsed().as_millis() as u64,
        "analyze request served"
    );
    Ok(Json(report))
}

pub async fn health_handler() -> &'static str {
    "ok"
}
