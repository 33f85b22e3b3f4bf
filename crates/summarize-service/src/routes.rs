use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use summarizer_core::{HealthResponse, Mode, SummarizeRequest, SummarizeResponse};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        mode: state.engine.mode().to_string(),
        model: Some(state.model.clone()),
    })
}

pub async fn sample_dataset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], state.dataset.clone())
}

/// Analyze every submitted host concurrently; results keep request order.
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let Json(request) = payload?;
    if request.hosts.is_empty() {
        return Err(ApiError::BadRequest("No hosts provided".into()));
    }

    let total = request.hosts.len();
    let mode = state.engine.mode();
    info!(hosts = total, mode = %mode, "analyzing hosts");

    let mut handles = Vec::with_capacity(total);
    for host in request.hosts {
        let engine = state.engine.clone();
        handles.push(tokio::spawn(async move { engine.analyze(&host).await }));
    }
    let mut items = Vec::with_capacity(total);
    for h in handles {
        match h.await {
            Ok(summary) => items.push(summary),
            Err(e) => warn!(error = %e, "host analysis task failed"),
        }
    }

    info!(succeeded = items.len(), failed = total - items.len(), "analysis complete");
    if mode == Mode::Ai && !items.is_empty() {
        let risks: usize = items.iter().map(|s| s.risks.len()).sum();
        let avg = risks as f64 / items.len() as f64;
        info!(avg_risks = format!("{avg:.1}"), "AI risk density");
    }
    Ok(Json(SummarizeResponse { items }))
}
