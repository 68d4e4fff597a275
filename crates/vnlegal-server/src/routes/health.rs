//! Health and storage statistics.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::error::{blocking, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(get_stats))
}

/// GET /api/health
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let llm = state.llm();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "llmAvailable": llm.is_available(),
        "llmBackend": llm.name(),
        "splitter": state.config.splitter,
    }))
}

/// GET /api/stats
async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let stats = blocking(move || state.store.get_stats()).await?;
    Ok(Json(json!({
        "documents": stats.total_documents,
        "processedDocuments": stats.processed_documents,
        "blocks": stats.total_blocks,
        "dbSizeMb": stats.db_size_mb,
    })))
}
