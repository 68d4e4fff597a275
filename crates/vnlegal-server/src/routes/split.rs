//! Stateless splitting of posted text.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{blocking, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/split", post(split))
}

#[derive(Debug, Deserialize)]
pub struct SplitRequest {
    pub text: String,
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_filename() -> String {
    "document.txt".into()
}

/// POST /api/split: split text without storing anything.
async fn split(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SplitRequest>,
) -> ApiResult<Json<Value>> {
    let splitter = state.splitter();
    let output = blocking(move || Ok(splitter.split_to_markdown(&req.text, &req.filename))).await?;
    Ok(Json(json!({
        "title": output.title,
        "keyword": output.keyword,
        "total": output.blocks.len(),
        "blocks": output.blocks,
        "markdown": output.markdown,
    })))
}
