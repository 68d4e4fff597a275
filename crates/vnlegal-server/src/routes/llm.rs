//! LLM provider configuration.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::info;
use vnlegal_llm::{providers, LLMConfigResponse, LLMConfigUpdate, TestKeyRequest};

use crate::error::{blocking, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/llm/config", get(get_config).put(update_config))
        .route("/llm/test-key", post(test_key))
}

/// GET /api/llm/config: keys are reported as configured or not, never returned.
async fn get_config(State(state): State<Arc<AppState>>) -> Json<LLMConfigResponse> {
    Json(state.llm_config.read().to_response())
}

/// PUT /api/llm/config: merge, persist, and swap in the new capability.
async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<LLMConfigUpdate>,
) -> ApiResult<Json<LLMConfigResponse>> {
    let response = blocking(move || {
        let response = {
            let mut config = state.llm_config.write();
            let mut next = config.clone();
            next.apply_update(&update)?;
            next.save()?;
            *config = next;
            config.to_response()
        };
        state.reload_llm();
        info!("LLM config updated, active provider: {:?}", response.active_provider);
        Ok(response)
    })
    .await?;
    Ok(Json(response))
}

/// POST /api/llm/test-key
async fn test_key(Json(req): Json<TestKeyRequest>) -> ApiResult<Json<Value>> {
    let result = blocking(move || Ok(providers::test_api_key(&req.provider, &req.api_key))).await?;
    Ok(Json(match result {
        Ok(()) => json!({ "success": true }),
        Err(e) => json!({ "success": false, "error": e }),
    }))
}
