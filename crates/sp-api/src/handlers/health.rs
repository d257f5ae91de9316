use axum::{Json, extract::State};
use serde_json::json;

use crate::SharedState;
use crate::error::ApiError;

pub async fn livez() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// The engine is stateless, so readiness only reflects the shutdown flag
/// and a usable pairing config.
pub async fn readyz(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.readiness.load(std::sync::atomic::Ordering::SeqCst) {
        return Err(ApiError::ServiceUnavailable("shutting_down".into()));
    }

    state
        .pairing
        .validate()
        .map_err(|err| ApiError::ServiceUnavailable(format!("pairing_config: {err}")))?;

    Ok(Json(json!({
        "status": "ok",
        "pairing_config": state.pairing.fingerprint(),
        "application": env!("CARGO_PKG_NAME"),
        "run_id": sp_common::run_id::get(),
    })))
}
