use std::time::Instant;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::Utc;
use sp_common::api::{
    PairScoreRequest, PairScoreResponse, RecommendationRequest, RecommendationResponse,
};
use tracing::info;

use crate::SharedState;
use crate::auth::AdminUser;
use crate::error::ApiError;

fn rejected(err: ApiError) -> ApiError {
    sp_metrics::record_pairing_rejected(err.code());
    err
}

/// Rank therapists for every requested client.
///
/// Scoring is CPU bound, so the batch runs on the blocking pool.
pub async fn recommend(
    State(state): State<SharedState>,
    auth: AdminUser,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let Json(request) = payload.map_err(|err| rejected(err.into()))?;
    let started = Instant::now();
    let therapists = request.therapists.len();
    let pairing = state.pairing.clone();
    let ranking = state.ranking.clone();

    let response = tokio::task::spawn_blocking(move || {
        RecommendationResponse::build(&request, &pairing, &ranking, Utc::now())
    })
    .await
    .map_err(|err| rejected(ApiError::Internal(format!("pairing task failed: {err}"))))?
    .map_err(|err| rejected(err.into()))?;

    let elapsed = started.elapsed();
    sp_metrics::record_pairing_run("api", response.results.len(), therapists, elapsed);

    info!(
        subject = %auth.subject,
        run_id = %response.run_id,
        clients = response.results.len(),
        therapists,
        config_version = %response.config_version,
        elapsed_ms = elapsed.as_millis() as u64,
        "smart pairing run completed"
    );

    Ok(Json(response))
}

/// Full factor breakdown for a single client/therapist pair.
pub async fn score_pair(
    State(state): State<SharedState>,
    _auth: AdminUser,
    payload: Result<Json<PairScoreRequest>, JsonRejection>,
) -> Result<Json<PairScoreResponse>, ApiError> {
    let Json(request) = payload.map_err(|err| rejected(err.into()))?;
    let response =
        PairScoreResponse::build(&request, &state.pairing).map_err(|err| rejected(err.into()))?;
    Ok(Json(response))
}
