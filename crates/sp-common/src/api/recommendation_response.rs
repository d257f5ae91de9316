use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::recommendation_request::{PairScoreRequest, RecommendationRequest, RequestError};
use crate::{
    matching::{
        ClientRecommendations, PairingConfig, PairingEngine, RankingConfig, rank_all,
        ranking::{FactorBreakdown, FactorDetails},
        review::run_review_checks,
        weights::FactorWeights,
    },
    run_id,
};

pub const ENGINE_VERSION: &str = concat!("smart-pairing-", env!("CARGO_PKG_VERSION"));

/// Ranked therapists for every requested client, plus run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub engine_version: String,
    /// Fingerprint of the pairing config that produced the scores.
    pub config_version: String,
    pub results: Vec<ClientRecommendations>,
}

impl RecommendationResponse {
    /// Validate the request, rank, and stamp the result with a fresh run id.
    pub fn build(
        request: &RecommendationRequest,
        base_pairing: &PairingConfig,
        base_ranking: &RankingConfig,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, RequestError> {
        request.validate()?;
        let pairing = request.pairing_config(base_pairing)?;
        let ranking = request.ranking_config(base_ranking);
        let config_version = pairing.fingerprint();
        let engine = PairingEngine::new(pairing)?;

        let clients: Vec<_> = request.selected_clients().into_iter().cloned().collect();
        let results = rank_all(&engine, &clients, &request.therapists, &ranking);

        Ok(Self {
            run_id: run_id::generate(),
            generated_at,
            engine_version: ENGINE_VERSION.to_string(),
            config_version,
            results,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairScoreResponse {
    pub client_id: i64,
    pub therapist_id: i64,
    /// 0〜100
    pub score: f64,
    pub applied_weights: FactorWeights,
    pub breakdown: FactorBreakdown,
    pub details: FactorDetails,
    pub needs_review: bool,
    pub review_reasons: Vec<String>,
    pub config_version: String,
}

impl PairScoreResponse {
    pub fn build(request: &PairScoreRequest, base: &PairingConfig) -> Result<Self, RequestError> {
        let pairing = request.pairing_config(base)?;
        let config_version = pairing.fingerprint();
        let target_slots = pairing.availability_target_slots;
        let engine = PairingEngine::new(pairing)?;

        let score = engine.score_pair(&request.client, &request.therapist);
        let review = run_review_checks(&request.client, &request.therapist, target_slots);

        Ok(Self {
            client_id: request.client.id,
            therapist_id: request.therapist.id,
            score: score.total,
            applied_weights: score.applied_weights,
            breakdown: FactorBreakdown::from(&score),
            details: FactorDetails::from(&score),
            needs_review: review.needs_review,
            review_reasons: review.reasons(),
            config_version,
        })
    }
}
