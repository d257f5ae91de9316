use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    distance::resolve_distance_km,
    review::run_review_checks,
    scoring::{MAX_SCORE, MatchScore, PairingEngine},
};
use crate::{ClientProfile, TherapistProfile, tags::normalize_tags_vec};

/// Upper bound on recommendations returned per client.
pub const MAX_RESULTS_LIMIT: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    /// Maximum recommendations per client (`None` = all therapists).
    pub max_results: Option<usize>,
    /// Recommendations scoring below this are left out (0〜100).
    pub min_score: f64,
    /// Score at or above which a pairing counts as a strong match.
    pub strong_match_threshold: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_results: None,
            min_score: 0.0,
            strong_match_threshold: 70.0,
        }
    }
}

impl RankingConfig {
    /// `SP_MAX_RESULTS` is clamped to 1..=[`MAX_RESULTS_LIMIT`] and
    /// `SP_STRONG_MATCH_THRESHOLD` to 0..=100, like request input.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_results: std::env::var("SP_MAX_RESULTS")
                .ok()
                .and_then(|s| s.trim().parse::<usize>().ok())
                .map(|v| v.clamp(1, MAX_RESULTS_LIMIT)),
            min_score: defaults.min_score,
            strong_match_threshold: std::env::var("SP_STRONG_MATCH_THRESHOLD")
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .map(|v| v.clamp(0.0, MAX_SCORE))
                .unwrap_or(defaults.strong_match_threshold),
        }
    }
}

/// Numeric per-factor sub-scores (0.0〜1.0).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub availability: f64,
    pub concern_match: f64,
    pub specialization: f64,
    pub experience: f64,
    pub success_rate: f64,
    pub distance: f64,
    pub language: f64,
    pub gender: f64,
}

/// Human-readable explanation per factor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorDetails {
    pub availability: String,
    pub concern_match: String,
    pub specialization: String,
    pub experience: String,
    pub success_rate: String,
    pub distance: String,
    pub language: String,
    pub gender: String,
}

impl From<&MatchScore> for FactorBreakdown {
    fn from(value: &MatchScore) -> Self {
        let f = &value.factors;
        Self {
            availability: f.availability.score,
            concern_match: f.concern_match.score,
            specialization: f.specialization.score,
            experience: f.experience.score,
            success_rate: f.success_rate.score,
            distance: f.distance.score,
            language: f.language.score,
            gender: f.gender.score,
        }
    }
}

impl From<&MatchScore> for FactorDetails {
    fn from(value: &MatchScore) -> Self {
        let f = &value.factors;
        Self {
            availability: f.availability.details.clone(),
            concern_match: f.concern_match.details.clone(),
            specialization: f.specialization.details.clone(),
            experience: f.experience.details.clone(),
            success_rate: f.success_rate.details.clone(),
            distance: f.distance.details.clone(),
            language: f.language.details.clone(),
            gender: f.gender.details.clone(),
        }
    }
}

/// What the admin sees about the therapist next to the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapistSnapshot {
    pub specializations: Vec<String>,
    pub expertise: Vec<String>,
    pub available_slots: u32,
    pub languages: Vec<String>,
    pub experience_years: Option<f64>,
    pub success_rate: Option<f64>,
    pub distance_km: Option<f64>,
}

impl TherapistSnapshot {
    fn capture(client: &ClientProfile, therapist: &TherapistProfile) -> Self {
        Self {
            specializations: normalize_tags_vec(&therapist.specializations),
            expertise: normalize_tags_vec(&therapist.expertise),
            available_slots: therapist.available_slots,
            languages: therapist.languages.clone(),
            experience_years: therapist.experience_years,
            success_rate: therapist.success_rate,
            distance_km: resolve_distance_km(client, therapist),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub therapist_id: i64,
    pub therapist_name: String,
    /// 0〜100
    pub score: f64,
    pub strong_match: bool,
    pub factors: FactorBreakdown,
    pub details: FactorDetails,
    pub snapshot: TherapistSnapshot,
    pub needs_review: bool,
    pub review_reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecommendations {
    pub client_id: i64,
    pub client_name: String,
    pub recommendations: Vec<Recommendation>,
}

/// Descending by score, ties by ascending therapist id.
fn compare_recommendations(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.therapist_id.cmp(&b.therapist_id))
}

fn build_recommendation(
    engine: &PairingEngine,
    client: &ClientProfile,
    therapist: &TherapistProfile,
    ranking: &RankingConfig,
) -> Recommendation {
    let score = engine.score_pair(client, therapist);
    let review = run_review_checks(
        client,
        therapist,
        engine.config().availability_target_slots,
    );

    Recommendation {
        therapist_id: therapist.id,
        therapist_name: therapist.name.clone(),
        score: score.total,
        strong_match: score.total >= ranking.strong_match_threshold && !review.needs_review,
        factors: FactorBreakdown::from(&score),
        details: FactorDetails::from(&score),
        snapshot: TherapistSnapshot::capture(client, therapist),
        needs_review: review.needs_review,
        review_reasons: review.reasons(),
    }
}

/// Score every therapist for one client and rank them.
pub fn rank_therapists(
    engine: &PairingEngine,
    client: &ClientProfile,
    therapists: &[TherapistProfile],
    ranking: &RankingConfig,
) -> Vec<Recommendation> {
    let mut ranked: Vec<_> = therapists
        .iter()
        .map(|therapist| build_recommendation(engine, client, therapist, ranking))
        .filter(|rec| rec.score >= ranking.min_score)
        .collect();

    ranked.sort_by(compare_recommendations);
    if let Some(max) = ranking.max_results {
        ranked.truncate(max);
    }

    debug!(
        client_id = client.id,
        therapists = therapists.len(),
        returned = ranked.len(),
        "ranked therapists for client"
    );

    ranked
}

/// Rank therapists for every client, in client input order.
pub fn rank_all(
    engine: &PairingEngine,
    clients: &[ClientProfile],
    therapists: &[TherapistProfile],
    ranking: &RankingConfig,
) -> Vec<ClientRecommendations> {
    clients
        .iter()
        .map(|client| ClientRecommendations {
            client_id: client.id,
            client_name: client.name.clone(),
            recommendations: rank_therapists(engine, client, therapists, ranking),
        })
        .collect()
}
