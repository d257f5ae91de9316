use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::{
    ClientProfile, TherapistProfile,
    matching::{FactorWeights, PairingConfig, PairingConfigError, RankingConfig},
};

pub use crate::matching::ranking::MAX_RESULTS_LIMIT as MAX_LIMIT;

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("duplicate therapist id {0}")]
    DuplicateTherapist(i64),
    #[error("duplicate client id {0}")]
    DuplicateClient(i64),
    #[error("unknown client ids requested: {0:?}")]
    UnknownClients(Vec<i64>),
    #[error("min_score must be between 0 and 100, got {0}")]
    InvalidMinScore(f64),
    #[error("invalid weights: {0}")]
    InvalidWeights(#[from] PairingConfigError),
}

/// Batch pairing request from the admin UI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub clients: Vec<ClientProfile>,
    #[serde(default)]
    pub therapists: Vec<TherapistProfile>,
    /// Only rank these clients (all when absent).
    #[serde(default)]
    pub client_ids: Option<Vec<i64>>,
    /// Recommendations per client.
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub min_score: Option<f64>,
    /// Per-request weight override, normalised before use.
    #[serde(default)]
    pub weights: Option<FactorWeights>,
}

/// Single client/therapist breakdown request.
#[derive(Debug, Clone, Deserialize)]
pub struct PairScoreRequest {
    pub client: ClientProfile,
    pub therapist: TherapistProfile,
    #[serde(default)]
    pub weights: Option<FactorWeights>,
}

fn first_duplicate(ids: impl IntoIterator<Item = i64>) -> Option<i64> {
    let mut seen = HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}

impl RecommendationRequest {
    /// Ids must be unique so tie-breaking by id stays deterministic.
    pub fn validate(&self) -> Result<(), RequestError> {
        if let Some(id) = first_duplicate(self.therapists.iter().map(|t| t.id)) {
            return Err(RequestError::DuplicateTherapist(id));
        }
        if let Some(id) = first_duplicate(self.clients.iter().map(|c| c.id)) {
            return Err(RequestError::DuplicateClient(id));
        }

        if let Some(ids) = &self.client_ids {
            let known: HashSet<i64> = self.clients.iter().map(|c| c.id).collect();
            let mut unknown: Vec<i64> = ids.iter().copied().filter(|id| !known.contains(id)).collect();
            if !unknown.is_empty() {
                unknown.sort_unstable();
                unknown.dedup();
                return Err(RequestError::UnknownClients(unknown));
            }
        }

        if let Some(min) = self.min_score {
            if !min.is_finite() || !(0.0..=100.0).contains(&min) {
                return Err(RequestError::InvalidMinScore(min));
            }
        }

        Ok(())
    }

    /// Clients to rank, in request order.
    pub fn selected_clients(&self) -> Vec<&ClientProfile> {
        match &self.client_ids {
            Some(ids) => {
                let wanted: HashSet<i64> = ids.iter().copied().collect();
                self.clients
                    .iter()
                    .filter(|c| wanted.contains(&c.id))
                    .collect()
            }
            None => self.clients.iter().collect(),
        }
    }

    pub fn pairing_config(&self, base: &PairingConfig) -> Result<PairingConfig, RequestError> {
        resolve_pairing_config(base, self.weights)
    }

    pub fn ranking_config(&self, base: &RankingConfig) -> RankingConfig {
        RankingConfig {
            max_results: self
                .limit
                .map(|limit| limit.clamp(1, MAX_LIMIT))
                .or(base.max_results),
            min_score: self.min_score.unwrap_or(base.min_score),
            strong_match_threshold: base.strong_match_threshold,
        }
    }
}

impl PairScoreRequest {
    pub fn pairing_config(&self, base: &PairingConfig) -> Result<PairingConfig, RequestError> {
        resolve_pairing_config(base, self.weights)
    }
}

fn resolve_pairing_config(
    base: &PairingConfig,
    weights: Option<FactorWeights>,
) -> Result<PairingConfig, RequestError> {
    match weights {
        Some(weights) => Ok(base.with_weights(weights)?),
        None => Ok(base.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RecommendationRequest {
        serde_json::from_str(
            r#"{
                "clients": [{"id": 1, "concerns": ["angst"]}, {"id": 2}],
                "therapists": [{"id": 10}, {"id": 11}],
                "limit": 500
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_and_validates_minimal_request() {
        let req = request();
        assert!(req.validate().is_ok());
        assert_eq!(req.selected_clients().len(), 2);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut req = request();
        req.therapists.push(TherapistProfile {
            id: 10,
            ..TherapistProfile::default()
        });
        assert_eq!(req.validate(), Err(RequestError::DuplicateTherapist(10)));
    }

    #[test]
    fn filters_clients_and_reports_unknown_ids() {
        let mut req = request();
        req.client_ids = Some(vec![2]);
        assert!(req.validate().is_ok());
        let selected = req.selected_clients();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, 2);

        req.client_ids = Some(vec![9, 2, 9]);
        assert_eq!(req.validate(), Err(RequestError::UnknownClients(vec![9])));
    }

    #[test]
    fn rejects_out_of_range_min_score() {
        let mut req = request();
        req.min_score = Some(120.0);
        assert_eq!(req.validate(), Err(RequestError::InvalidMinScore(120.0)));
    }

    #[test]
    fn ranking_config_clamps_limit() {
        let ranking = request().ranking_config(&RankingConfig::default());
        assert_eq!(ranking.max_results, Some(MAX_LIMIT));
        assert_eq!(ranking.min_score, 0.0);
    }

    #[test]
    fn weight_override_is_normalised_or_rejected() {
        let mut req = request();
        req.weights = Some(FactorWeights {
            availability: 1.0,
            concern_match: 1.0,
            specialization: 1.0,
            experience: 1.0,
            success_rate: 0.0,
            distance: 0.0,
            language: 0.0,
            gender: 0.0,
        });
        let config = req.pairing_config(&PairingConfig::default()).unwrap();
        assert!((config.weights.availability - 0.25).abs() < 1e-12);

        req.weights = Some(FactorWeights {
            language: -1.0,
            ..FactorWeights::default()
        });
        assert!(matches!(
            req.pairing_config(&PairingConfig::default()),
            Err(RequestError::InvalidWeights(_))
        ));
    }
}
