use axum::{Json, extract::State};
use serde::Serialize;
use sp_common::api::ENGINE_VERSION;
use sp_common::matching::{FactorWeights, PairingConfig};

use crate::SharedState;
use crate::auth::AdminUser;

#[derive(Debug, Serialize)]
pub struct PairingConfigView {
    pub engine_version: &'static str,
    pub config_version: String,
    pub weights: FactorWeights,
    pub availability_target_slots: u32,
    pub experience_target_years: f64,
    pub distance_half_life_km: f64,
    pub max_results: Option<usize>,
    pub strong_match_threshold: f64,
}

impl PairingConfigView {
    fn new(pairing: &PairingConfig, max_results: Option<usize>, strong_match_threshold: f64) -> Self {
        Self {
            engine_version: ENGINE_VERSION,
            config_version: pairing.fingerprint(),
            weights: pairing.weights.normalized().unwrap_or(pairing.weights),
            availability_target_slots: pairing.availability_target_slots,
            experience_target_years: pairing.experience_target_years,
            distance_half_life_km: pairing.distance_half_life_km,
            max_results,
            strong_match_threshold,
        }
    }
}

pub async fn get_config(
    State(state): State<SharedState>,
    _auth: AdminUser,
) -> Json<PairingConfigView> {
    Json(PairingConfigView::new(
        &state.pairing,
        state.ranking.max_results,
        state.ranking.strong_match_threshold,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_reports_normalised_weights() {
        let pairing = PairingConfig {
            weights: FactorWeights {
                availability: 2.0,
                concern_match: 2.0,
                specialization: 0.0,
                experience: 0.0,
                success_rate: 0.0,
                distance: 0.0,
                language: 0.0,
                gender: 0.0,
            },
            ..PairingConfig::default()
        };

        let view = PairingConfigView::new(&pairing, Some(10), 70.0);
        assert!((view.weights.availability - 0.5).abs() < 1e-9);
        assert!(view.weights.is_normalized());
        assert_eq!(view.config_version, pairing.fingerprint());
        assert_eq!(view.max_results, Some(10));
    }
}
