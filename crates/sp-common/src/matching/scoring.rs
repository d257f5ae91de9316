use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::{
    factors::{
        FactorScore, score_availability, score_concern_match, score_distance, score_experience,
        score_gender, score_language, score_specialization, score_success_rate,
    },
    weights::{DEFAULT_WEIGHTS, FactorWeights, WeightsError},
};
use crate::{ClientProfile, TherapistProfile};

pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Error, PartialEq)]
pub enum PairingConfigError {
    #[error(transparent)]
    Weights(#[from] WeightsError),
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name}={value:?} is not a valid number")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingConfig {
    pub weights: FactorWeights,
    /// Open slots at which availability scores 1.0.
    pub availability_target_slots: u32,
    /// Years of experience at which experience scores 1.0.
    pub experience_target_years: f64,
    /// Distance at which the distance factor halves.
    pub distance_half_life_km: f64,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            availability_target_slots: 5,
            experience_target_years: 10.0,
            distance_half_life_km: 15.0,
        }
    }
}

impl PairingConfig {
    /// Defaults with `SP_*` environment overrides applied.
    ///
    /// A set but unparsable or non-positive target is an error, so a typo
    /// stops start-up instead of silently running on defaults.
    pub fn from_env() -> Result<Self, PairingConfigError> {
        let defaults = Self::default();
        let config = Self {
            weights: FactorWeights::from_env(),
            availability_target_slots: env_override("SP_AVAILABILITY_TARGET_SLOTS")?
                .unwrap_or(defaults.availability_target_slots),
            experience_target_years: env_override("SP_EXPERIENCE_TARGET_YEARS")?
                .unwrap_or(defaults.experience_target_years),
            distance_half_life_km: env_override("SP_DISTANCE_HALF_LIFE_KM")?
                .unwrap_or(defaults.distance_half_life_km),
        };
        config.validate()?;
        Ok(config)
    }

    /// Same config with other weights, normalised.
    pub fn with_weights(&self, weights: FactorWeights) -> Result<Self, PairingConfigError> {
        Ok(Self {
            weights: weights.normalized()?,
            ..self.clone()
        })
    }

    pub fn validate(&self) -> Result<(), PairingConfigError> {
        self.weights.normalized()?;
        if self.availability_target_slots == 0 {
            return Err(PairingConfigError::NonPositive {
                name: "availability_target_slots",
                value: 0.0,
            });
        }
        for (name, value) in [
            ("experience_target_years", self.experience_target_years),
            ("distance_half_life_km", self.distance_half_life_km),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PairingConfigError::NonPositive { name, value });
            }
        }
        Ok(())
    }

    /// Short hash of the effective config, reported as `config_version`.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let bytes = hasher.finalize();
        let mut hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        hex.truncate(16);
        hex
    }
}

fn env_override<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, PairingConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| PairingConfigError::InvalidEnv { name, value: raw }),
        Err(_) => Ok(None),
    }
}

/// Per-factor results for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorResults {
    pub availability: FactorScore,
    pub concern_match: FactorScore,
    pub specialization: FactorScore,
    pub experience: FactorScore,
    pub success_rate: FactorScore,
    pub distance: FactorScore,
    pub language: FactorScore,
    pub gender: FactorScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    /// 0〜100
    pub total: f64,
    /// Weights actually applied (after the urgency adjustment).
    pub applied_weights: FactorWeights,
    pub factors: FactorResults,
}

pub struct PairingEngine {
    config: PairingConfig,
    /// Normalised once at construction.
    weights: FactorWeights,
}

impl Default for PairingEngine {
    fn default() -> Self {
        Self {
            config: PairingConfig::default(),
            weights: DEFAULT_WEIGHTS,
        }
    }
}

impl PairingEngine {
    /// Validate the config and build an engine for it.
    pub fn new(config: PairingConfig) -> Result<Self, PairingConfigError> {
        config.validate()?;
        let weights = config.weights.normalized()?;
        Ok(Self { config, weights })
    }

    pub fn config(&self) -> &PairingConfig {
        &self.config
    }

    /// Weighted 0–100 score for a client/therapist pair.
    pub fn score_pair(&self, client: &ClientProfile, therapist: &TherapistProfile) -> MatchScore {
        let config = &self.config;
        let factors = FactorResults {
            availability: score_availability(therapist, config.availability_target_slots),
            concern_match: score_concern_match(client, therapist),
            specialization: score_specialization(client, therapist),
            experience: score_experience(therapist, config.experience_target_years),
            success_rate: score_success_rate(therapist),
            distance: score_distance(client, therapist, config.distance_half_life_km),
            language: score_language(client, therapist),
            gender: score_gender(client, therapist),
        };

        let weights = self.weights.for_urgency(client.urgency);

        let weighted = factors.availability.score * weights.availability
            + factors.concern_match.score * weights.concern_match
            + factors.specialization.score * weights.specialization
            + factors.experience.score * weights.experience
            + factors.success_rate.score * weights.success_rate
            + factors.distance.score * weights.distance
            + factors.language.score * weights.language
            + factors.gender.score * weights.gender;

        let total = if weighted.is_finite() {
            (weighted * MAX_SCORE).clamp(0.0, MAX_SCORE)
        } else {
            0.0
        };

        MatchScore {
            total,
            applied_weights: weights,
            factors,
        }
    }
}
