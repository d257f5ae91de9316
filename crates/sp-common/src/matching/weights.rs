use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::Urgency;

/// Default pairing weights.
/// Concern match dominates: a therapist who works with the client's
/// hulpvragen matters more than one who is close by.
pub const DEFAULT_WEIGHTS: FactorWeights = FactorWeights {
    availability: 0.15,
    concern_match: 0.30,
    specialization: 0.15,
    experience: 0.10,
    success_rate: 0.10,
    distance: 0.10,
    language: 0.05,
    gender: 0.05,
};

const HIGH_URGENCY_AVAILABILITY_BOOST: f64 = 1.5;
const CRISIS_AVAILABILITY_BOOST: f64 = 2.0;
const SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight {name} must be finite and non-negative, got {value}")]
    InvalidComponent { name: &'static str, value: f64 },
    #[error("weights sum to zero")]
    ZeroSum,
    #[error("weights cannot be rescaled to 1.0 (got {sum})")]
    Unnormalizable { sum: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub availability: f64,
    pub concern_match: f64,
    pub specialization: f64,
    pub experience: f64,
    pub success_rate: f64,
    pub distance: f64,
    pub language: f64,
    pub gender: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl FactorWeights {
    pub fn sum(&self) -> f64 {
        self.components().iter().map(|(_, v)| v).sum()
    }

    fn components(&self) -> [(&'static str, f64); 8] {
        [
            ("availability", self.availability),
            ("concern_match", self.concern_match),
            ("specialization", self.specialization),
            ("experience", self.experience),
            ("success_rate", self.success_rate),
            ("distance", self.distance),
            ("language", self.language),
            ("gender", self.gender),
        ]
    }

    fn divided(&self, divisor: f64) -> Self {
        Self {
            availability: self.availability / divisor,
            concern_match: self.concern_match / divisor,
            specialization: self.specialization / divisor,
            experience: self.experience / divisor,
            success_rate: self.success_rate / divisor,
            distance: self.distance / divisor,
            language: self.language / divisor,
            gender: self.gender / divisor,
        }
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            availability: self.availability * factor,
            concern_match: self.concern_match * factor,
            specialization: self.specialization * factor,
            experience: self.experience * factor,
            success_rate: self.success_rate * factor,
            distance: self.distance * factor,
            language: self.language * factor,
            gender: self.gender * factor,
        }
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= SUM_TOLERANCE
    }

    /// Rescale so the weights sum to 1.0.
    pub fn normalized(&self) -> Result<Self, WeightsError> {
        for (name, value) in self.components() {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::InvalidComponent { name, value });
            }
        }

        // Divide by the largest component first so huge finite weights
        // cannot overflow the sum.
        let largest = self
            .components()
            .iter()
            .map(|(_, v)| *v)
            .fold(0.0_f64, f64::max);
        if largest <= 0.0 {
            return Err(WeightsError::ZeroSum);
        }

        let relative = self.divided(largest);
        let normalized = relative.divided(relative.sum());
        if !normalized.is_normalized() {
            return Err(WeightsError::Unnormalizable { sum: normalized.sum() });
        }
        Ok(normalized)
    }

    /// Urgent clients need someone who can see them soon, so availability
    /// counts for more. The result is renormalised.
    pub fn for_urgency(&self, urgency: Urgency) -> Self {
        let boost = match urgency {
            Urgency::Low | Urgency::Normal => return *self,
            Urgency::High => HIGH_URGENCY_AVAILABILITY_BOOST,
            Urgency::Crisis => CRISIS_AVAILABILITY_BOOST,
        };

        let Ok(base) = self.normalized() else {
            return *self;
        };
        let boosted = Self {
            availability: base.availability * boost,
            ..base
        };
        boosted.normalized().unwrap_or(base)
    }

    /// Weights with `SP_WEIGHT_<FACTOR>` overrides applied, normalised.
    pub fn from_env() -> Self {
        let base = DEFAULT_WEIGHTS;
        let candidate = Self {
            availability: env_weight("SP_WEIGHT_AVAILABILITY").unwrap_or(base.availability),
            concern_match: env_weight("SP_WEIGHT_CONCERN_MATCH").unwrap_or(base.concern_match),
            specialization: env_weight("SP_WEIGHT_SPECIALIZATION").unwrap_or(base.specialization),
            experience: env_weight("SP_WEIGHT_EXPERIENCE").unwrap_or(base.experience),
            success_rate: env_weight("SP_WEIGHT_SUCCESS_RATE").unwrap_or(base.success_rate),
            distance: env_weight("SP_WEIGHT_DISTANCE").unwrap_or(base.distance),
            language: env_weight("SP_WEIGHT_LANGUAGE").unwrap_or(base.language),
            gender: env_weight("SP_WEIGHT_GENDER").unwrap_or(base.gender),
        };

        match candidate.normalized() {
            Ok(weights) => weights,
            Err(err) => {
                warn!(error = %err, "invalid SP_WEIGHT_* overrides; using default weights");
                DEFAULT_WEIGHTS
            }
        }
    }
}

fn env_weight(name: &str) -> Option<f64> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}
