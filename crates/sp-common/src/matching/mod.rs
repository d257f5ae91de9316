pub mod distance;
pub mod factors;
pub mod ranking;
pub mod review;
pub mod scoring;
pub mod weights;

pub use ranking::{ClientRecommendations, RankingConfig, Recommendation, rank_all, rank_therapists};
pub use scoring::{MatchScore, PairingConfig, PairingConfigError, PairingEngine};
pub use weights::{DEFAULT_WEIGHTS, FactorWeights, WeightsError};
