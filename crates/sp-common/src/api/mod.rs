pub mod recommendation_request;
pub mod recommendation_response;

pub use recommendation_request::{PairScoreRequest, RecommendationRequest, RequestError};
pub use recommendation_response::{ENGINE_VERSION, PairScoreResponse, RecommendationResponse};
