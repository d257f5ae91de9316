use axum::async_trait;
use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use clap::ValueEnum;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::error::ApiError;

/// Role allowed to run smart pairing.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum AuthMode {
    ApiKey,
    Jwt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum JwtAlgorithm {
    Hs256,
    Hs384,
    Hs512,
    Rs256,
    Es256,
    EdDsa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtKeyKind {
    Secret,
    RsaPem,
    EcPem,
    EdPem,
}

impl JwtAlgorithm {
    pub fn key_kind(&self) -> JwtKeyKind {
        match self {
            JwtAlgorithm::Hs256 | JwtAlgorithm::Hs384 | JwtAlgorithm::Hs512 => JwtKeyKind::Secret,
            JwtAlgorithm::Rs256 => JwtKeyKind::RsaPem,
            JwtAlgorithm::Es256 => JwtKeyKind::EcPem,
            JwtAlgorithm::EdDsa => JwtKeyKind::EdPem,
        }
    }

    fn algorithm(&self) -> Algorithm {
        match self {
            JwtAlgorithm::Hs256 => Algorithm::HS256,
            JwtAlgorithm::Hs384 => Algorithm::HS384,
            JwtAlgorithm::Hs512 => Algorithm::HS512,
            JwtAlgorithm::Rs256 => Algorithm::RS256,
            JwtAlgorithm::Es256 => Algorithm::ES256,
            JwtAlgorithm::EdDsa => Algorithm::EdDSA,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub api_key: Option<String>,
    pub jwt_secret: Option<String>,
    pub jwt_public_key: Option<String>,
    pub jwt_algorithm: JwtAlgorithm,
}

/// Authenticated admin caller.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub subject: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

impl Claims {
    fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE) || self.roles.iter().any(|r| r == ADMIN_ROLE)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AuthConfig::from_ref(state);

        match config.mode {
            AuthMode::ApiKey => authorize_api_key(parts, &config),
            AuthMode::Jwt => authorize_jwt(parts, &config),
        }
    }
}

fn authorize_api_key(parts: &Parts, config: &AuthConfig) -> Result<AdminUser, ApiError> {
    let expected = config
        .api_key
        .as_deref()
        .ok_or_else(|| ApiError::Unauthorized("missing SP_API_KEY".into()))?;

    let provided = parts
        .headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing X-API-Key header".into()))?;

    if provided != expected {
        return Err(ApiError::Unauthorized("invalid API key".into()));
    }

    Ok(AdminUser {
        subject: "api_key".to_string(),
    })
}

fn decoding_key(config: &AuthConfig) -> Result<DecodingKey, ApiError> {
    let missing = |name: &str| ApiError::Unauthorized(format!("missing {name}"));
    let invalid = |err: jsonwebtoken::errors::Error| {
        ApiError::Internal(format!("invalid JWT_PUBLIC_KEY: {err}"))
    };

    match config.jwt_algorithm.key_kind() {
        JwtKeyKind::Secret => {
            let secret = config
                .jwt_secret
                .as_deref()
                .ok_or_else(|| missing("JWT_SECRET"))?;
            Ok(DecodingKey::from_secret(secret.as_bytes()))
        }
        kind => {
            let pem = config
                .jwt_public_key
                .as_deref()
                .ok_or_else(|| missing("JWT_PUBLIC_KEY"))?
                .as_bytes();
            match kind {
                JwtKeyKind::RsaPem => DecodingKey::from_rsa_pem(pem).map_err(invalid),
                JwtKeyKind::EcPem => DecodingKey::from_ec_pem(pem).map_err(invalid),
                _ => DecodingKey::from_ed_pem(pem).map_err(invalid),
            }
        }
    }
}

fn authorize_jwt(parts: &Parts, config: &AuthConfig) -> Result<AdminUser, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("expected Bearer token".into()))?;

    let key = decoding_key(config)?;
    let validation = Validation::new(config.jwt_algorithm.algorithm());

    let data = decode::<Claims>(token, &key, &validation)
        .map_err(|err| ApiError::Unauthorized(format!("invalid token: {err}")))?;

    if !data.claims.is_admin() {
        return Err(ApiError::Forbidden(format!(
            "subject {} lacks the {ADMIN_ROLE} role",
            data.claims.sub
        )));
    }

    Ok(AdminUser {
        subject: data.claims.sub,
    })
}
