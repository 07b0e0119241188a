use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{error::AppError, models::Role};

/// Claims
///
/// Payload of every bearer token issued by this service. Tokens are
/// self-contained: nothing about them is stored server-side, and any change to
/// the payload invalidates the HS256 signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id (`users.id`).
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    /// Issued at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch. The token is valid while `now < exp`.
    pub exp: i64,
}

/// TokenError
///
/// Distinct failure kinds. The gate logs them individually but answers every
/// verification failure with the same 401.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not verify")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("token could not be signed: {0}")]
    Signing(String),
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// TokenService
///
/// Issues and verifies HS256 JSON Web Tokens with the process-wide secret.
/// Construction fails on an empty secret, so an instance that exists is
/// always able to sign. Cloning shares the keys.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// new
    ///
    /// Builds the service from the shared secret and the default token lifetime.
    ///
    /// # Errors
    /// `AppError::Configuration` when the secret is empty or whitespace.
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, AppError> {
        if secret.trim().is_empty() {
            return Err(AppError::Configuration(
                "JWT signing secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token with the configured lifetime.
    pub fn issue(&self, user_id: Uuid, username: &str, role: Role) -> Result<String, TokenError> {
        self.issue_with_ttl(user_id, username, role, self.ttl)
    }

    /// issue_with_ttl
    ///
    /// Signs `{user_id, username, role, iat = now, exp = now + ttl}`. A negative
    /// `ttl` yields a token that is already expired.
    pub fn issue_with_ttl(
        &self,
        user_id: Uuid,
        username: &str,
        role: Role,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            user_id,
            username: username.to_string(),
            role,
            iat,
            exp: iat + ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// verify
    ///
    /// Parses the compact token, checks the HS256 signature, then the expiry.
    /// No clock leeway is granted.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.keys.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        // The library treats `exp == now` as still valid.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(secret, Duration::hours(72)).unwrap()
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let result = TokenService::new("   ", Duration::hours(1));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let err = service("secret-a").verify("not-a-token").unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let tokens = service("secret-a");
        let token = tokens.issue(Uuid::new_v4(), "alice", Role::User).unwrap();
        let other = tokens.issue(Uuid::new_v4(), "mallory", Role::Admin).unwrap();

        // Splice mallory's payload onto alice's signature.
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(tokens.verify(&forged), Err(TokenError::InvalidSignature));
    }
}
