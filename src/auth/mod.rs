use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::models::Role;

pub mod gate;
pub mod password;
pub mod token;

pub use gate::{GateRejection, RoleGate};
pub use token::{Claims, TokenError, TokenService};

/// AuthUser
///
/// The resolved identity of an authenticated request, projected from the token claims.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Behind `require_auth` / `require_role` the claims are already in the request
/// extensions and are reused. Without a gate layer the extractor runs the
/// authentication filter itself, so a handler taking `AuthUser` can never see
/// an unauthenticated request.
///
/// Rejection: `GateRejection` (401).
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(claims.clone().into());
        }

        let tokens = TokenService::from_ref(state);
        let claims = gate::authenticate(&tokens, &parts.headers)?;
        parts.extensions.insert(claims.clone());
        Ok(claims.into())
    }
}
