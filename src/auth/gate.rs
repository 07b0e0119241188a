use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::token::{Claims, TokenError, TokenService};
use crate::models::{ApiResponse, Role};

const BEARER_PREFIX: &str = "Bearer ";

/// GateRejection
///
/// Terminal state of a request that did not make it through the gate.
/// Authentication failures answer 401, role failures 403. The body carries
/// a fixed message; the precise cause is only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    /// No `Authorization` header, or one without the `Bearer ` prefix.
    MissingToken,
    InvalidToken(TokenError),
    Forbidden { role: Role },
}

impl GateRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            GateRejection::MissingToken | GateRejection::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            GateRejection::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            GateRejection::Forbidden { .. } => "Access forbidden: insufficient role",
            _ => "Unauthorized Access",
        };
        (status, Json(ApiResponse::<()>::error(message, status))).into_response()
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// authenticate
///
/// Unauthenticated -> TokenPresent -> Authenticated. Any failing step yields a
/// 401 rejection.
pub fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Result<Claims, GateRejection> {
    let token = bearer_token(headers).ok_or_else(|| {
        tracing::warn!("rejected request: missing bearer token");
        GateRejection::MissingToken
    })?;

    tokens.verify(token).map_err(|e| {
        match &e {
            TokenError::Expired => tracing::warn!("rejected request: token expired"),
            TokenError::InvalidSignature => {
                tracing::warn!("rejected request: token signature invalid")
            }
            other => tracing::warn!(reason = %other, "rejected request: token unusable"),
        }
        GateRejection::InvalidToken(e)
    })
}

/// RoleGate
///
/// The single parametrized role filter. Holds the set of roles admitted on the
/// routes it guards; `admin_only` is the `{admin}` case.
#[derive(Clone, Debug)]
pub struct RoleGate {
    tokens: TokenService,
    allowed: Arc<[Role]>,
}

impl RoleGate {
    pub fn new(tokens: TokenService, allowed: impl IntoIterator<Item = Role>) -> Self {
        Self {
            tokens,
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn admin_only(tokens: TokenService) -> Self {
        Self::new(tokens, [Role::Admin])
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }

    /// admit
    ///
    /// Authenticated -> Authorized. Reuses claims already attached by an
    /// earlier authentication filter; otherwise authenticates first, so the
    /// 401 check always precedes the 403 check.
    pub fn admit(
        &self,
        headers: &HeaderMap,
        existing: Option<&Claims>,
    ) -> Result<Claims, GateRejection> {
        let claims = match existing {
            Some(claims) => claims.clone(),
            None => authenticate(&self.tokens, headers)?,
        };

        if !self.permits(claims.role) {
            tracing::warn!(
                user_id = %claims.user_id,
                role = %claims.role,
                "rejected request: role not permitted"
            );
            return Err(GateRejection::Forbidden { role: claims.role });
        }

        Ok(claims)
    }
}

/// require_auth
///
/// Authentication filter. On success the claims are stored in the request
/// extensions, where the `AuthUser` extractor picks them up.
pub async fn require_auth(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let claims = authenticate(&tokens, request.headers())?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// require_role
///
/// Role filter. Composes with `require_auth` but does not depend on it.
pub async fn require_role(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let claims = gate.admit(request.headers(), request.extensions().get::<Claims>())?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Duration;
    use uuid::Uuid;

    fn tokens() -> TokenService {
        TokenService::new("gate-test-secret", Duration::hours(1)).unwrap()
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn header_without_bearer_prefix_is_treated_as_missing() {
        let tokens = tokens();
        let token = tokens.issue(Uuid::new_v4(), "bob", Role::User).unwrap();

        let rejection = authenticate(&tokens, &headers_with(&token)).unwrap_err();
        assert_eq!(rejection, GateRejection::MissingToken);
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn role_gate_checks_authentication_before_role() {
        let gate = RoleGate::admin_only(tokens());
        let rejection = gate.admit(&HeaderMap::new(), None).unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn list_gate_admits_every_listed_role() {
        let tokens = tokens();
        let gate = RoleGate::new(tokens.clone(), [Role::Admin, Role::User]);

        for role in [Role::Admin, Role::User] {
            let token = tokens.issue(Uuid::new_v4(), "carol", role).unwrap();
            let claims = gate
                .admit(&headers_with(&format!("Bearer {token}")), None)
                .unwrap();
            assert_eq!(claims.role, role);
        }
    }
}
