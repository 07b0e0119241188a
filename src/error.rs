use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    auth::{password::PasswordError, token::TokenError},
    chat::ChatError,
    geo::GeoError,
    models::ApiResponse,
};

/// AppError
///
/// The single error type returned by handlers and the repository layer.
/// Every variant maps onto exactly one HTTP status; infrastructure failures are
/// logged here and collapsed to a generic message so that library-specific
/// detail (sqlx, jsonwebtoken, argon2) never reaches the response body.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or unusable configuration (e.g. empty signing secret).
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// Field-level validation failures, returned to the client as a list.
    #[error("validation error")]
    Validation(Vec<String>),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Computation(#[from] GeoError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Token(TokenError::Signing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized(_) | AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::Computation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Chat(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_)
            | AppError::Password(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client.
    fn public_message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) | AppError::Forbidden(msg) => (*msg).to_string(),
            AppError::Token(TokenError::Signing(_)) => "Internal server error".to_string(),
            AppError::Token(_) => "Unauthorized Access".to_string(),
            AppError::NotFound(what) => format!("{what} not found"),
            AppError::BadRequest(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::Validation(_) => "Validation error".to_string(),
            AppError::Computation(e) => e.to_string(),
            AppError::Chat(_) => "Chat service unavailable".to_string(),
            AppError::Configuration(_)
            | AppError::Password(_)
            | AppError::Database(_)
            | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let message = self.public_message();
        let body: ApiResponse<Vec<String>> = match self {
            AppError::Validation(errors) => ApiResponse::error_with(message, status, errors),
            _ => ApiResponse::error(message, status),
        };

        (status, Json(body)).into_response()
    }
}

const INVALID_REQUEST: &str = "Invalid request";

// Extractor rejections: the parser detail is logged, the client gets a fixed message.

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected JSON body");
        AppError::BadRequest(INVALID_REQUEST.to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected path parameters");
        AppError::BadRequest(INVALID_REQUEST.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "rejected query string");
        AppError::BadRequest(INVALID_REQUEST.to_string())
    }
}

/// Maps a unique-constraint violation onto `Conflict`, everything else onto `Database`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Database(err),
    }
}
