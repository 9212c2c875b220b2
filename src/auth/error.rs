use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::error::ErrorResponse;

/// Authentication and authorization failures.
///
/// Every variant ends the request: 401 for identity problems, 403 when an
/// identity is present but a gate rejects it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingAuthorization,

    #[error("Authorization header must be in format 'Bearer <token>'")]
    InvalidAuthorizationFormat,

    #[error("Token validation failed: {0}")]
    MalformedToken(String),

    #[error("User authentication is required")]
    AuthenticationRequired,

    #[error("{0}")]
    InsufficientPermissions(String),

    #[error("{0}")]
    InsufficientTier(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthorization
            | AuthError::InvalidAuthorizationFormat
            | AuthError::MalformedToken(_)
            | AuthError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions(_) | AuthError::InsufficientTier(_) => {
                StatusCode::FORBIDDEN
            }
        }
    }

    /// Stable machine-readable code placed in the `error` field
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "missing_authorization",
            AuthError::InvalidAuthorizationFormat => "invalid_authorization_format",
            AuthError::MalformedToken(_) => "invalid_token",
            AuthError::AuthenticationRequired => "authentication_required",
            AuthError::InsufficientPermissions(_) => "insufficient_permissions",
            AuthError::InsufficientTier(_) => "insufficient_tier",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        tracing::warn!(
            code = %code,
            status = %status.as_u16(),
            message = %self,
            "Request rejected"
        );

        (status, Json(ErrorResponse::new(code, self.to_string()))).into_response()
    }
}
