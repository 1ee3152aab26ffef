// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Missing or invalid parameters: {0}")]
    MissingParameters(String),

    #[error("Unknown or expired login state")]
    UnknownOrExpiredState,

    #[error("Authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Identity fetch failed: {0}")]
    IdentityFetchFailed(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::AuthRequired => {
                (StatusCode::UNAUTHORIZED, "authentication_required", None)
            }
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::MissingParameters(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::UnknownOrExpiredState => {
                (StatusCode::BAD_REQUEST, "unknown_or_expired_state", None)
            }
            AppError::ExchangeFailed(msg) => {
                tracing::error!(error = %msg, "Authorization code exchange failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "exchange_failed",
                    Some(msg.clone()),
                )
            }
            AppError::IdentityFetchFailed(msg) => {
                tracing::error!(error = %msg, "Identity fetch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "identity_fetch_failed",
                    Some(msg.clone()),
                )
            }
            AppError::ProviderUnavailable(msg) => {
                tracing::error!(error = %msg, "OAuth provider unavailable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "provider_unavailable",
                    Some(msg.clone()),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        let response = AppError::AuthRequired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AppError::InvalidToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AppError::MissingParameters("code".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::UnknownOrExpiredState.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_errors_map_to_500() {
        let response = AppError::ExchangeFailed("HTTP 503".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response =
            AppError::IdentityFetchFailed("missing email".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::ProviderUnavailable("unknown".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
