//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`. Responses always use the JSON envelope
//! `{"success": false, "message": ...}`; in production mode 5xx messages
//! are replaced with generics so internals never leak.

use std::sync::OnceLock;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;

/// Whether 5xx responses carry generic messages only.
static PRODUCTION: OnceLock<bool> = OnceLock::new();

/// Record the production flag at startup. Later calls are ignored.
pub fn set_production(production: bool) {
    let _ = PRODUCTION.set(production);
}

fn is_production() -> bool {
    *PRODUCTION.get().unwrap_or(&false)
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input, detected at the boundary.
    #[error("{0}")]
    Validation(String),

    /// Missing/invalid/expired token or bad credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Role or ownership denial.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity absent.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate unique key.
    #[error("{0}")]
    Conflict(String),

    /// Authentication operation failed.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Order workflow failed.
    #[error("{0}")]
    Order(#[from] OrderError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Auth(err) => auth_status(err),
            Self::Order(err) => match err {
                OrderError::MissingFields(_) | OrderError::EmptyCart => StatusCode::BAD_REQUEST,
                OrderError::Repository(repo) => repository_status(repo),
            },
            Self::Database(repo) => repository_status(repo),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        let status = self.status();
        if status.is_server_error() && is_production() {
            return "Internal server error".to_string();
        }

        match self {
            Self::Database(RepositoryError::PermissionDenied(_)) => {
                "Insufficient permissions to perform this action".to_string()
            }
            Self::Auth(AuthError::Repository(RepositoryError::PermissionDenied(_)))
            | Self::Order(OrderError::Repository(RepositoryError::PermissionDenied(_))) => {
                "Insufficient permissions to perform this action".to_string()
            }
            other => other.to_string(),
        }
    }
}

fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::MissingFields(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::InvalidCredentials
        | AuthError::AdminNotFound
        | AuthError::AdminDeactivated
        | AuthError::AdminNotConfigured
        | AuthError::InvalidAdminCredentials
        | AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
        AuthError::AdminEmailMismatch | AuthError::AdminRoleRequired => StatusCode::FORBIDDEN,
        AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::Repository(repo) => repository_status(repo),
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = json!({
            "success": false,
            "message": self.message(),
        });

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
