//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// Regular login collapses every credential failure into
/// [`AuthError::InvalidCredentials`] so the response cannot reveal which
/// part was wrong. Admin login intentionally keeps distinct variants.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required request field is missing.
    #[error("{0}")]
    MissingFields(&'static str),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] everwish_core::EmailError),

    /// Email already registered.
    #[error("Email already exists")]
    EmailTaken,

    /// Wrong password, unknown account, deactivated account, or a record
    /// without a stored hash. One variant, one message.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Admin login attempted with a non-admin address.
    #[error("Access denied. Only authorized administrators can access this area.")]
    AdminEmailMismatch,

    /// Admin login: no account behind the configured address.
    #[error("Admin account not found. Please contact system administrator.")]
    AdminNotFound,

    /// Admin login: account exists but lacks the admin role.
    #[error("Access denied. Admin role required.")]
    AdminRoleRequired,

    /// Admin login: account is deactivated.
    #[error("Admin account is deactivated")]
    AdminDeactivated,

    /// Admin login: account has no stored password hash.
    #[error("Admin account not properly configured")]
    AdminNotConfigured,

    /// Admin login: password mismatch.
    #[error("Invalid admin credentials")]
    InvalidAdminCredentials,

    /// Token failed to decode, verify, or is expired.
    #[error("Invalid or expired token")]
    TokenInvalid,

    /// Referenced user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// Password hashing failed.
    #[error("password hashing error")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
