//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Grant the admin role to an existing user
//! ew-cli admin promote -e ops@everwish.app
//!
//! # Replace a user's password
//! ew-cli admin set-password -e ops@everwish.app -p <new-password>
//! ```
//!
//! Admin login additionally requires the address to match
//! `ADMIN_LOGIN_EMAIL`; promoting a role here is necessary but not
//! sufficient on its own.

use everwish_api::db::UserRepository;
use everwish_core::{Email, UserRole};

use super::{CommandError, connect};

/// Work factor for password hashing; matches the API's registration cost.
const BCRYPT_COST: u32 = 12;

/// Grant the admin role to the user behind an email address.
///
/// # Errors
///
/// Returns `CommandError::UserNotFound` if no user has this email.
pub async fn promote(email: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let email = parse_email(email)?;

    let users = UserRepository::new(&pool);
    let user = users
        .get_by_email(&email)
        .await
        .map_err(|e| CommandError::Repository(e.to_string()))?
        .ok_or_else(|| CommandError::UserNotFound(email.to_string()))?;

    users
        .set_role(user.id, UserRole::Admin)
        .await
        .map_err(|e| CommandError::Repository(e.to_string()))?;

    tracing::info!("Granted admin role to {email}");
    Ok(())
}

/// Replace a user's password hash.
///
/// # Errors
///
/// Returns `CommandError::UserNotFound` if no user has this email.
pub async fn set_password(email: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let email = parse_email(email)?;

    let users = UserRepository::new(&pool);
    let user = users
        .get_by_email(&email)
        .await
        .map_err(|e| CommandError::Repository(e.to_string()))?
        .ok_or_else(|| CommandError::UserNotFound(email.to_string()))?;

    let hashed = bcrypt::hash(password, BCRYPT_COST)?;

    users
        .update_password(user.id, &hashed)
        .await
        .map_err(|e| CommandError::Repository(e.to_string()))?;

    tracing::info!("Password updated for {email}");
    Ok(())
}

fn parse_email(raw: &str) -> Result<Email, CommandError> {
    Email::parse(raw).map_err(|e| CommandError::InvalidEmail(e.to_string()))
}
