//! Database operations for the marketplace `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Identity and profile records
//! - `experiences` - Bookable catalog items
//! - `cart` / `wishlist` - Per-user line items, unique per (user, experience)
//! - `orders` / `order_items` - Checkout records
//!
//! ## Views
//!
//! - `user_cart` / `user_wishlist` - Line tables joined with the catalog so
//!   reads never need a second lookup
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p everwish-cli -- migrate
//! ```

pub mod cart;
pub mod experiences;
pub mod orders;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::CartRepository;
pub use experiences::ExperienceRepository;
pub use orders::OrderRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

/// `PostgreSQL` error code for insufficient privilege.
const SQLSTATE_INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or slug).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The database role lacks privileges for the statement.
    #[error("insufficient permissions: {0}")]
    PermissionDenied(String),
}

impl RepositoryError {
    /// Wrap an sqlx error, translating privilege failures to
    /// [`RepositoryError::PermissionDenied`] and unique violations to
    /// [`RepositoryError::Conflict`] with the given message.
    #[must_use]
    pub fn from_sqlx(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict_message.to_owned());
            }
            if db_err.code().as_deref() == Some(SQLSTATE_INSUFFICIENT_PRIVILEGE) {
                return Self::PermissionDenied(db_err.message().to_owned());
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
