//! User repository for database operations.

use chrono::Utc;
use sqlx::PgPool;

use everwish_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::user::{UpdateProfileRequest, User};

/// Columns selected for every [`User`] read.
const USER_COLUMNS: &str = "id, full_name, email, hashed_password, role, phone_number, \
     profile_icon, current_location, gender, date_of_birth, is_active, is_verified, \
     last_login, created_at, updated_at";

/// Parameters for inserting a new user row.
pub struct NewUser<'a> {
    pub full_name: &'a str,
    pub email: &'a Email,
    pub hashed_password: &'a str,
    pub phone_number: Option<&'a str>,
    pub profile_icon: Option<&'a str>,
    pub current_location: &'a str,
    pub gender: Option<&'a str>,
    pub date_of_birth: Option<chrono::NaiveDate>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Whether a user with this email already exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Create a new user with the `user` role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: NewUser<'_>) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (full_name, email, hashed_password, role, phone_number, \
                 profile_icon, current_location, gender, date_of_birth, is_active, is_verified) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, FALSE) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.full_name)
        .bind(new_user.email)
        .bind(new_user.hashed_password)
        .bind(UserRole::User)
        .bind(new_user.phone_number)
        .bind(new_user.profile_icon)
        .bind(new_user.current_location)
        .bind(new_user.gender)
        .bind(new_user.date_of_birth)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "email already exists"))?;

        Ok(user)
    }

    /// Apply a partial profile update and return the updated row.
    ///
    /// Absent fields keep their current values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        patch: &UpdateProfileRequest,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                 full_name = COALESCE($2, full_name), \
                 phone_number = COALESCE($3, phone_number), \
                 profile_icon = COALESCE($4, profile_icon), \
                 current_location = COALESCE($5, current_location), \
                 gender = COALESCE($6, gender), \
                 date_of_birth = COALESCE($7, date_of_birth), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.full_name.as_deref())
        .bind(patch.phone_number.as_deref())
        .bind(patch.profile_icon.as_deref())
        .bind(patch.current_location.as_deref())
        .bind(patch.gender.as_deref())
        .bind(patch.date_of_birth)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(user)
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn touch_last_login(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET last_login = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_password(
        &self,
        id: UserId,
        hashed_password: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET hashed_password = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(hashed_password)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Grant or revoke the admin role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_role(&self, id: UserId, role: UserRole) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Hard-delete a user row.
    ///
    /// # Returns
    ///
    /// Returns `true` if the user was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
