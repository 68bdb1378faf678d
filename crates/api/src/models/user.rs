//! User entity and auth request types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use everwish_core::{Email, UserId, UserRole};

/// A user row as stored in the database.
///
/// This type is internal to the service layer; handlers respond with
/// [`UserProfile`] so the password hash never reaches the wire.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: Email,
    /// Absent on legacy records imported without a password.
    pub hashed_password: Option<String>,
    pub role: UserRole,
    pub phone_number: Option<String>,
    pub profile_icon: Option<String>,
    pub current_location: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, safe to return to clients.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub full_name: String,
    pub email: Email,
    pub role: UserRole,
    pub phone_number: Option<String>,
    pub profile_icon: Option<String>,
    pub current_location: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: bool,
    pub is_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
            phone_number: user.phone_number,
            profile_icon: user.profile_icon,
            current_location: user.current_location,
            gender: user.gender,
            date_of_birth: user.date_of_birth,
            is_active: user.is_active,
            is_verified: user.is_verified,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub profile_icon: Option<String>,
    pub current_location: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Login request body (both regular and admin login).
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Partial profile update; only present fields are persisted.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub profile_icon: Option<String>,
    pub current_location: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl UpdateProfileRequest {
    /// Whether the patch contains no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone_number.is_none()
            && self.profile_icon.is_none()
            && self.current_location.is_none()
            && self.gender.is_none()
            && self.date_of_birth.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::generate(),
            full_name: "Asha Rao".to_string(),
            email: Email::parse("asha@example.com").unwrap(),
            hashed_password: Some("$2b$12$abcdefghijklmnopqrstuv".to_string()),
            role: UserRole::User,
            phone_number: None,
            profile_icon: None,
            current_location: "Delhi".to_string(),
            gender: None,
            date_of_birth: None,
            is_active: true,
            is_verified: false,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_never_serializes_password_hash() {
        let profile = UserProfile::from(sample_user());
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("$2b$12$"));
        assert!(json.contains("asha@example.com"));
    }

    #[test]
    fn test_empty_patch_detection() {
        assert!(UpdateProfileRequest::default().is_empty());
        let patch = UpdateProfileRequest {
            current_location: Some("Mumbai".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
