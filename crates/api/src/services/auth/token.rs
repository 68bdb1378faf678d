//! Token issuance and verification.
//!
//! Tokens are HS256-signed with a server-held secret and carry the user ID
//! and email. Verification fails closed: any decode, signature, or expiry
//! problem is reported as one opaque error.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use everwish_core::UserId;

use super::AuthError;
use crate::config::AuthConfig;

/// Signed token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub email: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Issue a signed token for a user.
///
/// # Errors
///
/// Returns `AuthError::TokenInvalid` if signing fails (malformed secret).
pub fn issue(config: &AuthConfig, user_id: UserId, email: &str) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        user_id,
        email: email.to_owned(),
        iat: now.timestamp(),
        exp: (now + Duration::days(config.jwt_expires_days)).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::TokenInvalid)
}

/// Verify a token's signature and expiry and return its claims.
///
/// # Errors
///
/// Returns `AuthError::TokenInvalid` on any decode failure.
pub fn verify(config: &AuthConfig, token: &str) -> Result<Claims, AuthError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AuthError::TokenInvalid)?;

    Ok(data.claims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::from("k9#mP2$vL8@qR5!wX3^nB7&cF4*hJ6%t"),
            jwt_expires_days: 7,
            admin_login_email: None,
            admin_emails: Vec::new(),
        }
    }

    #[test]
    fn test_issue_verify_round_trip() {
        let config = test_config();
        let user_id = UserId::generate();

        let token = issue(&config, user_id, "user@example.com").unwrap();
        let claims = verify(&config, &token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "user@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let config = test_config();
        let token = issue(&config, UserId::generate(), "user@example.com").unwrap();

        let mut tampered = token;
        tampered.push('x');
        assert!(matches!(
            verify(&config, &tampered),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let config = test_config();
        let token = issue(&config, UserId::generate(), "user@example.com").unwrap();

        let other = AuthConfig {
            jwt_secret: SecretString::from("z1!aQ9@sW8#dE7$fR6%gT5^hY4&jU3*k"),
            ..test_config()
        };
        assert!(matches!(
            verify(&other, &token),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let config = test_config();
        let now = Utc::now();
        let claims = Claims {
            user_id: UserId::generate(),
            email: "user@example.com".to_owned(),
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify(&config, &token),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let config = test_config();
        assert!(matches!(
            verify(&config, "not-a-token"),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_claims_serialize_user_id_as_camel_case() {
        let claims = Claims {
            user_id: UserId::generate(),
            email: "user@example.com".to_owned(),
            iat: 0,
            exp: 0,
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"userId\""));
    }
}
