//! URL-safe slug type derived from catalog titles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A URL-safe identifier derived deterministically from a title.
///
/// Derivation lowercases the title, strips everything outside word
/// characters, whitespace, and hyphens, collapses whitespace runs into
/// single hyphens, collapses hyphen runs, and trims leading/trailing
/// hyphens. Re-applying the derivation to a slug yields the same slug.
///
/// ## Examples
///
/// ```
/// use everwish_core::Slug;
///
/// let slug = Slug::from_title("Golden Hour -- Rooftop Picnic!");
/// assert_eq!(slug.as_str(), "golden-hour-rooftop-picnic");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a human-readable title.
    #[must_use]
    pub fn from_title(title: &str) -> Self {
        let mut out = String::with_capacity(title.len());
        let mut pending_hyphen = false;

        for c in title.trim().to_lowercase().chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c);
            } else if c.is_whitespace() || c == '-' {
                pending_hyphen = true;
            }
            // Anything else (punctuation, symbols) is dropped without
            // introducing a separator.
        }

        Self(out)
    }

    /// Wrap an already-derived slug value (e.g. read back from the database).
    #[must_use]
    pub fn from_raw(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns true when the derivation produced no usable characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_derivation() {
        assert_eq!(
            Slug::from_title("Candlelight Dinner").as_str(),
            "candlelight-dinner"
        );
    }

    #[test]
    fn test_strips_punctuation() {
        let slug = Slug::from_title("Any Title!! — 50th Anniversary");
        assert_eq!(slug.as_str(), "any-title-50th-anniversary");
        assert!(
            slug.as_str()
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        );
    }

    #[test]
    fn test_collapses_whitespace_and_hyphens() {
        assert_eq!(
            Slug::from_title("  a   b -- c  ").as_str(),
            "a-b-c"
        );
    }

    #[test]
    fn test_no_edge_hyphens() {
        let slug = Slug::from_title("--- Birthday Bash ---");
        assert!(!slug.as_str().starts_with('-'));
        assert!(!slug.as_str().ends_with('-'));
        assert!(!slug.as_str().contains("--"));
    }

    #[test]
    fn test_idempotent() {
        let once = Slug::from_title("Romantic Terrace Setup #3");
        let twice = Slug::from_title(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_after_derivation() {
        assert!(Slug::from_title("!!! ???").is_empty());
    }
}
