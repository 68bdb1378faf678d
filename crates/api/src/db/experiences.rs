//! Experience repository: catalog CRUD, filtering, and search.

use sqlx::{PgPool, Postgres, QueryBuilder};

use everwish_core::{ExperienceId, Slug};

use super::RepositoryError;
use crate::models::experience::{Experience, ExperienceFilters, NewExperience, UpdateExperience};

/// Columns selected for every [`Experience`] read.
const EXPERIENCE_COLUMNS: &str = "id, title, slug, category, subcategory, description, \
     short_desc, base_price, images, thumbnail_url, template_type, is_featured, created_at";

/// Repository for catalog database operations.
pub struct ExperienceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ExperienceRepository<'a> {
    /// Create a new experience repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List experiences, newest first, applying exact-match filters
    /// conjunctively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filters: &ExperienceFilters,
    ) -> Result<Vec<Experience>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {EXPERIENCE_COLUMNS} FROM experiences WHERE 1=1"));

        if let Some(category) = &filters.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(subcategory) = &filters.subcategory {
            query.push(" AND subcategory = ").push_bind(subcategory);
        }
        if let Some(is_featured) = filters.is_featured {
            query.push(" AND is_featured = ").push_bind(is_featured);
        }
        if let Some(template_type) = filters.template_type {
            query.push(" AND template_type = ").push_bind(template_type);
        }

        query.push(" ORDER BY created_at DESC");

        let experiences = query
            .build_query_as::<Experience>()
            .fetch_all(self.pool)
            .await?;

        Ok(experiences)
    }

    /// Case-insensitive substring search over title, description, and
    /// short description, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<Experience>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(term));

        let experiences = sqlx::query_as::<_, Experience>(&format!(
            "SELECT {EXPERIENCE_COLUMNS} FROM experiences \
             WHERE title ILIKE $1 OR description ILIKE $1 OR short_desc ILIKE $1 \
             ORDER BY created_at DESC"
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(experiences)
    }

    /// Get a single experience by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Experience>, RepositoryError> {
        let experience = sqlx::query_as::<_, Experience>(&format!(
            "SELECT {EXPERIENCE_COLUMNS} FROM experiences WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(experience)
    }

    /// Get a single experience by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ExperienceId) -> Result<Option<Experience>, RepositoryError> {
        let experience = sqlx::query_as::<_, Experience>(&format!(
            "SELECT {EXPERIENCE_COLUMNS} FROM experiences WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(experience)
    }

    /// Insert a new experience with an already-derived slug and processed
    /// image URLs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    /// Returns `RepositoryError::PermissionDenied` if the database role is
    /// not allowed to write the catalog.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        data: &NewExperience,
        slug: &Slug,
        images: &[String],
    ) -> Result<Experience, RepositoryError> {
        let experience = sqlx::query_as::<_, Experience>(&format!(
            "INSERT INTO experiences (title, slug, category, subcategory, description, \
                 short_desc, base_price, images, thumbnail_url, template_type, is_featured) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {EXPERIENCE_COLUMNS}"
        ))
        .bind(&data.title)
        .bind(slug)
        .bind(&data.category)
        .bind(data.subcategory.as_deref())
        .bind(&data.description)
        .bind(&data.short_desc)
        .bind(data.base_price)
        .bind(images)
        .bind(data.thumbnail_url.as_deref())
        .bind(data.template_type)
        .bind(data.is_featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "slug already exists"))?;

        Ok(experience)
    }

    /// Apply a partial update and return the updated row, or `None` if the
    /// experience does not exist.
    ///
    /// `slug` is `Some` only when the title changed and a new slug was
    /// derived; `images` is `Some` only when the patch replaced the image
    /// list (already processed into stored URLs).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a regenerated slug collides.
    /// Returns `RepositoryError::PermissionDenied` on privilege failures.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ExperienceId,
        patch: &UpdateExperience,
        slug: Option<&Slug>,
        images: Option<&[String]>,
    ) -> Result<Option<Experience>, RepositoryError> {
        // Existence check first; absence is "not found", not an error.
        if self.get_by_id(id).await?.is_none() {
            return Ok(None);
        }

        let experience = sqlx::query_as::<_, Experience>(&format!(
            "UPDATE experiences SET \
                 title = COALESCE($2, title), \
                 slug = COALESCE($3, slug), \
                 category = COALESCE($4, category), \
                 subcategory = COALESCE($5, subcategory), \
                 description = COALESCE($6, description), \
                 short_desc = COALESCE($7, short_desc), \
                 base_price = COALESCE($8, base_price), \
                 images = COALESCE($9, images), \
                 thumbnail_url = COALESCE($10, thumbnail_url), \
                 template_type = COALESCE($11, template_type), \
                 is_featured = COALESCE($12, is_featured) \
             WHERE id = $1 \
             RETURNING {EXPERIENCE_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(slug)
        .bind(patch.category.as_deref())
        .bind(patch.subcategory.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.short_desc.as_deref())
        .bind(patch.base_price)
        .bind(images)
        .bind(patch.thumbnail_url.as_deref())
        .bind(patch.template_type)
        .bind(patch.is_featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "slug already exists"))?;

        Ok(Some(experience))
    }

    /// Delete an experience.
    ///
    /// # Returns
    ///
    /// Returns `true` if the row was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::PermissionDenied` on privilege failures.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ExperienceId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM experiences WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "experience in use"))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Escape LIKE metacharacters so search terms match literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_passthrough() {
        assert_eq!(escape_like("candlelight"), "candlelight");
    }

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
