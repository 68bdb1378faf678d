//! Catalog route handlers.
//!
//! Admin create/update accept raw image inputs and run them through the
//! image pipeline before the row is written; successfully processed inputs
//! are replaced with their stored URLs, failures keep the original string.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use everwish_core::{ExperienceId, Slug};

use crate::db::ExperienceRepository;
use crate::error::{AppError, Result};
use crate::middleware::AdminUser;
use crate::models::experience::{ExperienceFilters, NewExperience, UpdateExperience};
use crate::state::AppState;

/// GET /api/experiences
pub async fn list(
    State(state): State<AppState>,
    Query(filters): Query<ExperienceFilters>,
) -> Result<Json<Value>> {
    let experiences = ExperienceRepository::new(state.pool()).list(&filters).await?;

    Ok(Json(json!({
        "success": true,
        "data": experiences,
        "count": experiences.len(),
    })))
}

/// GET /api/experiences/featured
pub async fn featured(State(state): State<AppState>) -> Result<Json<Value>> {
    let experiences = ExperienceRepository::new(state.pool())
        .list(&ExperienceFilters::featured())
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": experiences,
        "count": experiences.len(),
    })))
}

/// GET /api/experiences/category/{category}
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Value>> {
    if category.trim().is_empty() {
        return Err(AppError::Validation("Category is required".to_string()));
    }

    let experiences = ExperienceRepository::new(state.pool())
        .list(&ExperienceFilters::category(category))
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": experiences,
        "count": experiences.len(),
    })))
}

/// Query string for the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/experiences/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Search term is required".to_string()))?;

    let experiences = ExperienceRepository::new(state.pool()).search(term).await?;

    Ok(Json(json!({
        "success": true,
        "data": experiences,
        "count": experiences.len(),
    })))
}

/// GET /api/experiences/{slug}
pub async fn by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let experience = ExperienceRepository::new(state.pool())
        .get_by_slug(&Slug::from_raw(slug))
        .await?
        .ok_or_else(|| AppError::NotFound("Experience not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": experience })))
}

/// POST /api/experiences (admin)
pub async fn create(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(request): Json<NewExperience>,
) -> Result<(StatusCode, Json<Value>)> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let slug = Slug::from_title(&request.title);
    if slug.is_empty() {
        return Err(AppError::Validation(
            "Title must contain at least one letter or digit".to_string(),
        ));
    }

    let repo = ExperienceRepository::new(state.pool());

    // Slug collision check before any image work; the unique constraint
    // still backs this under race.
    if repo.get_by_slug(&slug).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Experience with slug '{slug}' already exists"
        )));
    }

    let images = store_images(&state, &request.images, slug.as_str()).await;

    let created = repo.create(&request, &slug, &images).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": created })),
    ))
}

/// PUT /api/experiences/{id} (admin)
pub async fn update(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
    Json(patch): Json<UpdateExperience>,
) -> Result<Json<Value>> {
    let id = parse_id(&id)?;

    // Regenerate the slug only when the title is part of the patch.
    let slug = patch.title.as_deref().map(Slug::from_title);

    let images = match &patch.images {
        Some(inputs) => Some(store_images(&state, inputs, &id.to_string()).await),
        None => None,
    };

    let updated = ExperienceRepository::new(state.pool())
        .update(id, &patch, slug.as_ref(), images.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("Experience not found".to_string()))?;

    Ok(Json(json!({ "success": true, "data": updated })))
}

/// DELETE /api/experiences/{id} (admin)
pub async fn remove(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_id(&id)?;

    let deleted = ExperienceRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("Experience not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Experience deleted successfully",
    })))
}

/// Run raw image inputs through the pipeline, replacing successes with
/// stored URLs. Failed inputs keep their original strings so nothing is
/// silently dropped.
async fn store_images(state: &AppState, inputs: &[String], owner: &str) -> Vec<String> {
    if inputs.is_empty() {
        return Vec::new();
    }

    state
        .images()
        .process_multiple(inputs, owner)
        .await
        .into_iter()
        .map(|result| result.url.unwrap_or(result.original_url))
        .collect()
}

fn parse_id(raw: &str) -> Result<ExperienceId> {
    raw.parse()
        .map_err(|_| AppError::Validation("Invalid experience id".to_string()))
}
