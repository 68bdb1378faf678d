//! Image pipeline route handlers.
//!
//! Batch endpoints report one result per input, success and failure
//! intermixed; no partial result is silently dropped.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::services::images;
use crate::state::AppState;

/// Request body for `POST /api/images/process`.
#[derive(Debug, Deserialize)]
pub struct ProcessImagesRequest {
    pub images: Option<Vec<String>>,
    #[serde(rename = "experienceId")]
    pub experience_id: Option<String>,
}

/// Request body for the validate and convert-drive endpoints.
#[derive(Debug, Deserialize)]
pub struct UrlsRequest {
    pub urls: Option<Vec<String>>,
}

/// POST /api/images/process
pub async fn process(
    State(state): State<AppState>,
    Json(request): Json<ProcessImagesRequest>,
) -> Result<Json<Value>> {
    let inputs = request
        .images
        .ok_or_else(|| AppError::Validation("Images array is required".to_string()))?;

    let owner = request
        .experience_id
        .unwrap_or_else(|| format!("temp-{}", Utc::now().timestamp_millis()));

    let results = state.images().process_multiple(&inputs, &owner).await;

    let successful: Vec<&str> = results
        .iter()
        .filter(|r| r.success)
        .filter_map(|r| r.url.as_deref())
        .collect();
    let failed: Vec<Value> = results
        .iter()
        .filter(|r| !r.success)
        .map(|r| json!({ "url": r.original_url, "error": r.error }))
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": {
            "processed": successful.len(),
            "failed": failed.len(),
            "results": results,
            "successfulUrls": successful,
            "errors": failed,
        },
    })))
}

/// POST /api/images/validate
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<UrlsRequest>,
) -> Result<Json<Value>> {
    let urls = request
        .urls
        .ok_or_else(|| AppError::Validation("URLs array is required".to_string()))?;

    let mut results = Vec::with_capacity(urls.len());
    for url in &urls {
        let valid = state.images().validate_url(url).await;
        let metadata = state.images().metadata(url).await;
        results.push(json!({ "url": url, "valid": valid, "metadata": metadata }));
    }

    let valid_count = results
        .iter()
        .filter(|r| r["valid"].as_bool().unwrap_or(false))
        .count();

    Ok(Json(json!({
        "success": true,
        "data": {
            "total": results.len(),
            "valid": valid_count,
            "invalid": results.len() - valid_count,
            "results": results,
        },
    })))
}

/// POST /api/images/convert-drive
pub async fn convert_drive(Json(request): Json<UrlsRequest>) -> Result<Json<Value>> {
    let urls = request
        .urls
        .ok_or_else(|| AppError::Validation("URLs array is required".to_string()))?;

    let converted: Vec<Value> = urls
        .iter()
        .map(|url| {
            if images::is_drive_link(url) {
                match images::drive_link_to_direct(url) {
                    Ok(direct) => json!({
                        "original": url,
                        "converted": direct,
                        "success": true,
                    }),
                    Err(e) => json!({
                        "original": url,
                        "converted": Value::Null,
                        "success": false,
                        "error": e.to_string(),
                    }),
                }
            } else {
                json!({
                    "original": url,
                    "converted": url,
                    "success": true,
                    "note": "Not a Drive link",
                })
            }
        })
        .collect();

    let successful = converted
        .iter()
        .filter(|r| r["success"].as_bool().unwrap_or(false))
        .count();

    Ok(Json(json!({
        "success": true,
        "data": {
            "total": converted.len(),
            "successful": successful,
            "failed": converted.len() - successful,
            "results": converted,
        },
    })))
}
