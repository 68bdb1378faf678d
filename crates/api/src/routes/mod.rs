//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Service descriptor
//! GET  /health                             - Liveness check
//! GET  /health/ready                       - Readiness check (DB ping)
//!
//! # Auth
//! POST   /api/auth/register                - Register + token
//! POST   /api/auth/login                   - Login + token
//! POST   /api/auth/admin/login             - Admin login (stricter gate)
//! GET    /api/auth/profile                 - Own profile (auth)
//! PUT    /api/auth/profile                 - Partial profile update (auth)
//! GET    /api/auth/verify                  - Verify bearer token
//! POST   /api/auth/logout                  - Acknowledge logout
//! DELETE /api/auth/delete-account          - Hard-delete account (auth)
//!
//! # Catalog
//! GET    /api/experiences                  - List (category/subcategory/is_featured/template_type)
//! POST   /api/experiences                  - Create (admin)
//! GET    /api/experiences/featured         - Featured listing
//! GET    /api/experiences/category/{category}
//! GET    /api/experiences/search?q=        - Substring search
//! GET    /api/experiences/{slug}           - Single item by slug
//! PUT    /api/experiences/{id}             - Update (admin)
//! DELETE /api/experiences/{id}             - Delete (admin)
//!
//! # Cart (auth)
//! GET    /api/cart                         - Enriched cart + total
//! POST   /api/cart                         - Add line (upsert)
//! PUT    /api/cart                         - Update quantity (<= 0 removes)
//! DELETE /api/cart                         - Clear cart
//! DELETE /api/cart/{experience_id}         - Remove line
//! GET    /api/cart/count                   - Line count
//!
//! # Wishlist (auth)
//! GET    /api/wishlist                     - Enriched wishlist
//! POST   /api/wishlist                     - Add line
//! DELETE /api/wishlist/{experience_id}     - Remove line
//! GET    /api/wishlist/check/{experience_id} - Membership check
//! GET    /api/wishlist/count               - Line count
//!
//! # Orders
//! POST   /api/orders                       - Place order from cart (auth)
//! GET    /api/orders                       - Own orders (auth)
//! GET    /api/admin/orders                 - All orders, flattened (admin)
//! PUT    /api/admin/orders/{orderId}/status - Overwrite status (admin)
//!
//! # Images
//! POST   /api/images/process               - Normalize and store a batch
//! POST   /api/images/validate              - Probe URL accessibility
//! POST   /api/images/convert-drive         - Rewrite Drive sharing links
//! ```

pub mod auth;
pub mod cart;
pub mod experiences;
pub mod images;
pub mod orders;
pub mod wishlist;

use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode, header},
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::ApiConfig;
use crate::state::AppState;

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.config());

    Router::new()
        .route("/", get(service_info))
        .nest("/api/auth", auth_routes())
        .nest("/api/experiences", experience_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .merge(order_routes())
        .nest("/api/images", image_routes())
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/admin/login", post(auth::admin_login))
        .route("/profile", get(auth::get_profile).put(auth::update_profile))
        .route("/verify", get(auth::verify))
        .route("/logout", post(auth::logout))
        .route("/delete-account", delete(auth::delete_account))
}

fn experience_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(experiences::list).post(experiences::create))
        .route("/featured", get(experiences::featured))
        .route("/category/{category}", get(experiences::by_category))
        .route("/search", get(experiences::search))
        .route(
            "/{slug}",
            get(experiences::by_slug)
                .put(experiences::update)
                .delete(experiences::remove),
        )
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cart::get_cart)
                .post(cart::add)
                .put(cart::update_quantity)
                .delete(cart::clear),
        )
        .route("/count", get(cart::count))
        .route("/{experience_id}", delete(cart::remove))
}

fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::get_wishlist).post(wishlist::add))
        .route("/count", get(wishlist::count))
        .route("/check/{experience_id}", get(wishlist::check))
        .route("/{experience_id}", delete(wishlist::remove))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(orders::create).get(orders::list_own))
        .route("/api/admin/orders", get(orders::list_all))
        .route("/api/admin/orders/{order_id}/status", put(orders::update_status))
}

fn image_routes() -> Router<AppState> {
    Router::new()
        .route("/process", post(images::process))
        .route("/validate", post(images::validate))
        .route("/convert-drive", post(images::convert_drive))
}

/// Build the CORS layer from the configured origin allow-list.
///
/// Patterns containing `*` match wildcard labels (e.g.
/// `https://*.everwish.app`); everything else is an exact match.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let patterns = config.cors_origins.clone();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| origin_allowed(&patterns, o))
                .unwrap_or(false)
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(86400))
}

/// Whether a request origin matches any allow-list pattern.
fn origin_allowed(patterns: &[String], origin: &str) -> bool {
    let origin = origin.trim_end_matches('/');

    patterns.iter().any(|pattern| {
        let pattern = pattern.trim_end_matches('/');
        if pattern.contains('*') {
            let escaped = regex::escape(pattern).replace(r"\*", ".*");
            regex::Regex::new(&format!("^{escaped}$"))
                .map(|re| re.is_match(origin))
                .unwrap_or(false)
        } else {
            pattern == origin
        }
    })
}

/// Service descriptor for the root path.
async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Everwish Experiences API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "experiences": "/api/experiences",
            "auth": "/api/auth",
            "cart": "/api/cart",
            "wishlist": "/api/wishlist",
            "orders": "/api/orders",
            "images": "/api/images",
        },
    }))
}

/// Envelope-shaped 404 for unmatched routes.
async fn not_found(uri: axum::http::Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Not Found",
            "message": format!("Route {uri} not found"),
        })),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn patterns() -> Vec<String> {
        vec![
            "http://localhost:3000".to_string(),
            "https://*.everwish.app".to_string(),
        ]
    }

    #[test]
    fn test_origin_exact_match() {
        assert!(origin_allowed(&patterns(), "http://localhost:3000"));
        assert!(!origin_allowed(&patterns(), "http://localhost:4000"));
    }

    #[test]
    fn test_origin_trailing_slash_normalized() {
        assert!(origin_allowed(&patterns(), "http://localhost:3000/"));
    }

    #[test]
    fn test_origin_wildcard_subdomain() {
        assert!(origin_allowed(&patterns(), "https://staging.everwish.app"));
        assert!(origin_allowed(&patterns(), "https://pr-42.everwish.app"));
        assert!(!origin_allowed(&patterns(), "https://everwish.evil.example"));
    }

    #[test]
    fn test_origin_wildcard_does_not_match_other_scheme() {
        assert!(!origin_allowed(&patterns(), "http://staging.everwish.app"));
    }
}
