//! Shared helpers for Everwish integration tests.
//!
//! These tests exercise a running API server over HTTP. They require:
//! - A running `PostgreSQL` database with migrations applied
//!   (`ew-cli migrate`)
//! - The API server running (`cargo run -p everwish-api`)
//!
//! Run with: `cargo test -p everwish-integration-tests -- --ignored`

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Plain HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder().build().expect("Failed to create HTTP client")
}

/// A unique throwaway email for a test user.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", Uuid::new_v4().simple())
}

/// Register a fresh user and return `(email, token)`.
///
/// # Panics
///
/// Panics if registration does not succeed.
pub async fn register_user(client: &Client) -> (String, String) {
    let email = unique_email();
    let resp = client
        .post(format!("{}/api/auth/register", api_base_url()))
        .json(&json!({
            "full_name": "Integration Test",
            "email": email,
            "password": "test-password-123",
        }))
        .send()
        .await
        .expect("register request failed");

    assert_eq!(resp.status().as_u16(), 201, "registration should succeed");

    let body: Value = resp.json().await.expect("register response not JSON");
    let token = body["token"]
        .as_str()
        .expect("register response missing token")
        .to_string();

    (email, token)
}
