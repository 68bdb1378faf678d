//! Integration tests for registration, login, and the admin gate.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p everwish-api)
//!
//! Run with: `cargo test -p everwish-integration-tests -- --ignored`

use everwish_integration_tests::{api_base_url, client, register_user, unique_email};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_returns_sanitized_user_and_token() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email();

    let resp = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&json!({
            "full_name": "Asha Rao",
            "email": email,
            "password": "test-password-123",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status().as_u16(), 201);

    let body: Value = resp.json().await.expect("not JSON");
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], email.to_lowercase());

    // The user payload must never contain the password hash.
    let user_text = body["user"].to_string();
    assert!(!user_text.contains("hashed_password"));
    assert!(!user_text.contains("$2b$"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_twice_conflicts() {
    let client = client();
    let base_url = api_base_url();
    let email = unique_email();

    let payload = json!({
        "full_name": "First Registration",
        "email": email,
        "password": "test-password-123",
    });

    let first = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&payload)
        .send()
        .await
        .expect("request failed");
    assert_eq!(first.status().as_u16(), 201);

    let second = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&payload)
        .send()
        .await
        .expect("request failed");
    assert_eq!(second.status().as_u16(), 409);

    // The first registration still logs in; its record was not altered.
    let login = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": "test-password-123" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(login.status().as_u16(), 200);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_missing_fields_is_400() {
    let client = client();
    let resp = client
        .post(format!("{}/api/auth/register", api_base_url()))
        .json(&json!({ "email": unique_email() }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_failures_share_one_message() {
    let client = client();
    let base_url = api_base_url();
    let (email, _token) = register_user(&client).await;

    // Wrong password on an existing account.
    let wrong_password = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(wrong_password.status().as_u16(), 401);
    let wrong_password: Value = wrong_password.json().await.expect("not JSON");

    // Nonexistent account entirely.
    let no_account = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": unique_email(), "password": "whatever" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(no_account.status().as_u16(), 401);
    let no_account: Value = no_account.json().await.expect("not JSON");

    // Identical messages: the response must not reveal which field was wrong.
    assert_eq!(wrong_password["message"], no_account["message"]);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_profile_round_trip() {
    let client = client();
    let base_url = api_base_url();
    let (_email, token) = register_user(&client).await;

    let resp = client
        .put(format!("{base_url}/api/auth/profile"))
        .bearer_auth(&token)
        .json(&json!({ "current_location": "Mumbai" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status().as_u16(), 200);

    let profile = client
        .get(format!("{base_url}/api/auth/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    let body: Value = profile.json().await.expect("not JSON");
    assert_eq!(body["user"]["current_location"], "Mumbai");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_verify_and_logout() {
    let client = client();
    let base_url = api_base_url();
    let (email, token) = register_user(&client).await;

    let verify = client
        .get(format!("{base_url}/api/auth/verify"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    assert_eq!(verify.status().as_u16(), 200);
    let body: Value = verify.json().await.expect("not JSON");
    assert_eq!(body["user"]["email"], email.to_lowercase());

    let logout = client
        .post(format!("{base_url}/api/auth/logout"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(logout.status().as_u16(), 200);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_protected_route_rejects_missing_and_bad_tokens() {
    let client = client();
    let base_url = api_base_url();

    let missing = client
        .get(format!("{base_url}/api/cart"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(missing.status().as_u16(), 401);

    let garbage = client
        .get(format!("{base_url}/api/cart"))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .expect("request failed");
    assert_eq!(garbage.status().as_u16(), 401);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_admin_routes_need_admin() {
    let client = client();
    let base_url = api_base_url();

    // Unauthenticated: 401.
    let anonymous = client
        .get(format!("{base_url}/api/admin/orders"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(anonymous.status().as_u16(), 401);

    // Authenticated non-admin: 403.
    let (_email, token) = register_user(&client).await;
    let non_admin = client
        .get(format!("{base_url}/api/admin/orders"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    assert_eq!(non_admin.status().as_u16(), 403);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_delete_account() {
    let client = client();
    let base_url = api_base_url();
    let (email, token) = register_user(&client).await;

    let resp = client
        .delete(format!("{base_url}/api/auth/delete-account"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status().as_u16(), 200);

    // The account is gone; logging in again answers the uniform message.
    let login = client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": "test-password-123" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(login.status().as_u16(), 401);
}
