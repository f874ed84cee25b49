//! Integration tests for the address book API.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the server
//! cargo run -p addressbook-cli -- migrate
//! cargo run -p addressbook-api
//!
//! # Run integration tests against it
//! cargo test -p addressbook-integration-tests -- --ignored
//! ```
//!
//! Set `ADDRESSBOOK_BASE_URL` to target a server other than
//! `http://localhost:8080`.

#![allow(clippy::missing_panics_doc)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("ADDRESSBOOK_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Build an absolute URL for `path`.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// Create an HTTP client.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Test helper: create a user and return the response body.
pub async fn create_user(client: &Client, first_name: &str, last_name: &str) -> Value {
    let resp = client
        .post(url("/users"))
        .json(&json!({ "firstName": first_name, "lastName": last_name }))
        .send()
        .await
        .expect("Failed to create user");

    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to parse user")
}

/// Test helper: create an address for `user_id` and return the response body.
pub async fn create_address(client: &Client, user_id: &str, kind: &str) -> Value {
    let resp = client
        .post(url("/addresses"))
        .json(&json!({
            "userId": user_id,
            "street": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "zip": "62701",
            "type": kind,
        }))
        .send()
        .await
        .expect("Failed to create address");

    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Failed to parse address")
}

/// Test helper: the `id` field of a response body.
#[must_use]
pub fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("Missing id").to_string()
}
