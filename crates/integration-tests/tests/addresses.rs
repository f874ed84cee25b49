//! Integration tests for the address endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p addressbook-api)

#![allow(clippy::unwrap_used)]

use addressbook_integration_tests::{client, create_address, create_user, id_of, url};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_address_lifecycle() {
    let client = client();
    let user_id = id_of(&create_user(&client, "Address", "Owner").await);
    let created = create_address(&client, &user_id, "home").await;
    let id = id_of(&created);
    assert_eq!(created["userId"], user_id);
    assert_eq!(created["type"], "home");

    let resp = client
        .get(url(&format!("/addresses/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched, created);

    let resp = client
        .get(url(&format!("/users/{user_id}/addresses")))
        .send()
        .await
        .unwrap();
    let owned: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(owned, vec![created]);

    let resp = client
        .delete(url(&format!("/addresses/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .get(url(&format!("/addresses/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_create_address_for_missing_user() {
    let client = client();
    let missing = Uuid::new_v4();

    let resp = client
        .post(url("/addresses"))
        .json(&json!({ "userId": missing, "city": "Nowhere" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], format!("No user exists with Id [{missing}]"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_update_address_reassigns_owner() {
    let client = client();
    let first = id_of(&create_user(&client, "First", "Owner").await);
    let second = id_of(&create_user(&client, "Second", "Owner").await);
    let id = id_of(&create_address(&client, &first, "home").await);

    let resp = client
        .put(url(&format!("/addresses/{id}")))
        .json(&json!({ "userId": second, "street": "2 Elm St", "type": "work" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["userId"], second);
    assert_eq!(updated["city"], "");

    let resp = client
        .get(url(&format!("/users/{first}/addresses")))
        .send()
        .await
        .unwrap();
    let owned: Vec<Value> = resp.json().await.unwrap();
    assert!(owned.is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_update_address_with_missing_user() {
    let client = client();
    let owner = id_of(&create_user(&client, "Stable", "Owner").await);
    let id = id_of(&create_address(&client, &owner, "home").await);
    let missing = Uuid::new_v4();

    let resp = client
        .put(url(&format!("/addresses/{id}")))
        .json(&json!({ "userId": missing }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], format!("No user exists with Id [{missing}]"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_get_address_invalid_id() {
    let client = client();

    let resp = client.get(url("/addresses/12345")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Id [12345] is not a valid UUID");
}
