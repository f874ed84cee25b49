//! Integration tests for the user endpoints.
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
async fn test_create_get_update_user() {
    let client = client();
    let created = create_user(&client, "Grace", "Hopper").await;
    let id = id_of(&created);
    assert!(Uuid::parse_str(&id).is_ok());

    let resp = client.get(url(&format!("/users/{id}"))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched, created);

    let resp = client
        .put(url(&format!("/users/{id}")))
        .json(&json!({ "firstName": "Rear Admiral", "lastName": "Hopper" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["id"], id);
    assert_eq!(updated["firstName"], "Rear Admiral");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_list_users_contains_created() {
    let client = client();
    let created = create_user(&client, "Listed", "User").await;

    let resp = client.get(url("/users")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<Value> = resp.json().await.unwrap();
    assert!(users.contains(&created));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_get_user_invalid_and_missing() {
    let client = client();

    let resp = client.get(url("/users/bob")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Id [bob] is not a valid UUID");

    let missing = Uuid::new_v4();
    let resp = client
        .get(url(&format!("/users/{missing}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], format!("No user exists with Id [{missing}]"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_create_user_invalid_body() {
    let client = client();

    let resp = client
        .post(url("/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid request body.");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_delete_user_removes_addresses() {
    let client = client();
    let user = create_user(&client, "Doomed", "User").await;
    let user_id = id_of(&user);
    let first = id_of(&create_address(&client, &user_id, "home").await);
    let second = id_of(&create_address(&client, &user_id, "work").await);

    let resp = client
        .delete(url(&format!("/users/{user_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    for address_id in [first, second] {
        let resp = client
            .get(url(&format!("/addresses/{address_id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    let resp = client
        .get(url(&format!("/users/{user_id}/addresses")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .delete(url(&format!("/users/{user_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_delete_user_while_addresses_are_added() {
    let client = client();

    for _ in 0..25 {
        let user_id = id_of(&create_user(&client, "Racing", "User").await);

        let add = client
            .post(url("/addresses"))
            .json(&json!({ "userId": user_id, "street": "1 Race St" }))
            .send();
        let delete = client.delete(url(&format!("/users/{user_id}"))).send();
        let (added, deleted) = tokio::join!(add, delete);
        let (added, deleted) = (added.unwrap(), deleted.unwrap());

        // The delete always wins or waits; it never fails on the new row
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        match added.status() {
            StatusCode::CREATED => {
                let address: Value = added.json().await.unwrap();
                let resp = client
                    .get(url(&format!("/addresses/{}", id_of(&address))))
                    .send()
                    .await
                    .unwrap();
                assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            }
            status => assert_eq!(status, StatusCode::NOT_FOUND),
        }
    }
}
