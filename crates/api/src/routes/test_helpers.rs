//! Shared fixtures for handler tests.

#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::Value;
use tower::{Layer, ServiceExt};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use addressbook_core::{AddressId, UserId};

use crate::db::memory::MemoryRepository;
use crate::models::{Address, User};
use crate::state::AppState;

/// The full application over an in-memory store.
pub struct TestApp {
    pub repo: MemoryRepository,
    app: NormalizePath<Router>,
}

impl TestApp {
    pub fn new() -> Self {
        let repo = MemoryRepository::default();
        let state = AppState::new(repo.clone(), repo.clone());
        let router = crate::middleware::apply(super::router(state));
        let app = NormalizePathLayer::trim_trailing_slash().layer(router);

        Self { repo, app }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Send a request with an optional JSON body and collect the raw response body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Bytes) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.request(request).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes)
    }

    /// Like [`TestApp::send`] but parse the response as JSON. An empty body is `null`.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = self.send(method, uri, body).await;
        if bytes.is_empty() {
            return (status, Value::Null);
        }
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// IDs of the rows created by [`seeded`].
pub struct SeedIds {
    pub test_user: UserId,
    pub other_user: UserId,
    pub test_address: AddressId,
}

/// An app holding two users with one address each.
pub fn seeded() -> (TestApp, SeedIds) {
    let app = TestApp::new();

    let test_user = User::new("Test", "User");
    let other_user = User::new("Other", "Person");
    let test_address = Address {
        id: AddressId::new(),
        user_id: test_user.id,
        street: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zip: "62701".to_string(),
        kind: "home".to_string(),
    };
    let other_address = Address {
        id: AddressId::new(),
        user_id: other_user.id,
        street: "9 Side St".to_string(),
        city: "Shelbyville".to_string(),
        state: "IL".to_string(),
        zip: "62565".to_string(),
        kind: "work".to_string(),
    };

    let ids = SeedIds {
        test_user: test_user.id,
        other_user: other_user.id,
        test_address: test_address.id,
    };

    app.repo.seed_user(test_user);
    app.repo.seed_user(other_user);
    app.repo.seed_address(test_address);
    app.repo.seed_address(other_address);

    (app, ids)
}
