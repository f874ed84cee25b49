//! HTTP route handlers for the address book API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /ping                   - Liveness check, returns "pong"
//!
//! # Users
//! GET    /users                  - List all users
//! POST   /users                  - Create a user
//! GET    /users/{id}             - Fetch a user
//! PUT    /users/{id}             - Replace a user
//! DELETE /users/{id}             - Delete a user and their addresses
//! GET    /users/{id}/addresses   - List a user's addresses
//!
//! # Addresses
//! GET    /addresses              - List all addresses
//! POST   /addresses              - Create an address
//! GET    /addresses/{id}         - Fetch an address
//! PUT    /addresses/{id}         - Replace an address
//! DELETE /addresses/{id}         - Delete an address
//! ```
//!
//! `/health` and `/health/ready` are mounted by the binary since they need
//! the connection pool.

pub mod addresses;
pub mod extract;
pub mod users;

#[cfg(test)]
pub(crate) mod test_helpers;

use axum::{Router, routing::get};

use crate::db::{AddressRepository, UserRepository};
use crate::state::AppState;

/// Build the API router over the given repositories.
pub fn router<U: UserRepository, A: AddressRepository>(state: AppState<U, A>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route(
            "/users",
            get(users::list_users::<U, A>).post(users::create_user::<U, A>),
        )
        .route(
            "/users/{id}",
            get(users::get_user::<U, A>)
                .put(users::update_user::<U, A>)
                .delete(users::delete_user::<U, A>),
        )
        .route(
            "/users/{id}/addresses",
            get(addresses::list_addresses_for_user::<U, A>),
        )
        .route(
            "/addresses",
            get(addresses::list_addresses::<U, A>).post(addresses::create_address::<U, A>),
        )
        .route(
            "/addresses/{id}",
            get(addresses::get_address::<U, A>)
                .put(addresses::update_address::<U, A>)
                .delete(addresses::delete_address::<U, A>),
        )
        .with_state(state)
}

async fn ping() -> &'static str {
    "pong"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };

    use super::test_helpers::{TestApp, seeded};
    use crate::middleware::REQUEST_ID_HEADER;

    #[tokio::test]
    async fn test_ping() {
        let app = TestApp::new();

        let (status, raw) = app.send(Method::GET, "/ping", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(&raw[..], b"pong");
    }

    #[tokio::test]
    async fn test_trailing_slash_is_ignored() {
        let (app, ids) = seeded();

        let (status, _) = app.send(Method::GET, "/users/", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .send(Method::GET, &format!("/users/{}/addresses/", ids.test_user), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let app = TestApp::new();

        let (status, _) = app.send(Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.send(Method::PATCH, "/users", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let app = TestApp::new();

        let response = app
            .request(Request::get("/ping").body(Body::empty()).unwrap())
            .await;

        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let app = TestApp::new();

        let response = app
            .request(
                Request::get("/ping")
                    .header(REQUEST_ID_HEADER, "upstream-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            "upstream-123"
        );
    }

    #[test]
    fn test_error_events_carry_their_own_request_id() {
        let events = sentry::test::with_captured_events(|| {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let app = TestApp::new();
                app.repo.fail_all();

                for id in ["req-1", "req-2"] {
                    let response = app
                        .request(
                            Request::get("/users")
                                .header(REQUEST_ID_HEADER, id)
                                .body(Body::empty())
                                .unwrap(),
                        )
                        .await;
                    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
                }
            });
        });

        let tags: Vec<_> = events
            .iter()
            .map(|event| event.tags.get("request_id").map(String::as_str))
            .collect();
        assert_eq!(tags, [Some("req-1"), Some("req-2")]);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let app = TestApp::new();

        let response = app
            .request(
                Request::post("/users")
                    .body(Body::from(r#"{"firstName":"A","lastName":"B"}"#))
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
