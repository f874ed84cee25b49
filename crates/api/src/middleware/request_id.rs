//! Request ID handling for request tracing and correlation.
//!
//! `tower-http` assigns the ID (keeping one supplied by an upstream proxy)
//! and copies it to the response. This module names the request span after
//! it and tags the per-request Sentry hub with it.

use axum::{
    body::Body,
    extract::Request,
    http::{self, HeaderName},
    middleware::Next,
    response::Response,
};
use tower_http::request_id::RequestId;
use tracing::Span;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header name form of [`REQUEST_ID_HEADER`].
#[must_use]
pub const fn request_id_header() -> HeaderName {
    HeaderName::from_static(REQUEST_ID_HEADER)
}

fn request_id_of<B>(request: &http::Request<B>) -> Option<&str> {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
}

/// Span for one request, carrying its method, URI and request ID.
pub fn request_span(request: &http::Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = request_id_of(request).unwrap_or_default(),
    )
}

/// Tag the request's Sentry scope with its request ID.
pub async fn tag_sentry_scope(request: Request, next: Next) -> Response {
    if let Some(id) = request_id_of(&request) {
        sentry::configure_scope(|scope| scope.set_tag("request_id", id));
    }
    next.run(request).await
}
