//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Path normalization (trailing slash trimmed, applied by the binary)
//! 2. Sentry hub per request, then Sentry HTTP transaction
//! 3. Set request ID (`x-request-id`, generated unless supplied)
//! 4. `TraceLayer` (one span per request, named with the request ID)
//! 5. Propagate request ID to the response
//! 6. Sentry scope tag for the request ID

pub mod request_id;

use axum::Router;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use request_id::{REQUEST_ID_HEADER, request_id_header, request_span, tag_sentry_scope};

/// Wrap a router with error tracking, request tracing and request IDs.
///
/// With `Router::layer` the last layer added is the outermost.
pub fn apply(router: Router) -> Router {
    router
        .layer(axum::middleware::from_fn(tag_sentry_scope))
        .layer(PropagateRequestIdLayer::new(request_id_header()))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
        .layer(sentry_tower::NewSentryLayer::new_from_top())
}
