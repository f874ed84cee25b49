//! Pretty-printed JSON responses.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// JSON response body rendered with indentation.
///
/// Behaves like [`axum::Json`] but uses `serde_json::to_vec_pretty`.
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec_pretty(&self.0) {
            Ok(bytes) => (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(JSON_CONTENT_TYPE),
                )],
                bytes,
            )
                .into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize response body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("text/plain; charset=utf-8"),
                    )],
                    err.to_string(),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pretty_json_is_indented() {
        let response = PrettyJson(serde_json::json!({ "message": "hi" })).into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("application/json"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"{\n  \"message\": \"hi\"\n}");
    }

    #[tokio::test]
    async fn test_empty_vec_renders_as_array() {
        let response = PrettyJson(Vec::<u8>::new()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"[]");
    }
}
