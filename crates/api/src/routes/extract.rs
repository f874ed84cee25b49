//! Request extractors that reject with [`ApiError`].
//!
//! Path IDs are extracted before the body, so a malformed ID is reported
//! even when the body is malformed too.

use std::str::FromStr;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, MatchedPath, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A UUID-backed identifier taken from the `{id}` path segment.
#[derive(Debug, Clone, Copy)]
pub struct PathId<I>(pub I);

impl<I, S> FromRequestParts<S> for PathId<I>
where
    I: FromStr<Err = uuid::Error> + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = match Path::<String>::from_request_parts(parts, state).await {
            Ok(path) => path,
            Err(rejection) => {
                let raw = raw_id_segment(parts).unwrap_or_default();
                return Err(ApiError::invalid_id(raw, rejection.body_text()));
            }
        };

        raw.parse::<I>()
            .map(Self)
            .map_err(|err| ApiError::invalid_id(&raw, &err))
    }
}

/// The undecoded URI segment matched by the `{id}` route parameter.
fn raw_id_segment(parts: &Parts) -> Option<&str> {
    let pattern = parts.extensions.get::<MatchedPath>()?.as_str();
    pattern
        .split('/')
        .zip(parts.uri.path().split('/'))
        .find_map(|(expected, actual)| expected.starts_with('{').then_some(actual))
}

/// A JSON request body.
///
/// Any decoding failure, including a missing `Content-Type`, is a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| ApiError::invalid_body(&rejection))
    }
}
