//! User route handlers.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use addressbook_core::UserId;

use super::extract::{JsonBody, PathId};
use crate::db::{AddressRepository, UserRepository};
use crate::error::{ApiError, Result};
use crate::models::User;
use crate::response::PrettyJson;
use crate::state::AppState;

/// Request body for creating or replacing a user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub first_name: String,
    pub last_name: String,
}

/// `GET /users` - list every user.
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_users<U: UserRepository, A: AddressRepository>(
    State(state): State<AppState<U, A>>,
) -> Result<PrettyJson<Vec<User>>> {
    let users = state
        .users()
        .list_users()
        .await
        .map_err(|e| ApiError::from_repository(e, "Error fetching user records"))?;

    Ok(PrettyJson(users))
}

/// `GET /users/{id}` - fetch one user.
///
/// # Errors
///
/// Returns 400 for a malformed ID, 404 if the user does not exist, 500 if
/// the store fails.
pub async fn get_user<U: UserRepository, A: AddressRepository>(
    State(state): State<AppState<U, A>>,
    PathId(id): PathId<UserId>,
) -> Result<PrettyJson<User>> {
    let user = state.users().get_user(id).await.map_err(|e| {
        ApiError::from_repository(e, format!("Error fetching user record with Id [{id}]"))
    })?;

    Ok(PrettyJson(user))
}

/// `POST /users` - create a user with a server-assigned ID.
///
/// # Errors
///
/// Returns 400 for an invalid body, 500 if the store fails.
pub async fn create_user<U: UserRepository, A: AddressRepository>(
    State(state): State<AppState<U, A>>,
    JsonBody(body): JsonBody<UserBody>,
) -> Result<(StatusCode, PrettyJson<User>)> {
    let user = User::new(body.first_name, body.last_name);

    let created = state
        .users()
        .insert_user(&user)
        .await
        .map_err(|e| ApiError::from_repository(e, "Error creating new user"))?;

    tracing::info!(user_id = %created.id, "User created");
    Ok((StatusCode::CREATED, PrettyJson(created)))
}

/// `PUT /users/{id}` - replace a user's names.
///
/// # Errors
///
/// Returns 400 for a malformed ID or body, 404 if the user does not exist,
/// 500 if the store fails.
pub async fn update_user<U: UserRepository, A: AddressRepository>(
    State(state): State<AppState<U, A>>,
    PathId(id): PathId<UserId>,
    JsonBody(body): JsonBody<UserBody>,
) -> Result<PrettyJson<User>> {
    let user = User {
        id,
        first_name: body.first_name,
        last_name: body.last_name,
    };

    let updated = state.users().update_user(&user).await.map_err(|e| {
        ApiError::from_repository(e, format!("Error updating user record with Id [{id}]"))
    })?;

    Ok(PrettyJson(updated))
}

/// `DELETE /users/{id}` - delete a user and all of their addresses.
///
/// # Errors
///
/// Returns 400 for a malformed ID, 404 if the user does not exist, 500 if
/// the store fails.
pub async fn delete_user<U: UserRepository, A: AddressRepository>(
    State(state): State<AppState<U, A>>,
    PathId(id): PathId<UserId>,
) -> Result<StatusCode> {
    state.users().delete_user(id).await.map_err(|e| {
        ApiError::from_repository(e, format!("Error deleting user record with Id [{id}]"))
    })?;

    tracing::info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
