//! Address route handlers.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use addressbook_core::{AddressId, UserId};

use super::extract::{JsonBody, PathId};
use crate::db::{AddressRepository, UserRepository};
use crate::error::{ApiError, Result};
use crate::models::Address;
use crate::response::PrettyJson;
use crate::state::AppState;

/// Request body for creating or replacing an address.
///
/// Only `userId` is required. Missing or null text fields are stored as
/// empty strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressBody {
    pub user_id: UserId,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl AddressBody {
    fn into_address(self, id: AddressId) -> Address {
        Address {
            id,
            user_id: self.user_id,
            street: self.street.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            zip: self.zip.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
        }
    }
}

/// `GET /addresses` - list every address.
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_addresses<U: UserRepository, A: AddressRepository>(
    State(state): State<AppState<U, A>>,
) -> Result<PrettyJson<Vec<Address>>> {
    let addresses = state
        .addresses()
        .list_addresses()
        .await
        .map_err(|e| ApiError::from_repository(e, "Error fetching address records"))?;

    Ok(PrettyJson(addresses))
}

/// `GET /addresses/{id}` - fetch one address.
///
/// # Errors
///
/// Returns 400 for a malformed ID, 404 if the address does not exist, 500 if
/// the store fails.
pub async fn get_address<U: UserRepository, A: AddressRepository>(
    State(state): State<AppState<U, A>>,
    PathId(id): PathId<AddressId>,
) -> Result<PrettyJson<Address>> {
    let address = state.addresses().get_address(id).await.map_err(|e| {
        ApiError::from_repository(e, format!("Error fetching address record with Id [{id}]"))
    })?;

    Ok(PrettyJson(address))
}

/// `GET /users/{id}/addresses` - list the addresses owned by one user.
///
/// # Errors
///
/// Returns 400 for a malformed ID, 404 if the user does not exist, 500 if
/// the store fails.
pub async fn list_addresses_for_user<U: UserRepository, A: AddressRepository>(
    State(state): State<AppState<U, A>>,
    PathId(user_id): PathId<UserId>,
) -> Result<PrettyJson<Vec<Address>>> {
    let addresses = state
        .addresses()
        .list_addresses_for_user(user_id)
        .await
        .map_err(|e| {
            ApiError::from_repository(
                e,
                format!("Error fetching address records for user [{user_id}]"),
            )
        })?;

    Ok(PrettyJson(addresses))
}

/// `POST /addresses` - create an address for an existing user.
///
/// # Errors
///
/// Returns 400 for an invalid body, 404 if the owning user does not exist,
/// 500 if the store fails.
pub async fn create_address<U: UserRepository, A: AddressRepository>(
    State(state): State<AppState<U, A>>,
    JsonBody(body): JsonBody<AddressBody>,
) -> Result<(StatusCode, PrettyJson<Address>)> {
    let address = body.into_address(AddressId::new());

    let created = state
        .addresses()
        .insert_address(&address)
        .await
        .map_err(|e| ApiError::from_repository(e, "Error creating new address"))?;

    tracing::info!(address_id = %created.id, user_id = %created.user_id, "Address created");
    Ok((StatusCode::CREATED, PrettyJson(created)))
}

/// `PUT /addresses/{id}` - replace every field of an address.
///
/// The address may be moved to another existing user.
///
/// # Errors
///
/// Returns 400 for a malformed ID or body, 404 if the address or the owning
/// user does not exist, 500 if the store fails.
pub async fn update_address<U: UserRepository, A: AddressRepository>(
    State(state): State<AppState<U, A>>,
    PathId(id): PathId<AddressId>,
    JsonBody(body): JsonBody<AddressBody>,
) -> Result<PrettyJson<Address>> {
    let address = body.into_address(id);

    let updated = state
        .addresses()
        .update_address(&address)
        .await
        .map_err(|e| {
            ApiError::from_repository(e, format!("Error updating address record with Id [{id}]"))
        })?;

    Ok(PrettyJson(updated))
}

/// `DELETE /addresses/{id}` - delete one address.
///
/// # Errors
///
/// Returns 400 for a malformed ID, 404 if the address does not exist, 500 if
/// the store fails.
pub async fn delete_address<U: UserRepository, A: AddressRepository>(
    State(state): State<AppState<U, A>>,
    PathId(id): PathId<AddressId>,
) -> Result<StatusCode> {
    state.addresses().delete_address(id).await.map_err(|e| {
        ApiError::from_repository(e, format!("Error deleting address record with Id [{id}]"))
    })?;

    tracing::info!(address_id = %id, "Address deleted");
    Ok(StatusCode::NO_CONTENT)
}
