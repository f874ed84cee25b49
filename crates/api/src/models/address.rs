//! Address domain model.

use serde::{Deserialize, Serialize};

use addressbook_core::{AddressId, UserId};

/// A postal address owned by a user.
///
/// Every text field is free-form; only the owner is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Server-assigned identifier.
    pub id: AddressId,
    /// Owning user.
    pub user_id: UserId,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Free-form label such as "home" or "work".
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}
