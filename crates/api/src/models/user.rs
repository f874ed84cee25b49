//! User domain model.

use serde::{Deserialize, Serialize};

use addressbook_core::UserId;

/// A person in the address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier.
    pub id: UserId,
    #[sqlx(rename = "firstname")]
    pub first_name: String,
    #[sqlx(rename = "lastname")]
    pub last_name: String,
}

impl User {
    /// Create a user with a freshly generated ID.
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User {
            id: UserId::parse_str("493adb28-9da1-4db8-893d-73cc2d7bd4ee").unwrap(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["id"], "493adb28-9da1-4db8-893d-73cc2d7bd4ee");
        assert_eq!(value["firstName"], "Test");
        assert_eq!(value["lastName"], "User");
    }
}
