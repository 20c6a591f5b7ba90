use serde::{Deserialize, Serialize};

use crate::database::Document;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Any other role string, kept verbatim.
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(flatten)]
    pub profile: Document,
}

impl User {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Some(Role::Admin))
    }
}

/// Body of `PUT /users/admin`: the account to promote.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminPromotion {
    pub email: String,
}

/// Response of `GET /user/:email`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStatus {
    pub admin: bool,
}
