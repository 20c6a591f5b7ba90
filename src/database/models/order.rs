use serde::{Deserialize, Serialize};

use crate::database::Document;

/// An order as placed by the storefront. `status` is free text and absent
/// until an operator sets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub payload: Document,
}

/// Body of `PUT /update-status/:id`. A missing status is stored as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
}
