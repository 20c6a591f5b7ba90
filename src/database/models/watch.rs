use serde::{Deserialize, Serialize};

use crate::database::Document;

/// A product listing. The API never inspects its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watch(pub Document);
