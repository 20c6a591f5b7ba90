use serde::{Deserialize, Serialize};

use crate::database::Document;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Review(pub Document);
