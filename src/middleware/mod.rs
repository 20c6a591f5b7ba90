pub mod auth;

pub use auth::{extract_bearer_token, verify_token};
