//! Bearer-token identity verification.
//!
//! Verification never produces an HTTP error. A token that fails any check is
//! reported as an [`AuthError`] and the caller proceeds without an identity.

pub mod firebase;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AuthConfig;

pub use firebase::FirebaseVerifier;

/// Identity established from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token header has no key id")]
    MissingKid,

    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("No signing key with id {0}")]
    UnknownKey(String),

    #[error("Token issued in the future")]
    IssuedInFuture,

    #[error("Token has an empty subject")]
    MissingSubject,

    #[error("Token carries no email claim")]
    MissingEmail,

    #[error("Authentication disabled")]
    Disabled,

    #[error("Invalid service account: {0}")]
    InvalidServiceAccount(String),

    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(#[from] reqwest::Error),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

pub type SharedVerifier = Arc<dyn IdentityVerifier>;

/// Rejects every token. Used when `AUTH_DISABLED=true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledVerifier;

#[async_trait]
impl IdentityVerifier for DisabledVerifier {
    async fn verify(&self, _token: &str) -> Result<VerifiedIdentity, AuthError> {
        Err(AuthError::Disabled)
    }
}

pub fn verifier_from_config(config: &AuthConfig) -> Result<SharedVerifier, AuthError> {
    if config.disabled {
        tracing::warn!("Token verification disabled; admin promotion is unavailable");
        return Ok(Arc::new(DisabledVerifier));
    }

    let account = config.service_account.as_ref().ok_or_else(|| {
        AuthError::InvalidServiceAccount("FIREBASE_SERVICE_ACCOUNT not set".to_string())
    })?;
    tracing::info!("Verifying Firebase ID tokens for project {}", account.project_id);
    Ok(Arc::new(FirebaseVerifier::new(&account.project_id)?))
}
