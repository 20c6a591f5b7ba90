use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{AuthError, IdentityVerifier, VerifiedIdentity};

pub const GOOGLE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const DEFAULT_KEY_MAX_AGE: Duration = Duration::from_secs(60 * 60);
/// An unknown `kid` only triggers a refetch once the cached set is this old.
const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);
const CLOCK_SKEW_SECS: i64 = 60;

/// Claims of a Firebase ID token that matter here.
#[derive(Debug, Deserialize)]
pub struct FirebaseClaims {
    #[serde(default)]
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub auth_time: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
    max_age: Duration,
}

impl CachedKeys {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.max_age
    }

    fn recently_fetched(&self) -> bool {
        self.fetched_at.elapsed() < MIN_REFETCH_INTERVAL
    }
}

/// Verifies Firebase Authentication ID tokens against Google's published keys.
pub struct FirebaseVerifier {
    project_id: String,
    jwks_url: String,
    http: reqwest::Client,
    keys: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            project_id: project_id.into(),
            jwks_url: GOOGLE_JWKS_URL.to_string(),
            http,
            keys: RwLock::new(None),
        })
    }

    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    /// Seed the key cache, skipping the first fetch.
    pub fn with_keys(self, keys: JwkSet, max_age: Duration) -> Self {
        Self {
            keys: RwLock::new(Some(CachedKeys {
                keys,
                fetched_at: Instant::now(),
                max_age,
            })),
            ..self
        }
    }

    pub fn issuer(&self) -> String {
        format!("{ISSUER_PREFIX}{}", self.project_id)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "iat", "aud", "iss", "sub"]);
        validation.leeway = CLOCK_SKEW_SECS as u64;
        validation
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.keys.read().await;
            if let Some(cached) = cache.as_ref().filter(|cached| cached.is_fresh()) {
                if let Some(jwk) = cached.keys.find(kid) {
                    return Ok(DecodingKey::from_jwk(jwk)?);
                }
                if cached.recently_fetched() {
                    return Err(AuthError::UnknownKey(kid.to_string()));
                }
            }
        }

        // Stale cache, or a rotated key after the refetch interval
        let fresh = self.fetch_keys().await?;
        let key = fresh.keys.find(kid).map(DecodingKey::from_jwk).transpose()?;
        *self.keys.write().await = Some(fresh);

        key.ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }

    async fn fetch_keys(&self) -> Result<CachedKeys, AuthError> {
        tracing::debug!("Fetching token signing keys from {}", self.jwks_url);

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?;
        let max_age = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_max_age)
            .unwrap_or(DEFAULT_KEY_MAX_AGE);
        let keys: JwkSet = response.json().await?;

        tracing::debug!("Cached {} signing keys for {:?}", keys.keys.len(), max_age);
        Ok(CachedKeys {
            keys,
            fetched_at: Instant::now(),
            max_age,
        })
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", header.alg)));
        }
        let kid = header.kid.ok_or(AuthError::MissingKid)?;

        let key = self.decoding_key(&kid).await?;
        let data = decode::<FirebaseClaims>(token, &key, &self.validation())?;

        identity_from_claims(data.claims, Utc::now().timestamp())
    }
}

/// Checks the library does not perform: issue times and the presence of a subject and email.
pub fn identity_from_claims(
    claims: FirebaseClaims,
    now: i64,
) -> Result<VerifiedIdentity, AuthError> {
    if claims.iat > now + CLOCK_SKEW_SECS {
        return Err(AuthError::IssuedInFuture);
    }
    if matches!(claims.auth_time, Some(t) if t > now + CLOCK_SKEW_SECS) {
        return Err(AuthError::IssuedInFuture);
    }
    if claims.sub.trim().is_empty() {
        return Err(AuthError::MissingSubject);
    }

    let email = claims
        .email
        .filter(|email| !email.is_empty())
        .ok_or(AuthError::MissingEmail)?;

    Ok(VerifiedIdentity {
        uid: claims.sub,
        email,
    })
}

/// `max-age` directive of a `Cache-Control` header.
fn parse_max_age(header: &str) -> Option<Duration> {
    header.split(',').find_map(|directive| {
        let (name, value) = directive.trim().split_once('=')?;
        if name.trim().eq_ignore_ascii_case("max-age") {
            value.trim().parse().ok().map(Duration::from_secs)
        } else {
            None
        }
    })
}
