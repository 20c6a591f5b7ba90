#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use watch_hut_api::app::{app, AppState};
use watch_hut_api::auth::{AuthError, IdentityVerifier, VerifiedIdentity};
use watch_hut_api::config::SecurityConfig;
use watch_hut_api::database::{MemoryDocumentStore, SharedStore};

pub const ADMIN_EMAIL: &str = "boss@watchhut.com";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_EMAIL: &str = "buyer@example.com";
pub const USER_TOKEN: &str = "user-token";

/// Accepts two fixed tokens; everything else fails verification.
pub struct FakeVerifier;

#[async_trait]
impl IdentityVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let (uid, email) = match token {
            ADMIN_TOKEN => ("admin-uid", ADMIN_EMAIL),
            USER_TOKEN => ("user-uid", USER_EMAIL),
            _ => return Err(AuthError::MissingKid),
        };
        Ok(VerifiedIdentity {
            uid: uid.to_string(),
            email: email.to_string(),
        })
    }
}

/// One server per test, each with its own empty memory store.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: SharedStore,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store: SharedStore = Arc::new(MemoryDocumentStore::new());
        let state = AppState::new(store.clone(), Arc::new(FakeVerifier));
        let router = app(
            state,
            &SecurityConfig {
                cors_origins: Vec::new(),
            },
        );

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            store,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json(&self, path: &str) -> Result<(StatusCode, Value)> {
        let resp = self.client.get(self.url(path)).send().await?;
        let status = resp.status();
        Ok((status, resp.json().await?))
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        let status = resp.status();
        Ok((status, resp.json().await?))
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let resp = self.client.put(self.url(path)).json(body).send().await?;
        let status = resp.status();
        Ok((status, resp.json().await?))
    }

    pub async fn delete_json(&self, path: &str) -> Result<(StatusCode, Value)> {
        let resp = self.client.delete(self.url(path)).send().await?;
        let status = resp.status();
        Ok((status, resp.json().await?))
    }

    /// Insert a user through the signup endpoint.
    pub async fn seed_user(&self, email: &str, role: Option<&str>) -> Result<()> {
        let mut user = json!({ "email": email, "displayName": email });
        if let Some(role) = role {
            user["role"] = json!(role);
        }
        let (status, _) = self.post_json("/users", &user).await?;
        anyhow::ensure!(status == StatusCode::OK, "seeding {email} failed: {status}");
        Ok(())
    }
}
