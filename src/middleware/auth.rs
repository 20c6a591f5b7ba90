use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::SharedVerifier;

/// Bearer token middleware. Fail-open: a request whose token is absent or fails
/// verification continues without a `VerifiedIdentity` extension, and handlers
/// decide what an anonymous caller may do.
pub async fn verify_token(
    State(verifier): State<SharedVerifier>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer_token(request.headers()) {
        match verifier.verify(&token).await {
            Ok(identity) => {
                tracing::debug!("Verified token for {}", identity.email);
                request.extensions_mut().insert(identity);
            }
            Err(e) => {
                tracing::debug!("Token rejected, continuing unauthenticated: {}", e);
            }
        }
    }

    next.run(request).await
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
