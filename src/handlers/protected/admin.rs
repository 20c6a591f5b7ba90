use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;

use crate::auth::VerifiedIdentity;
use crate::database::models::{AdminPromotion, Role, User};
use crate::database::record::from_document;
use crate::database::{Collection, Document, Filter, SharedStore};
use crate::error::ApiError;

/// PUT /users/admin - promote another account to admin.
///
/// Callers without a verified identity get a 403 before the body is looked at.
/// A verified caller who is not an admin (or has no user record) gets an empty
/// 200 and nothing changes. Only an admin's request reaches the store update.
pub async fn make_admin(
    State(store): State<SharedStore>,
    identity: Option<Extension<VerifiedIdentity>>,
    body: Result<Json<AdminPromotion>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Some(Extension(identity)) = identity else {
        return Err(ApiError::forbidden("you do not have access to make admin"));
    };
    let promotion = match body {
        Ok(Json(promotion)) => promotion,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let requester = store
        .find_one(Collection::Users, &Filter::field("email", identity.email.clone()))
        .await?
        .map(from_document::<User>)
        .transpose()?;

    if !requester.is_some_and(|user| user.is_admin()) {
        tracing::info!(
            "Ignoring admin promotion of {} requested by non-admin {}",
            promotion.email,
            identity.email
        );
        return Ok(StatusCode::OK.into_response());
    }

    let mut update = Document::new();
    update.insert("role".to_string(), json!(Role::Admin));

    let result = store
        .update_one(
            Collection::Users,
            &Filter::field("email", promotion.email.clone()),
            update,
            false,
        )
        .await?;

    tracing::info!("{} promoted {} to admin", identity.email, promotion.email);
    Ok(Json(result).into_response())
}
