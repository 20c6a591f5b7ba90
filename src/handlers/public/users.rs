use axum::{
    extract::{Path, State},
    Json,
};

use crate::database::models::{AdminStatus, User};
use crate::database::record::{from_document, to_document};
use crate::database::{Collection, Document, Filter, InsertOneResult, SharedStore, UpdateResult};
use crate::error::ApiError;

/// GET /user/:email (and /users/:email) - whether the account is an admin.
/// Unknown accounts are simply not admins.
pub async fn admin_status(
    State(store): State<SharedStore>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatus>, ApiError> {
    let user = store
        .find_one(Collection::Users, &Filter::field("email", email))
        .await?;

    let admin = match user {
        Some(document) => from_document::<User>(document)?.is_admin(),
        None => false,
    };

    Ok(Json(AdminStatus { admin }))
}

/// POST /users - signup
pub async fn create(
    State(store): State<SharedStore>,
    Json(user): Json<User>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let result = store
        .insert_one(Collection::Users, to_document(&user)?)
        .await?;
    Ok(Json(result))
}

/// PUT /users - identity-provider sign-in, upserted by email
pub async fn upsert(
    State(store): State<SharedStore>,
    Json(user): Json<User>,
) -> Result<Json<UpdateResult>, ApiError> {
    let filter = Filter::field("email", user.email.clone());
    let result = store
        .update_one(Collection::Users, &filter, to_document(&user)?, true)
        .await?;
    Ok(Json(result))
}

/// GET /all-users
pub async fn list(State(store): State<SharedStore>) -> Result<Json<Vec<Document>>, ApiError> {
    let users = store.find_all(Collection::Users, &Filter::All).await?;
    Ok(Json(users))
}
