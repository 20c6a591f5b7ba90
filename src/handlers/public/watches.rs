use axum::{
    extract::{Path, State},
    Json,
};

use crate::database::models::Watch;
use crate::database::{
    Collection, DeleteResult, Document, Filter, InsertOneResult, RecordId, SharedStore,
};
use crate::error::ApiError;

/// POST /add-watch
pub async fn create(
    State(store): State<SharedStore>,
    Json(Watch(watch)): Json<Watch>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let result = store.insert_one(Collection::Watches, watch).await?;
    Ok(Json(result))
}

/// GET /watches
pub async fn list(State(store): State<SharedStore>) -> Result<Json<Vec<Document>>, ApiError> {
    let watches = store.find_all(Collection::Watches, &Filter::All).await?;
    Ok(Json(watches))
}

/// GET /watch/:id - `null` when no such watch
pub async fn get(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, ApiError> {
    let id: RecordId = id.parse()?;
    let watch = store
        .find_one(Collection::Watches, &Filter::id(id))
        .await?;
    Ok(Json(watch))
}

/// DELETE /watch/:id
pub async fn delete(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id: RecordId = id.parse()?;
    let result = store
        .delete_one(Collection::Watches, &Filter::id(id))
        .await?;
    Ok(Json(result))
}
