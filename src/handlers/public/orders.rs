use axum::{
    extract::{Path, State},
    Json,
};

use crate::database::models::{Order, StatusUpdate};
use crate::database::record::to_document;
use crate::database::{
    Collection, DeleteResult, Document, Filter, InsertOneResult, RecordId, SharedStore,
    UpdateResult,
};
use crate::error::ApiError;

/// POST /order-watch
pub async fn create(
    State(store): State<SharedStore>,
    Json(order): Json<Order>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let result = store
        .insert_one(Collection::Orders, to_document(&order)?)
        .await?;
    Ok(Json(result))
}

/// GET /orders
pub async fn list(State(store): State<SharedStore>) -> Result<Json<Vec<Document>>, ApiError> {
    let orders = store.find_all(Collection::Orders, &Filter::All).await?;
    Ok(Json(orders))
}

/// DELETE /orders/:id
pub async fn delete(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, ApiError> {
    let id: RecordId = id.parse()?;
    let result = store
        .delete_one(Collection::Orders, &Filter::id(id))
        .await?;
    Ok(Json(result))
}

/// PUT /update-status/:id - an unknown id creates a record holding only the status
pub async fn update_status(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<UpdateResult>, ApiError> {
    let id: RecordId = id.parse()?;
    let result = store
        .update_one(Collection::Orders, &Filter::id(id), to_document(&update)?, true)
        .await?;
    Ok(Json(result))
}
