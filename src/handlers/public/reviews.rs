use axum::{extract::State, Json};

use crate::database::models::Review;
use crate::database::{Collection, Document, Filter, InsertOneResult, SharedStore};
use crate::error::ApiError;

/// POST /review
pub async fn create(
    State(store): State<SharedStore>,
    Json(Review(review)): Json<Review>,
) -> Result<Json<InsertOneResult>, ApiError> {
    let result = store.insert_one(Collection::Reviews, review).await?;
    Ok(Json(result))
}

/// GET /all-review
pub async fn list(State(store): State<SharedStore>) -> Result<Json<Vec<Document>>, ApiError> {
    let reviews = store.find_all(Collection::Reviews, &Filter::All).await?;
    Ok(Json(reviews))
}
