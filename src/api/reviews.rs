//! Review endpoints - GET/POST /reviews

use crate::api::{ApiError, AppState};
use crate::auth::ActiveSession;
use crate::store::reviews::parse_rating;
use crate::store::{ReviewEntry, StoreError};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

/// Rating as sent by a client: a JSON number or the form's string value.
/// Anything else is kept so it can be rejected as a validation error.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RatingInput {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub contract_name: String,
    pub rating: Option<RatingInput>,
    #[serde(default)]
    pub comment: String,
}

impl ReviewRequest {
    fn rating(&self) -> Result<i64, StoreError> {
        match &self.rating {
            Some(RatingInput::Number(n)) => Ok(*n),
            Some(RatingInput::Text(raw)) => parse_rating(raw).map(i64::from),
            Some(RatingInput::Other(value)) => Err(StoreError::Validation(format!(
                "rating must be an integer between 1 and 5, got {}",
                value
            ))),
            None => Err(StoreError::Validation("rating is required".to_string())),
        }
    }
}

/// GET /reviews
pub async fn list_reviews(State(state): State<AppState>) -> Result<Json<Vec<ReviewEntry>>, ApiError> {
    let reviews = state.reviews.clone();
    let entries = tokio::task::spawn_blocking(move || reviews.list_all())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(entries))
}

/// POST /reviews
pub async fn post_review(
    State(state): State<AppState>,
    Extension(active): Extension<ActiveSession>,
    Json(payload): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<ReviewEntry>), ApiError> {
    let rating = payload.rating()?;
    let reviews = state.reviews.clone();

    let entry = tokio::task::spawn_blocking(move || {
        reviews.append(&payload.contract_name, rating, &payload.comment)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    tracing::debug!(
        author = %active.principal.username,
        contract = %entry.contract_name,
        "Review accepted"
    );

    Ok((StatusCode::CREATED, Json(entry)))
}
