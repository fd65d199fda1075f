//! HTTP API
//! Mission: Route table, per-group guards and shared handler state

pub mod pages;
pub mod reviews;

use crate::auth::{
    api as auth_api,
    models::{Rank, School},
    require_guard, AuthState, Guard, GuardState,
};
use crate::middleware::request_logging;
use crate::store::{ReviewCollection, StoreError};
use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

/// Application state shared by the guarded handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub reviews: ReviewCollection,
}

impl AppState {
    pub fn new(auth: AuthState, reviews: ReviewCollection) -> Self {
        Self { auth, reviews }
    }
}

fn guarded(router: Router<AppState>, auth: &AuthState, guard: Guard) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        GuardState::new(auth.clone(), guard),
        require_guard,
    ))
}

/// Build the full route table.
pub fn build_router(state: AppState) -> Router {
    let auth = state.auth.clone();

    let public: Router = Router::new()
        .route("/", get(auth_api::index))
        .route("/login", get(auth_api::login_form).post(auth_api::login))
        .route("/logout", post(auth_api::logout))
        .with_state(auth.clone())
        .route("/health", get(pages::health))
        .route("/alchemy", get(pages::alchemy));

    let members = guarded(
        Router::new()
            .route("/profile", get(pages::profile))
            .route("/witcher/stats", get(pages::witcher_stats))
            .route(
                "/reviews",
                get(reviews::list_reviews).post(reviews::post_review),
            ),
        &auth,
        Guard::authenticated(),
    );

    let masters = guarded(
        Router::new()
            .route("/contracts", get(pages::contracts))
            .route("/contracts/report", get(pages::contracts_report)),
        &auth,
        Guard::authenticated().rank_at_least(Rank::Master),
    );

    let wolves = guarded(
        Router::new().route("/kaermorhen", get(pages::kaermorhen)),
        &auth,
        Guard::authenticated().school(School::Wolf),
    );

    Router::new()
        .merge(members)
        .merge(masters)
        .merge(wolves)
        .with_state::<()>(state)
        .merge(public)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Handler errors
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(StoreError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Store(e @ StoreError::DuplicateKey(_)) => (StatusCode::CONFLICT, e.to_string()),
            ApiError::Store(e @ StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, e.to_string()),
            ApiError::Store(e) => {
                error!("Store failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                error!("Internal failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
