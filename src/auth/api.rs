//! Authentication API Endpoints
//! Mission: Login entry point, login, logout and the root redirect

use crate::auth::{
    jwt::JwtHandler,
    middleware::{extract_session_id, resolve_session, LOGIN_PATH, SESSION_COOKIE},
    models::{LoginRequest, LoginResponse, PrincipalResponse, School},
    session::{AuthError, SessionManager},
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<SessionManager>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(sessions: Arc<SessionManager>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            sessions,
            jwt_handler,
        }
    }
}

/// Login entry point - GET /login
pub async fn login_form() -> Json<serde_json::Value> {
    let schools: Vec<&str> = School::ALL.iter().map(School::as_str).collect();
    Json(json!({
        "login": format!("POST {}", LOGIN_PATH),
        "fields": ["username", "password", "school"],
        "schools": schools,
    }))
}

/// Login endpoint - POST /login
///
/// A client holds one session at a time: a session it already presents is
/// revoked once the new login succeeds.
pub async fn login(
    State(state): State<AuthState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AuthApiError> {
    let session = state
        .sessions
        .login(&payload.username, &payload.password, &payload.school)?;

    if let Some(previous) = extract_session_id(&state, &headers) {
        state.sessions.logout(&previous);
    }

    let principal = state
        .sessions
        .identities()
        .find_by_id(&session.principal_id)
        .ok_or(AuthApiError::InternalError)?;

    let token = state.jwt_handler.generate_token(&session).map_err(|e| {
        error!("Failed to sign session token: {:#}", e);
        AuthApiError::InternalError
    })?;

    let expires_in = (session.expires_at - session.issued_at).num_seconds().max(0) as usize;
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, expires_in
    );

    let body = LoginResponse {
        token,
        expires_in,
        principal: PrincipalResponse::from_principal(principal),
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Logout endpoint - POST /logout
///
/// Always succeeds: a missing, expired or already-revoked session is fine.
pub async fn logout(State(state): State<AuthState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(session_id) = extract_session_id(&state, &headers) {
        state.sessions.logout(&session_id);
    }

    let expired_cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, expired_cookie)])
}

/// Root - GET /
pub async fn index(State(state): State<AuthState>, headers: HeaderMap) -> Redirect {
    if resolve_session(&state, &headers).is_some() {
        Redirect::to("/profile")
    } else {
        Redirect::to(LOGIN_PATH)
    }
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    InvalidCredentials,
    InternalError,
}

impl From<AuthError> for AuthApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AuthApiError::InvalidCredentials,
        }
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials.to_string(),
            ),
            AuthApiError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
