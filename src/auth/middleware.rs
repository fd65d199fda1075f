//! Authorization Middleware
//! Mission: Resolve the caller's session and enforce route guards before handlers run

use crate::auth::{
    api::AuthState,
    guard::{AccessError, ActiveSession, Guard},
};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::headers::{authorization::Bearer, Authorization, Cookie, HeaderMapExt};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";
pub const LOGIN_PATH: &str = "/login";

/// State for one guarded route group
#[derive(Clone)]
pub struct GuardState {
    pub auth: AuthState,
    pub guard: Arc<Guard>,
}

impl GuardState {
    pub fn new(auth: AuthState, guard: Guard) -> Self {
        Self {
            auth,
            guard: Arc::new(guard),
        }
    }
}

/// Session token from `Authorization: Bearer ...`, falling back to the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string());

    from_header.or_else(|| {
        headers
            .typed_get::<Cookie>()
            .and_then(|cookie| cookie.get(SESSION_COOKIE).map(str::to_string))
    })
}

/// Session id named by a validly signed, unexpired token.
pub fn extract_session_id(state: &AuthState, headers: &HeaderMap) -> Option<Uuid> {
    let token = extract_token(headers)?;
    let claims = state.jwt_handler.validate_token(&token).ok()?;
    Uuid::parse_str(&claims.sid).ok()
}

/// Resolve the request's token to a live session and its principal.
///
/// A token is only honored while its server-side session exists and still
/// matches the principal and school it was signed for.
pub fn resolve_session(state: &AuthState, headers: &HeaderMap) -> Option<ActiveSession> {
    let token = extract_token(headers)?;
    let claims = match state.jwt_handler.validate_token(&token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Rejected session token: {:#}", e);
            return None;
        }
    };

    let session_id = Uuid::parse_str(&claims.sid).ok()?;
    let (session, principal) = state.sessions.resolve(&session_id)?;

    if session.principal_id != claims.sub || session.school != claims.school {
        warn!(session = %session_id, "Session token does not match its session record");
        return None;
    }

    Some(ActiveSession { session, principal })
}

/// Guard middleware: authenticate, evaluate the route's guard, then hand the
/// resolved [`ActiveSession`] to the handler via request extensions.
pub async fn require_guard(
    State(state): State<GuardState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AccessError> {
    let active = resolve_session(&state.auth, req.headers());

    if let Err(denied) = state.guard.check(active.as_ref()) {
        match (&denied, &active) {
            (AccessError::Forbidden(requirement), Some(active)) => warn!(
                path = %req.uri().path(),
                principal = %active.principal.username,
                %requirement,
                "⛔ Access denied"
            ),
            _ => debug!(path = %req.uri().path(), "Unauthenticated request, redirecting to login"),
        }
        return Err(denied);
    }

    if let Some(active) = active {
        req.extensions_mut().insert(active);
    }

    Ok(next.run(req).await)
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        match self {
            AccessError::AuthenticationRequired => Redirect::to(LOGIN_PATH).into_response(),
            AccessError::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                "403 Access denied: you do not have permission to view this page",
            )
                .into_response(),
        }
    }
}
