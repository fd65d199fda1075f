//! Request logging middleware.
//!
//! One line per request with method, path, status, latency and how the
//! gate treated it.

use crate::auth::middleware::LOGIN_PATH;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// How a request ended, as far as the access gate is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Served,
    SentToLogin,
    Denied,
    Rejected,
    Failed,
}

impl Outcome {
    pub fn classify(response: &Response) -> Self {
        let status = response.status();
        if status.is_server_error() {
            return Outcome::Failed;
        }
        if status == StatusCode::FORBIDDEN {
            return Outcome::Denied;
        }
        if status == StatusCode::SEE_OTHER
            && response
                .headers()
                .get(header::LOCATION)
                .is_some_and(|loc| loc == LOGIN_PATH)
        {
            return Outcome::SentToLogin;
        }
        if status.is_client_error() {
            return Outcome::Rejected;
        }
        Outcome::Served
    }

    fn as_str(self) -> &'static str {
        match self {
            Outcome::Served => "served",
            Outcome::SentToLogin => "login_redirect",
            Outcome::Denied => "denied",
            Outcome::Rejected => "rejected",
            Outcome::Failed => "failed",
        }
    }
}

/// Log every request except health checks.
///
/// Login redirects and 403s are normal traffic on a gated site, so only 5xx
/// responses log at WARN.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if path == "/health" {
        return next.run(request).await;
    }

    let start = Instant::now();
    let response = next.run(request).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    let outcome = Outcome::classify(&response);

    match outcome {
        Outcome::Failed => warn!(
            %method, %path, status, latency_ms,
            outcome = outcome.as_str(),
            "Request failed"
        ),
        Outcome::SentToLogin => debug!(
            %method, %path, status, latency_ms,
            outcome = outcome.as_str(),
            "Request completed"
        ),
        _ => info!(
            %method, %path, status, latency_ms,
            outcome = outcome.as_str(),
            "Request completed"
        ),
    }

    response
}
