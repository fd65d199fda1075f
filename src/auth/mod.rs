//! Authentication Module
//! Mission: Sessions for known principals, with rank and school gated routes

pub mod api;
pub mod guard;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod session;

pub use api::AuthState;
pub use guard::{AccessError, ActiveSession, Guard, Requirement};
pub use identity::IdentityStore;
pub use jwt::JwtHandler;
pub use middleware::{require_guard, GuardState};
pub use session::{AuthError, SessionManager};
