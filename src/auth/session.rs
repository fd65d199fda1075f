//! Session Manager
//! Mission: Authenticate principals and track their sessions server-side

use crate::auth::identity::{verify_credential, IdentityStore};
use crate::auth::models::{Principal, School, Session};
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Login failure. Every cause maps to the same variant and message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials or school")]
    InvalidCredentials,
}

pub struct SessionManager {
    identities: Arc<IdentityStore>,
    sessions: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(identities: Arc<IdentityStore>, ttl: Duration) -> Self {
        Self {
            identities,
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn identities(&self) -> &IdentityStore {
        &self.identities
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Authenticate `username` with `secret` for `claimed_school`.
    ///
    /// The session is bound to the principal's recorded school, which the
    /// claim must equal exactly.
    pub fn login(
        &self,
        username: &str,
        secret: &str,
        claimed_school: &str,
    ) -> Result<Session, AuthError> {
        let claimed = School::from_str(claimed_school);

        let principal = match self.identities.find_by_username(username) {
            Some(p) => Some(p)
                .filter(|p| verify_credential(&p.credential, secret) && claimed == Some(p.school)),
            None => {
                self.identities.verify_unknown(secret);
                None
            }
        };

        let Some(principal) = principal else {
            warn!(username, "❌ Failed login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            principal_id: principal.id.clone(),
            school: principal.school,
            issued_at: now,
            expires_at: now + self.ttl,
        };

        self.sessions.write().insert(session.id, session.clone());

        info!(
            username,
            school = %principal.school,
            rank = %principal.rank,
            session = %session.id,
            "✅ Login successful"
        );

        Ok(session)
    }

    /// Drop a session. Unknown or already-removed ids are not an error.
    pub fn logout(&self, session_id: &Uuid) -> bool {
        let removed = self.sessions.write().remove(session_id).is_some();
        if removed {
            info!(session = %session_id, "👋 Logged out");
        } else {
            debug!(session = %session_id, "Logout for unknown session");
        }
        removed
    }

    /// The live session with this id, if any. Expired sessions are evicted.
    pub fn session(&self, session_id: &Uuid) -> Option<Session> {
        let now = Utc::now();
        let session = self.sessions.read().get(session_id).cloned()?;

        if session.is_expired_at(now) {
            self.sessions.write().remove(session_id);
            debug!(session = %session_id, "Session expired");
            return None;
        }

        Some(session)
    }

    /// Resolve a session id to its session and principal.
    pub fn resolve(&self, session_id: &Uuid) -> Option<(Session, Principal)> {
        let session = self.session(session_id)?;
        let principal = self.identities.find_by_id(&session.principal_id)?.clone();
        Some((session, principal))
    }

    pub fn current_principal(&self, session_id: &Uuid) -> Option<Principal> {
        self.resolve(session_id).map(|(_, principal)| principal)
    }

    /// Remove every expired session, returning how many were dropped.
    pub fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        before - sessions.len()
    }

    pub fn active_count(&self) -> usize {
        self.sessions.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Rank;

    fn create_test_manager(ttl: Duration) -> SessionManager {
        SessionManager::new(Arc::new(IdentityStore::seeded()), ttl)
    }

    #[test]
    fn test_login_binds_session_to_school() {
        let manager = create_test_manager(Duration::hours(1));

        let session = manager.login("Geralt", "witcher123", "Wolf").unwrap();
        assert_eq!(session.school, School::Wolf);
        assert_eq!(session.principal_id, "1");
        assert!(session.expires_at > session.issued_at);

        let principal = manager.current_principal(&session.id).unwrap();
        assert_eq!(principal.username, "Geralt");
        assert_eq!(principal.rank, Rank::Master);
    }

    #[test]
    fn test_all_failures_are_identical() {
        let manager = create_test_manager(Duration::hours(1));

        let wrong_secret = manager.login("Geralt", "wrong", "Wolf").unwrap_err();
        let wrong_school = manager.login("Geralt", "witcher123", "Griffin").unwrap_err();
        let unknown_school = manager.login("Geralt", "witcher123", "Crane").unwrap_err();
        let unknown_user = manager.login("Vesemir", "witcher123", "Wolf").unwrap_err();

        assert_eq!(wrong_secret, AuthError::InvalidCredentials);
        assert_eq!(wrong_secret, wrong_school);
        assert_eq!(wrong_school, unknown_school);
        assert_eq!(unknown_school, unknown_user);
        assert_eq!(wrong_secret.to_string(), unknown_user.to_string());
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_bcrypt_table_fails_unknown_users_uniformly() {
        use crate::auth::models::{Credential, Profile};

        let coen = Principal {
            id: "8".to_string(),
            username: "Coen".to_string(),
            display_name: "Coen".to_string(),
            credential: Credential::Bcrypt(bcrypt::hash("griffin", 4).unwrap()),
            rank: Rank::Master,
            school: School::Griffin,
            profile: Profile::default(),
        };
        let manager = SessionManager::new(
            Arc::new(IdentityStore::from_principals([coen]).unwrap()),
            Duration::hours(1),
        );

        assert!(manager.login("Coen", "griffin", "Griffin").is_ok());
        assert_eq!(
            manager.login("Eskel", "griffin", "Griffin").unwrap_err(),
            manager.login("Coen", "wolf", "Griffin").unwrap_err()
        );
        assert_eq!(manager.active_count(), 1);
    }

    #[test]
    fn test_logout_is_idempotent() {
        let manager = create_test_manager(Duration::hours(1));
        let session = manager.login("Geralt", "witcher123", "Wolf").unwrap();

        assert!(manager.logout(&session.id));
        assert!(!manager.logout(&session.id));
        assert!(!manager.logout(&Uuid::new_v4()));
        assert!(manager.current_principal(&session.id).is_none());
    }

    #[test]
    fn test_expired_session_has_no_principal() {
        let manager = create_test_manager(Duration::zero());
        let session = manager.login("Geralt", "witcher123", "Wolf").unwrap();

        assert!(manager.current_principal(&session.id).is_none());
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_prune_expired() {
        let manager = create_test_manager(Duration::zero());
        manager.login("Geralt", "witcher123", "Wolf").unwrap();
        manager.login("Geralt", "witcher123", "Wolf").unwrap();

        assert_eq!(manager.active_count(), 2);
        assert_eq!(manager.prune_expired(), 2);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_each_login_is_a_separate_session() {
        let manager = create_test_manager(Duration::hours(1));
        let a = manager.login("Geralt", "witcher123", "Wolf").unwrap();
        let b = manager.login("Geralt", "witcher123", "Wolf").unwrap();

        assert_ne!(a.id, b.id);
        manager.logout(&a.id);
        assert!(manager.session(&b.id).is_some());
    }
}
