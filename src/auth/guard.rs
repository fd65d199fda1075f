//! Access Guards
//! Mission: Composable rank and school checks evaluated before a handler runs
//!
//! A [`Guard`] is a plain value, so the policy of each route can be tested
//! without a server. The HTTP stage that applies it lives in
//! [`crate::auth::middleware`].

use crate::auth::models::{Principal, Rank, School, Session};
use std::fmt;
use thiserror::Error;

/// The authenticated context handed to protected handlers.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub session: Session,
    pub principal: Principal,
}

/// One authorization predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Authenticated,
    RankAtLeast(Rank),
    SchoolEquals(School),
}

impl Requirement {
    /// Evaluate against an existing session.
    pub fn is_met_by(&self, active: &ActiveSession) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::RankAtLeast(rank) => active.principal.rank >= *rank,
            // The school confirmed at login, not whatever the table says now
            Requirement::SchoolEquals(school) => active.session.school == *school,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Authenticated => write!(f, "authenticated"),
            Requirement::RankAtLeast(rank) => write!(f, "rank >= {}", rank),
            Requirement::SchoolEquals(school) => write!(f, "school == {}", school),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("Authentication required")]
    AuthenticationRequired,
    #[error("Insufficient permissions ({0})")]
    Forbidden(Requirement),
}

/// Conjunction of requirements. Authentication is always checked first,
/// then the rest in declaration order; the first failure wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guard {
    requirements: Vec<Requirement>,
}

impl Guard {
    pub fn authenticated() -> Self {
        Self {
            requirements: vec![Requirement::Authenticated],
        }
    }

    pub fn rank_at_least(mut self, rank: Rank) -> Self {
        self.requirements.push(Requirement::RankAtLeast(rank));
        self
    }

    pub fn school(mut self, school: School) -> Self {
        self.requirements.push(Requirement::SchoolEquals(school));
        self
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn check(&self, active: Option<&ActiveSession>) -> Result<(), AccessError> {
        let active = active.ok_or(AccessError::AuthenticationRequired)?;

        match self.requirements.iter().find(|r| !r.is_met_by(active)) {
            Some(failed) => Err(AccessError::Forbidden(*failed)),
            None => Ok(()),
        }
    }
}
