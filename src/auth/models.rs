//! Authentication Models
//! Mission: Define principals, ranks, schools and sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Capability level. Declaration order is the rank ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Apprentice,
    Journeyman,
    Master,
}

impl Rank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Apprentice => "Apprentice",
            Rank::Journeyman => "Journeyman",
            Rank::Master => "Master",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "apprentice" => Some(Rank::Apprentice),
            "journeyman" => Some(Rank::Journeyman),
            "master" => Some(Rank::Master),
            _ => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Witcher school. The closed set of groups a principal can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum School {
    Wolf,
    Griffin,
    Cat,
    Bear,
    Viper,
    Manticore,
}

impl School {
    pub const ALL: [School; 6] = [
        School::Wolf,
        School::Griffin,
        School::Cat,
        School::Bear,
        School::Viper,
        School::Manticore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            School::Wolf => "Wolf",
            School::Griffin => "Griffin",
            School::Cat => "Cat",
            School::Bear => "Bear",
            School::Viper => "Viper",
            School::Manticore => "Manticore",
        }
    }

    /// Exact, case-sensitive match on the school name.
    pub fn from_str(s: &str) -> Option<Self> {
        School::ALL.into_iter().find(|school| school.as_str() == s)
    }
}

impl fmt::Display for School {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored login credential.
///
/// `Plain` is compared by exact equality and exists for parity with the seed
/// table. `Bcrypt` entries are verified against a bcrypt hash.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credential {
    Plain(String),
    Bcrypt(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Plain(_) => f.write_str("Credential::Plain(***)"),
            Credential::Bcrypt(_) => f.write_str("Credential::Bcrypt(***)"),
        }
    }
}

/// Signs and stats shown on the profile page. Opaque to authorization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub signs: Vec<String>,
    #[serde(default)]
    pub stats: BTreeMap<String, String>,
}

/// A known identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub credential: Credential, // never serialize
    pub rank: Rank,
    pub school: School,
    #[serde(default)]
    pub profile: Profile,
}

/// Server-side session record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub principal_id: String,
    pub school: School,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Signed session token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // principal id
    pub sid: String, // session id
    pub school: School,
    pub exp: usize, // expiration timestamp
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub school: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: usize, // seconds until expiration
    pub principal: PrincipalResponse,
}

/// Principal response (sanitized)
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalResponse {
    pub id: String,
    pub name: String,
    pub school: School,
    pub rank: Rank,
    pub signs: Vec<String>,
    pub stats: BTreeMap<String, String>,
}

impl PrincipalResponse {
    pub fn from_principal(principal: &Principal) -> Self {
        Self {
            id: principal.id.clone(),
            name: principal.display_name.clone(),
            school: principal.school,
            rank: principal.rank,
            signs: principal.profile.signs.clone(),
            stats: principal.profile.stats.clone(),
        }
    }
}
