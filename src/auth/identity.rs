//! Identity Store
//! Mission: Immutable table of known principals, built once at startup

use crate::auth::models::{Credential, Principal, Profile, Rank, School};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

lazy_static! {
    // Checked against when a username is unknown, so a miss costs one bcrypt verify
    static ref UNKNOWN_PRINCIPAL_HASH: String =
        bcrypt::hash("unknown-principal", bcrypt::DEFAULT_COST).unwrap_or_default();
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("failed to read identity table {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse identity table {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("duplicate username in identity table: {0}")]
    DuplicateUsername(String),

    #[error("duplicate principal id in identity table: {0}")]
    DuplicateId(String),
}

/// On-disk identity table: a list of `[[principal]]` tables.
#[derive(Debug, Deserialize)]
struct IdentityFile {
    #[serde(default)]
    principal: Vec<Principal>,
}

/// Read-only principal lookup
#[derive(Debug)]
pub struct IdentityStore {
    by_username: HashMap<String, Principal>,
    id_to_username: HashMap<String, String>,
    has_bcrypt: bool,
}

impl IdentityStore {
    /// Build the table, rejecting repeated usernames or ids.
    pub fn from_principals(
        principals: impl IntoIterator<Item = Principal>,
    ) -> Result<Self, IdentityError> {
        let mut by_username = HashMap::new();
        let mut id_to_username = HashMap::new();
        let mut has_bcrypt = false;

        for principal in principals {
            if by_username.contains_key(&principal.username) {
                return Err(IdentityError::DuplicateUsername(principal.username));
            }
            if id_to_username.contains_key(&principal.id) {
                return Err(IdentityError::DuplicateId(principal.id));
            }
            if matches!(principal.credential, Credential::Plain(_)) {
                warn!(
                    "⚠️  Principal {} uses a plaintext credential, prefer a bcrypt hash",
                    principal.username
                );
            }
            has_bcrypt |= matches!(principal.credential, Credential::Bcrypt(_));
            id_to_username.insert(principal.id.clone(), principal.username.clone());
            by_username.insert(principal.username.clone(), principal);
        }

        if has_bcrypt {
            lazy_static::initialize(&UNKNOWN_PRINCIPAL_HASH);
        }

        Ok(Self {
            by_username,
            id_to_username,
            has_bcrypt,
        })
    }

    /// Load principals from a TOML identity file.
    pub fn from_toml_file(path: &Path) -> Result<Self, IdentityError> {
        let raw = std::fs::read_to_string(path).map_err(|source| IdentityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: IdentityFile = toml::from_str(&raw).map_err(|source| IdentityError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::from_principals(file.principal)?;
        info!(
            "🔐 Loaded {} principals from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Built-in table used when no identity file is configured.
    pub fn seeded() -> Self {
        let geralt = Principal {
            id: "1".to_string(),
            username: "Geralt".to_string(),
            display_name: "Geralt of Rivia".to_string(),
            credential: Credential::Plain("witcher123".to_string()),
            rank: Rank::Master,
            school: School::Wolf,
            profile: Profile {
                signs: ["Igni", "Aard", "Quen", "Axii", "Yrden"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                stats: [
                    ("Vitality", "3500"),
                    ("Toxicity", "80"),
                    ("Experience", "12000"),
                    ("Level", "22"),
                ]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            },
        };

        Self {
            id_to_username: HashMap::from([(geralt.id.clone(), geralt.username.clone())]),
            by_username: HashMap::from([(geralt.username.clone(), geralt)]),
            has_bcrypt: false,
        }
    }

    pub fn find_by_username(&self, username: &str) -> Option<&Principal> {
        self.by_username.get(username)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Principal> {
        self.id_to_username
            .get(id)
            .and_then(|username| self.by_username.get(username))
    }

    /// Spend the work of a credential check for a username that is not in
    /// the table. Always fails.
    ///
    /// Only tables holding bcrypt entries pay for it; plain comparisons are
    /// already constant-cost either way.
    pub fn verify_unknown(&self, secret: &str) -> bool {
        if self.has_bcrypt {
            let _ = bcrypt::verify(secret, &UNKNOWN_PRINCIPAL_HASH);
        }
        false
    }

    pub fn has_bcrypt(&self) -> bool {
        self.has_bcrypt
    }

    pub fn len(&self) -> usize {
        self.by_username.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_username.is_empty()
    }
}

/// Check a presented secret against a stored credential.
pub fn verify_credential(credential: &Credential, secret: &str) -> bool {
    match credential {
        Credential::Plain(expected) => expected == secret,
        Credential::Bcrypt(hash) => bcrypt::verify(secret, hash).unwrap_or_else(|e| {
            warn!("Failed to verify bcrypt credential: {}", e);
            false
        }),
    }
}
