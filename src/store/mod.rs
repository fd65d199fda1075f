//! Document Store Module
//! Mission: Durable JSON-file collections with no external database

pub mod document;
pub mod registry;
pub mod reviews;

use std::path::PathBuf;
use thiserror::Error;

pub use document::DocumentStore;
pub use registry::{Bestiary, Monster, RegistryCollection};
pub use reviews::{ReviewCollection, ReviewEntry};

/// Failures surfaced by the collection stores.
///
/// `Validation`, `DuplicateKey` and `NotFound` are caller-correctable and leave
/// the backing file untouched. `CorruptStore` and `Io` abort the operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("'{0}' already exists")]
    DuplicateKey(String),

    #[error("'{0}' not found")]
    NotFound(String),

    #[error("store file {} is corrupt: {source}", .path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode collection for {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// True for errors the caller can fix by changing the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_) | StoreError::DuplicateKey(_) | StoreError::NotFound(_)
        )
    }
}
