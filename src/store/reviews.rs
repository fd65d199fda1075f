//! Contract Reviews
//! Mission: Append-only collection of contract ratings backed by a JSON file

use super::{DocumentStore, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// One stored review. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub contract_name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Check a numeric rating against the 1..=5 scale.
pub fn validate_rating(rating: i64) -> Result<u8, StoreError> {
    if (MIN_RATING as i64..=MAX_RATING as i64).contains(&rating) {
        Ok(rating as u8)
    } else {
        Err(StoreError::Validation(format!(
            "rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, rating
        )))
    }
}

/// Parse a rating submitted as text. Only the bare digits "1" through "5" are accepted.
pub fn parse_rating(raw: &str) -> Result<u8, StoreError> {
    match raw.trim() {
        digit @ ("1" | "2" | "3" | "4" | "5") => Ok(digit.as_bytes()[0] - b'0'),
        other => Err(StoreError::Validation(format!(
            "rating must be one of 1-5, got '{}'",
            other
        ))),
    }
}

/// Reviews file handle.
#[derive(Clone)]
pub struct ReviewCollection {
    store: DocumentStore<Vec<ReviewEntry>>,
}

impl ReviewCollection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: DocumentStore::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Validate and append a review, rewriting the whole file.
    ///
    /// Validation happens before the file is read, so a rejected review
    /// never touches disk.
    pub fn append(
        &self,
        contract_name: &str,
        rating: i64,
        comment: &str,
    ) -> Result<ReviewEntry, StoreError> {
        let contract_name = contract_name.trim();
        if contract_name.is_empty() {
            return Err(StoreError::Validation(
                "contract name must not be blank".to_string(),
            ));
        }
        let rating = validate_rating(rating)?;

        let entry = ReviewEntry {
            contract_name: contract_name.to_string(),
            rating,
            comment: comment.trim().to_string(),
        };

        let total = self.store.update(|reviews| {
            reviews.push(entry.clone());
            Ok(reviews.len())
        })?;

        info!(
            contract = %entry.contract_name,
            rating = entry.rating,
            total,
            "📝 Review stored"
        );

        Ok(entry)
    }

    /// Every review in append order.
    pub fn list_all(&self) -> Result<Vec<ReviewEntry>, StoreError> {
        self.store.load()
    }
}
