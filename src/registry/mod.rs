//! Identifier assignment and resolution.
//!
//! Identifiers are dense and start at 1. Each new one is derived from the
//! highest id already stored, so nothing besides the records themselves has
//! to survive a restart.

use crate::models::UrlRecord;
use crate::storage::{Storage, StorageError, StorageResult};
use crate::validator::ValidatedUrl;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Rounds of insert-then-reread before giving up on a contended insert.
const MAX_INSERT_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("identifier must be a positive integer")]
    InvalidIdentifier,
    #[error("no url registered under this identifier")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct Registry {
    storage: Arc<dyn Storage>,
    /// Serializes the check-then-insert sequence within this process
    write_lock: Mutex<()>,
}

impl Registry {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Register a validated URL, returning its existing identifier or a fresh one.
    pub async fn register(&self, url: &ValidatedUrl) -> StorageResult<i64> {
        let url = url.as_str();

        if let Some(existing) = self.storage.find_by_url(url).await? {
            return Ok(existing.id);
        }

        let _guard = self.write_lock.lock().await;

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            // Re-check under the lock: a concurrent caller may have just stored it
            if let Some(existing) = self.storage.find_by_url(url).await? {
                return Ok(existing.id);
            }

            match self.storage.insert_next(url).await {
                Ok(record) => {
                    tracing::info!(id = record.id, url = %record.original_url, "registered url");
                    return Ok(record.id);
                }
                // Another process sharing the store won the race for this URL or this id
                Err(StorageError::Conflict) => {
                    tracing::debug!(attempt, url, "insert conflicted, retrying");
                }
                Err(err) => return Err(err),
            }
        }

        Err(StorageError::Other(anyhow::anyhow!(
            "could not assign an identifier after {MAX_INSERT_ATTEMPTS} attempts"
        )))
    }

    /// Look up the original URL stored under `id`.
    pub async fn resolve(&self, id: i64) -> Result<String, ResolutionError> {
        if id < 1 {
            return Err(ResolutionError::InvalidIdentifier);
        }

        self.storage
            .get(id)
            .await?
            .map(|record| record.original_url)
            .ok_or(ResolutionError::NotFound)
    }

    /// Records in identifier order, for inspection.
    pub async fn list(&self, limit: i64, offset: i64) -> StorageResult<Vec<UrlRecord>> {
        self.storage.list(limit, offset).await
    }

    /// Highest identifier assigned so far.
    pub async fn last_id(&self) -> StorageResult<i64> {
        self.storage.max_id().await
    }
}

/// Parse a path segment as an identifier: decimal digits only, at least 1.
pub fn parse_identifier(raw: &str) -> Result<i64, ResolutionError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ResolutionError::InvalidIdentifier);
    }

    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ResolutionError::InvalidIdentifier),
    }
}
