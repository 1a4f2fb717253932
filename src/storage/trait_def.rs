use crate::models::UrlRecord;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Another writer stored the same URL or claimed the same id first.
    #[error("record already exists")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
            _ => StorageError::Other(err.into()),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn init(&self) -> Result<()>;

    /// Store `original_url` under `max(id) + 1` (or 1 when empty) and return the new record.
    ///
    /// Fails with [`StorageError::Conflict`] when the URL is already stored.
    async fn insert_next(&self, original_url: &str) -> StorageResult<UrlRecord>;

    /// Get a record by identifier
    async fn get(&self, id: i64) -> StorageResult<Option<UrlRecord>>;

    /// Get a record by its exact original URL
    async fn find_by_url(&self, original_url: &str) -> StorageResult<Option<UrlRecord>>;

    /// Highest identifier assigned so far, 0 when empty
    async fn max_id(&self) -> StorageResult<i64>;

    /// List records in identifier order
    async fn list(&self, limit: i64, offset: i64) -> StorageResult<Vec<UrlRecord>>;
}

pub(crate) fn unix_now() -> StorageResult<i64> {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| StorageError::Other(e.into()))?
        .as_secs();
    Ok(secs as i64)
}
