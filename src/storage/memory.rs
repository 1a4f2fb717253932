use crate::models::UrlRecord;
use crate::storage::trait_def::unix_now;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Index {
    by_id: BTreeMap<i64, UrlRecord>,
    by_url: HashMap<String, i64>,
    max_id: i64,
}

/// Volatile storage held in process memory.
///
/// Records live in an id-ordered map with a reverse index from URL to id, and
/// the running maximum is tracked so inserts never scan.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    index: RwLock<Index>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_next(&self, original_url: &str) -> StorageResult<UrlRecord> {
        let created_at = unix_now()?;
        let mut index = self.index.write().await;

        if index.by_url.contains_key(original_url) {
            return Err(StorageError::Conflict);
        }

        let id = index.max_id + 1;
        let record = UrlRecord {
            id,
            original_url: original_url.to_string(),
            created_at,
        };

        index.by_url.insert(original_url.to_string(), id);
        index.by_id.insert(id, record.clone());
        index.max_id = id;

        Ok(record)
    }

    async fn get(&self, id: i64) -> StorageResult<Option<UrlRecord>> {
        Ok(self.index.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_url(&self, original_url: &str) -> StorageResult<Option<UrlRecord>> {
        let index = self.index.read().await;
        Ok(index
            .by_url
            .get(original_url)
            .and_then(|id| index.by_id.get(id))
            .cloned())
    }

    async fn max_id(&self) -> StorageResult<i64> {
        Ok(self.index.read().await.max_id)
    }

    async fn list(&self, limit: i64, offset: i64) -> StorageResult<Vec<UrlRecord>> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);

        Ok(self
            .index
            .read()
            .await
            .by_id
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
