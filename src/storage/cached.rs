use crate::models::UrlRecord;
use crate::storage::{Storage, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;

/// Read-through cache in front of another storage backend.
///
/// Records never change once written, so only hits are cached and nothing is
/// ever invalidated. Misses always reach the inner backend, which keeps ids
/// assigned by other processes visible.
pub struct CachedStorage {
    /// Underlying storage implementation
    inner: Arc<dyn Storage>,
    /// Records by identifier
    by_id: Cache<i64, UrlRecord>,
    /// Identifiers by original URL
    by_url: Cache<String, UrlRecord>,
}

impl CachedStorage {
    pub fn new(inner: Arc<dyn Storage>, max_cache_entries: u64) -> Self {
        Self {
            inner,
            by_id: Cache::new(max_cache_entries),
            by_url: Cache::new(max_cache_entries),
        }
    }

    async fn remember(&self, record: &UrlRecord) {
        self.by_id.insert(record.id, record.clone()).await;
        self.by_url
            .insert(record.original_url.clone(), record.clone())
            .await;
    }
}

#[async_trait]
impl Storage for CachedStorage {
    async fn init(&self) -> Result<()> {
        self.inner.init().await
    }

    async fn insert_next(&self, original_url: &str) -> StorageResult<UrlRecord> {
        let record = self.inner.insert_next(original_url).await?;
        self.remember(&record).await;
        Ok(record)
    }

    async fn get(&self, id: i64) -> StorageResult<Option<UrlRecord>> {
        if let Some(cached) = self.by_id.get(&id).await {
            return Ok(Some(cached));
        }

        let result = self.inner.get(id).await?;
        if let Some(record) = &result {
            self.remember(record).await;
        }

        Ok(result)
    }

    async fn find_by_url(&self, original_url: &str) -> StorageResult<Option<UrlRecord>> {
        if let Some(cached) = self.by_url.get(original_url).await {
            return Ok(Some(cached));
        }

        let result = self.inner.find_by_url(original_url).await?;
        if let Some(record) = &result {
            self.remember(record).await;
        }

        Ok(result)
    }

    async fn max_id(&self) -> StorageResult<i64> {
        self.inner.max_id().await
    }

    async fn list(&self, limit: i64, offset: i64) -> StorageResult<Vec<UrlRecord>> {
        self.inner.list(limit, offset).await
    }
}
