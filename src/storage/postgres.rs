use crate::models::UrlRecord;
use crate::storage::trait_def::unix_now;
use crate::storage::{Storage, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS urls (
                id BIGINT PRIMARY KEY,
                original_url TEXT NOT NULL UNIQUE,
                created_at BIGINT NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn insert_next(&self, original_url: &str) -> StorageResult<UrlRecord> {
        let created_at = unix_now()?;

        // Two writers computing the same MAX(id) collide on the primary key
        // and the loser surfaces as a Conflict.
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            INSERT INTO urls (id, original_url, created_at)
            SELECT COALESCE(MAX(id), 0) + 1, $1, $2 FROM urls
            RETURNING id, original_url, created_at
            "#,
        )
        .bind(original_url)
        .bind(created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn get(&self, id: i64) -> StorageResult<Option<UrlRecord>> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, original_url, created_at
            FROM urls
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn find_by_url(&self, original_url: &str) -> StorageResult<Option<UrlRecord>> {
        let record = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, original_url, created_at
            FROM urls
            WHERE original_url = $1
            "#,
        )
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn max_id(&self) -> StorageResult<i64> {
        let max = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(id), 0)::BIGINT FROM urls")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(max)
    }

    async fn list(&self, limit: i64, offset: i64) -> StorageResult<Vec<UrlRecord>> {
        let records = sqlx::query_as::<_, UrlRecord>(
            r#"
            SELECT id, original_url, created_at
            FROM urls
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(records)
    }
}
