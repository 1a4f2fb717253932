pub mod cached;
pub mod memory;
pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use cached::CachedStorage;
pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{Storage, StorageError, StorageResult};

use crate::config::{CacheConfig, DatabaseBackend, DatabaseConfig};
use std::sync::Arc;

/// Connect to the configured backend, initialize it, and wrap it in the read cache.
pub async fn open(
    database: &DatabaseConfig,
    cache: &CacheConfig,
) -> anyhow::Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match database.backend {
        DatabaseBackend::Memory => {
            tracing::info!("Using in-memory storage; records are lost on restart");
            Arc::new(MemoryStorage::new())
        }
        DatabaseBackend::Sqlite => {
            tracing::info!("Using SQLite storage: {}", database.url);
            Arc::new(SqliteStorage::new(&database.url, database.max_connections).await?)
        }
        DatabaseBackend::Postgres => {
            tracing::info!("Using PostgreSQL storage");
            Arc::new(PostgresStorage::new(&database.url, database.max_connections).await?)
        }
    };

    storage.init().await?;

    if cache.max_entries == 0 || database.backend == DatabaseBackend::Memory {
        return Ok(storage);
    }

    Ok(Arc::new(CachedStorage::new(storage, cache.max_entries)))
}
