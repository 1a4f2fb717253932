use anyhow::Context;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub validation: ValidationConfig,
    #[serde(default)]
    pub redirect_status: RedirectMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Memory,
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entries per read cache; 0 disables caching
    pub max_entries: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Upper bound on a single host lookup
    pub dns_timeout_ms: u64,
}

/// HTTP status used when redirecting to a stored URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectMode {
    /// 302 Found
    #[default]
    Found,
    /// 307 Temporary Redirect
    Temporary,
    /// 308 Permanent Redirect
    Permanent,
}

impl RedirectMode {
    pub fn status_code(self) -> StatusCode {
        match self {
            RedirectMode::Found => StatusCode::FOUND,
            RedirectMode::Temporary => StatusCode::TEMPORARY_REDIRECT,
            RedirectMode::Permanent => StatusCode::PERMANENT_REDIRECT,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "found" | "302" => Some(RedirectMode::Found),
            "temporary" | "307" => Some(RedirectMode::Temporary),
            "permanent" | "308" => Some(RedirectMode::Permanent),
            _ => None,
        }
    }
}

impl DatabaseBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "memory" | "mem" => Some(DatabaseBackend::Memory),
            "sqlite" => Some(DatabaseBackend::Sqlite),
            "postgres" | "postgresql" => Some(DatabaseBackend::Postgres),
            _ => None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str =
            std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "memory".to_string());
        let backend = DatabaseBackend::parse(&backend_str).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown DATABASE_BACKEND '{backend_str}', falling back to 'memory'. \
                 Supported values: memory, sqlite, postgres"
            );
            DatabaseBackend::Memory
        });

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./seqlink.db?mode=rwc".to_string());
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let max_entries = std::env::var("CACHE_MAX_ENTRIES")
            .unwrap_or_else(|_| "10000".to_string())
            .parse::<u64>()
            .context("CACHE_MAX_ENTRIES must be a non-negative integer")?;

        let dns_timeout_ms = std::env::var("DNS_TIMEOUT_MS")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u64>()
            .context("DNS_TIMEOUT_MS must be a non-negative integer")?;

        let redirect_status = match std::env::var("REDIRECT_STATUS") {
            Ok(value) => RedirectMode::parse(&value).unwrap_or_else(|| {
                tracing::warn!(
                    "Unknown REDIRECT_STATUS '{value}', falling back to 'found'. \
                     Supported values: found, temporary, permanent"
                );
                RedirectMode::Found
            }),
            Err(_) => RedirectMode::default(),
        };

        let config = Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            server: ServerConfig { host, port },
            cache: CacheConfig { max_entries },
            validation: ValidationConfig { dns_timeout_ms },
            redirect_status,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be greater than 0");
        }

        // A zero timeout would reject every URL as unresolvable
        if self.validation.dns_timeout_ms == 0 {
            anyhow::bail!("DNS_TIMEOUT_MS must be greater than 0");
        }

        Ok(())
    }
}
