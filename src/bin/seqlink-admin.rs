use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use seqlink::config::Config;
use seqlink::registry::{parse_identifier, Registry, ResolutionError};
use seqlink::storage;
use seqlink::validator::{DnsResolver, Validator};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "seqlink-admin")]
#[command(about = "seqlink registry management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and register a URL, printing its identifier
    Register {
        /// URL to register
        url: String,
    },
    /// Print the URL stored under an identifier
    Resolve {
        /// Decimal identifier
        id: String,
    },
    /// List registered URLs in identifier order
    List {
        #[arg(long, default_value_t = 50)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage = storage::open(&config.database, &config.cache).await?;
    let registry = Registry::new(storage);

    match cli.command {
        Commands::Register { url } => {
            let validator = Validator::new(
                Arc::new(DnsResolver),
                Duration::from_millis(config.validation.dns_timeout_ms),
            );
            let validated = validator
                .validate(&url)
                .await
                .with_context(|| format!("'{url}' is not a valid url"))?;
            let id = registry.register(&validated).await?;
            println!("✓ {} -> {}", url, id);
        }
        Commands::Resolve { id } => {
            let resolved = match parse_identifier(&id) {
                Ok(id) => registry.resolve(id).await,
                Err(err) => Err(err),
            };
            match resolved {
                Ok(url) => println!("{}", url),
                Err(ResolutionError::Storage(err)) => return Err(err.into()),
                Err(err) => println!("⚠ {}: {}", id, err),
            }
        }
        Commands::List { limit, offset } => {
            let records = registry.list(limit, offset).await?;
            if records.is_empty() {
                println!("No URLs registered.");
            } else {
                println!("{:<10} {:<25} {}", "ID", "Created", "URL");
                println!("{}", "-".repeat(80));
                for record in records {
                    let created = DateTime::from_timestamp(record.created_at, 0)
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| record.created_at.to_string());
                    println!("{:<10} {:<25} {}", record.id, created, record.original_url);
                }
            }
        }
    }

    Ok(())
}
