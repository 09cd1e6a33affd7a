//! CLI administration tool for url-cache.
//!
//! Provides commands for inspecting and maintaining the cache without
//! going through the HTTP service.
//!
//! # Usage
//!
//! ```bash
//! # Try to cache a URL
//! cargo run --bin admin -- store "https://example.com/build.log"
//!
//! # Check whether a URL is cached
//! cargo run --bin admin -- check "https://example.com/build.log"
//!
//! # Resolve a URL to its cached address (signed when --ttl is given)
//! cargo run --bin admin -- resolve "https://example.com/build.log" --ttl 60
//!
//! # Dump cached contents to a file
//! cargo run --bin admin -- fetch "https://example.com/build.log" -o build.log
//!
//! # Delete every cached object (prompts for confirmation)
//! cargo run --bin admin -- empty
//! ```
//!
//! # Environment Variables
//!
//! Same as the service; `CACHE_BUCKET_NAME` is required.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

use url_cache::application::services::{StoreOutcome, UrlCache, UrlResolver};
use url_cache::config;
use url_cache::domain::{AddressSigner, CredentialProvider, ObjectStore};
use url_cache::infrastructure::credentials::MetadataCredentials;
use url_cache::infrastructure::signing::GcsV4Signer;
use url_cache::infrastructure::storage::GcsStore;

/// CLI tool for managing url-cache.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Try to cache a URL's contents
    Store {
        /// The URL to cache
        url: String,
    },

    /// Check whether a URL is cached
    Check {
        /// The URL to check
        url: String,
    },

    /// Resolve a URL to the address of its cached copy
    Resolve {
        /// The URL to resolve
        url: String,

        /// Signed-address lifetime in seconds (omit for a durable address)
        #[arg(short, long)]
        ttl: Option<u64>,
    },

    /// Dump the cached contents of a URL
    Fetch {
        /// The URL to fetch from the cache
        url: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete every object in the cache
    Empty {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let credentials: Arc<dyn CredentialProvider> =
        Arc::new(MetadataCredentials::new(http.clone()));

    let store: Arc<dyn ObjectStore> = match &config.storage_endpoint {
        Some(endpoint) => Arc::new(GcsStore::with_endpoint(
            http.clone(),
            credentials.clone(),
            config.bucket_name.clone(),
            endpoint.clone(),
        )),
        None => Arc::new(GcsStore::new(
            http.clone(),
            credentials.clone(),
            config.bucket_name.clone(),
        )),
    };

    let signer: Arc<dyn AddressSigner> = Arc::new(GcsV4Signer::new(
        http,
        credentials,
        config.bucket_name.clone(),
    ));

    let cache = UrlCache::new(
        store.clone(),
        config.max_store_size,
        config.sample_suffix.clone(),
        Duration::from_secs(config.fetch_timeout_seconds),
    )?;

    let resolver = UrlResolver::new(store, signer, config.bucket_name.clone());

    match cli.command {
        Commands::Store { url } => {
            let outcome = cache.store(&url).await;
            match outcome {
                StoreOutcome::Stored => println!("{} {url}", "Cached:".green().bold()),
                StoreOutcome::SkippedExisting => {
                    println!("{} {url}", "Already cached:".yellow())
                }
                StoreOutcome::SkippedSampling => {
                    println!("{} {url}", "Not sampled:".yellow())
                }
                StoreOutcome::SkippedTooLarge => {
                    println!("{} {url}", "Too large:".red())
                }
                StoreOutcome::FailedFetch => {
                    println!("{} {url}", "Fetch failed:".red().bold())
                }
            }
        }

        Commands::Check { url } => {
            if cache.is_stored(&url).await? {
                println!("{} {url}", "Cached:".green().bold());
            } else {
                println!("{} {url}", "Not cached:".yellow());
            }
        }

        Commands::Resolve { url, ttl } => {
            let ttl = ttl.map(Duration::from_secs);
            match resolver.resolve(&url, ttl).await? {
                Some(address) => println!("{}", address.url()),
                None => {
                    println!("{} {url}", "Not cached:".yellow());
                    std::process::exit(1);
                }
            }
        }

        Commands::Fetch { url, output } => {
            let contents = cache
                .fetch(&url)
                .await?
                .context("URL is not cached")?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, &contents).await?;
                    println!(
                        "{} {} bytes -> {}",
                        "Wrote".green().bold(),
                        contents.len(),
                        path.display()
                    );
                }
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&contents)?;
                }
            }
        }

        Commands::Empty { yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!(
                        "Delete ALL cached objects in bucket '{}'?",
                        config.bucket_name
                    ))
                    .default(false)
                    .interact()?;

            if !confirmed {
                println!("{}", "Aborted.".yellow());
                return Ok(());
            }

            let deleted = cache.empty().await?;
            println!("{} {deleted} objects", "Deleted".green().bold());
        }
    }

    Ok(())
}
