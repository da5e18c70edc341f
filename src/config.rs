use anyhow::{Context, Result, bail};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// CLI arguments override `FOLDER_STORE_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    pub bucket: String,
    pub region: String,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Folder-manager API over a flat object store")]
pub struct Args {
    /// Host to bind to (overrides FOLDER_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides FOLDER_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where object payloads are stored (overrides FOLDER_STORE_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides FOLDER_STORE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Bucket to serve (overrides FOLDER_STORE_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Bucket region label (overrides FOLDER_STORE_REGION)
    #[arg(long)]
    pub region: Option<String>,
}

impl AppConfig {
    /// Merge CLI args over environment variables.
    ///
    /// Everything has a sensible default except the bucket name, which must
    /// be configured: a missing bucket is a configuration error raised here,
    /// before any store call.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();

        let env_host = env::var("FOLDER_STORE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("FOLDER_STORE_PORT") {
            Ok(value) => Some(
                value
                    .parse::<u16>()
                    .with_context(|| format!("parsing FOLDER_STORE_PORT value `{value}`"))?,
            ),
            Err(env::VarError::NotPresent) => None,
            Err(err) => return Err(err).context("reading FOLDER_STORE_PORT"),
        };
        let env_storage =
            env::var("FOLDER_STORE_STORAGE_DIR").unwrap_or_else(|_| "./data/objects".into());
        let env_db = env::var("FOLDER_STORE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/folder_store.db".into());
        let env_region = env::var("FOLDER_STORE_REGION").unwrap_or_else(|_| "local".into());

        let bucket = match args.bucket.or_else(|| env::var("FOLDER_STORE_BUCKET").ok()) {
            // a copy-pasted bucket value sometimes carries a trailing slash
            Some(name) => name.trim_end_matches('/').to_string(),
            None => bail!("bucket name is not configured (set FOLDER_STORE_BUCKET or --bucket)"),
        };

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.or(env_port).unwrap_or(3000),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            bucket,
            region: args.region.unwrap_or(env_region),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
