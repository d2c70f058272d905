use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `local` or `s3`.
    pub storage_backend: String,
    /// Blob directory for the local backend.
    pub storage_dir: String,
    /// Bucket name for the s3 backend.
    pub s3_bucket: Option<String>,
    /// Region override for the s3 backend.
    pub s3_region: Option<String>,
    /// Base URL prepended to stored names for public display URLs
    /// (s3 backend only).
    pub public_base_url: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Carousel asset registry")]
pub struct Args {
    /// Host to bind to (overrides CAROUSEL_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CAROUSEL_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Storage backend, `local` or `s3` (overrides CAROUSEL_STORAGE_BACKEND)
    #[arg(long)]
    pub storage_backend: Option<String>,

    /// Directory where the local backend stores blobs (overrides CAROUSEL_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Bucket for the s3 backend (overrides CAROUSEL_S3_BUCKET)
    #[arg(long)]
    pub s3_bucket: Option<String>,

    /// Region for the s3 backend (overrides CAROUSEL_S3_REGION)
    #[arg(long)]
    pub s3_region: Option<String>,

    /// Public base URL for s3-backed display links (overrides CAROUSEL_PUBLIC_BASE_URL)
    #[arg(long)]
    pub public_base_url: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("CAROUSEL_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("CAROUSEL_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing CAROUSEL_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading CAROUSEL_PORT"),
        };
        let env_backend =
            env::var("CAROUSEL_STORAGE_BACKEND").unwrap_or_else(|_| "local".into());
        let env_storage_dir =
            env::var("CAROUSEL_STORAGE_DIR").unwrap_or_else(|_| "./data/carousel".into());
        let env_bucket = env::var("CAROUSEL_S3_BUCKET").ok();
        let env_region = env::var("CAROUSEL_S3_REGION").ok();
        let env_public_base = env::var("CAROUSEL_PUBLIC_BASE_URL").ok();

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_backend: args.storage_backend.unwrap_or(env_backend),
            storage_dir: args.storage_dir.unwrap_or(env_storage_dir),
            s3_bucket: args.s3_bucket.or(env_bucket),
            s3_region: args.s3_region.or(env_region),
            public_base_url: args.public_base_url.or(env_public_base),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
