use anyhow::Result;
use axum::Router;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::backend::{LocalBackend, S3Backend, StorageBackend};
use crate::services::registry_service::RegistryService;

mod backend;
mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting carousel-registry with config: {:?}", cfg);

    // --- Construct the storage backend ---
    let backend: Arc<dyn StorageBackend> = match cfg.storage_backend.as_str() {
        "local" => {
            if !Path::new(&cfg.storage_dir).exists() {
                fs::create_dir_all(&cfg.storage_dir)?;
                tracing::info!("Created storage directory at {}", cfg.storage_dir);
            }
            Arc::new(LocalBackend::new(cfg.storage_dir.clone()))
        }
        "s3" => {
            let bucket = cfg
                .s3_bucket
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("CAROUSEL_S3_BUCKET is required for the s3 backend"))?;
            Arc::new(S3Backend::new(
                bucket,
                cfg.s3_region.as_deref(),
                cfg.public_base_url.clone(),
            )?)
        }
        other => anyhow::bail!("unknown storage backend `{}` (expected `local` or `s3`)", other),
    };

    // --- Initialize core service ---
    let registry = RegistryService::new(backend);

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(registry);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
