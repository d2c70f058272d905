//! Defines routes for the carousel registry.
//!
//! ## Structure
//! - **Admin endpoints**
//!   - `POST   /admin/carousel` — multipart upload batch with expiry date
//!   - `GET    /admin/carousel` — list every entry with derived status
//!   - `DELETE /admin/carousel/{stored_name}` — remove one entry
//!   - `POST   /admin/carousel/clean` — expiry/dedup reconciliation
//!   - `POST   /admin/carousel/regenerate` — rebuild index from backend
//!
//! - **Public endpoints**
//!   - `GET /carousel` — active entries for homepage rendering
//!   - `GET /carousel/{stored_name}` — image bytes (local display path)

use crate::{
    handlers::{
        carousel_handlers::{
            carousel_image, clean_assets, delete_asset, list_assets, public_carousel,
            regenerate_assets, upload_assets,
        },
        health_handlers::{healthz, readyz},
    },
    services::registry_service::RegistryService,
};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Build and return the router for all carousel routes.
///
/// The router carries shared state (`RegistryService`) to all handlers.
pub fn routes() -> Router<RegistryService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Admin routes
        .route("/admin/carousel", post(upload_assets).get(list_assets))
        .route("/admin/carousel/clean", post(clean_assets))
        .route("/admin/carousel/regenerate", post(regenerate_assets))
        .route("/admin/carousel/{stored_name}", delete(delete_asset))
        // Public routes
        .route("/carousel", get(public_carousel))
        .route("/carousel/{stored_name}", get(carousel_image))
}
