//! HTTP handlers for the carousel registry.
//!
//! The admin surface triggers Upload/Delete/Clean/Regenerate/List and
//! gets structured JSON results; the public surface gets active entries
//! and (for local storage) the image bytes themselves. All storage
//! concerns are delegated to `RegistryService`.

use crate::{
    errors::AppError,
    models::asset::{AssetEntry, content_type_for},
    services::registry_service::{
        AssetView, PublicAsset, RegistryService, UploadFailure,
    },
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub uploaded: usize,
    pub failures: Vec<UploadFailure>,
    pub entries: Vec<AssetEntry>,
}

#[derive(Serialize)]
pub struct CleanResponse {
    pub success: bool,
    pub message: String,
    pub removed_expired: usize,
    pub removed_duplicates: usize,
    pub remaining: usize,
}

#[derive(Serialize)]
pub struct RegenerateResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
    pub entries: Vec<AssetEntry>,
}

#[derive(Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub count: usize,
    pub entries: Vec<AssetView>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// `POST /admin/carousel` — multipart upload batch.
///
/// Expects repeated file parts plus one `expires` text field in
/// `YYYY-MM-DD` form applied to the whole batch.
pub async fn upload_assets(
    State(service): State<RegistryService>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut expires: Option<NaiveDate> = None;
    let mut files: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart body: {err}")))?
    {
        let name = field.name().map(str::to_string);
        if name.as_deref() == Some("expires") {
            let text = field
                .text()
                .await
                .map_err(|err| AppError::bad_request(format!("unreadable expires field: {err}")))?;
            let parsed = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| {
                AppError::bad_request(format!("invalid expiry date `{text}`, expected YYYY-MM-DD"))
            })?;
            expires = Some(parsed);
            continue;
        }

        // Any field carrying a filename is treated as an upload.
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|err| AppError::bad_request(format!("unreadable file `{filename}`: {err}")))?;
        files.push((filename, data));
    }

    let Some(expires) = expires else {
        return Err(AppError::bad_request("missing `expires` field"));
    };

    let outcome = service.upload(files, expires).await?;
    let message = if outcome.failures.is_empty() {
        format!("uploaded {} image(s)", outcome.uploaded)
    } else {
        format!(
            "uploaded {} image(s), {} rejected",
            outcome.uploaded,
            outcome.failures.len()
        )
    };
    Ok(Json(UploadResponse {
        success: true,
        message,
        uploaded: outcome.uploaded,
        failures: outcome.failures,
        entries: outcome.entries,
    }))
}

/// `GET /admin/carousel` — every entry with derived status.
pub async fn list_assets(
    State(service): State<RegistryService>,
) -> Result<impl IntoResponse, AppError> {
    let entries = service.list().await?;
    Ok(Json(ListResponse {
        success: true,
        count: entries.len(),
        entries,
    }))
}

/// `DELETE /admin/carousel/{stored_name}` — remove one entry.
pub async fn delete_asset(
    State(service): State<RegistryService>,
    Path(stored_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    service.delete(&stored_name).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: format!("deleted `{stored_name}`"),
    }))
}

/// `POST /admin/carousel/clean` — expiry/dedup reconciliation.
pub async fn clean_assets(
    State(service): State<RegistryService>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = service.clean().await?;
    Ok(Json(CleanResponse {
        success: true,
        message: format!(
            "removed {} expired and {} duplicate image(s), {} remaining",
            outcome.removed_expired, outcome.removed_duplicates, outcome.remaining
        ),
        removed_expired: outcome.removed_expired,
        removed_duplicates: outcome.removed_duplicates,
        remaining: outcome.remaining,
    }))
}

/// `POST /admin/carousel/regenerate` — rebuild the index from the backend.
pub async fn regenerate_assets(
    State(service): State<RegistryService>,
) -> Result<impl IntoResponse, AppError> {
    let entries = service.regenerate().await?;
    Ok(Json(RegenerateResponse {
        success: true,
        message: format!("rebuilt index with {} image(s)", entries.len()),
        count: entries.len(),
        entries,
    }))
}

/// `GET /carousel` — active entries for homepage rendering.
pub async fn public_carousel(
    State(service): State<RegistryService>,
) -> Result<Json<Vec<PublicAsset>>, AppError> {
    Ok(Json(service.list_active().await?))
}

/// `GET /carousel/{stored_name}` — serve image bytes (local display path).
pub async fn carousel_image(
    State(service): State<RegistryService>,
    Path(stored_name): Path<String>,
) -> Result<Response, AppError> {
    let Some(bytes) = service.fetch_image(&stored_name).await? else {
        return Err(AppError::not_found(format!("no image `{stored_name}`")));
    };

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&stored_name)),
    );
    Ok(response)
}
