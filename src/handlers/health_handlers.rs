//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that round-trips the storage backend

use crate::services::registry_service::RegistryService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that performs a best-effort write/read/delete round
/// trip against the configured storage backend under a throwaway key.
///
/// Returns JSON describing the check. HTTP 200 when it passes,
/// HTTP 503 when it fails.
pub async fn readyz(State(service): State<RegistryService>) -> impl IntoResponse {
    let probe_key = format!(".readyz-{}", Uuid::new_v4());
    let backend = &service.backend;

    let backend_check = match backend
        .put(&probe_key, Bytes::from_static(b"readyz"), "text/plain")
        .await
    {
        Ok(_) => match backend.get(&probe_key).await {
            Ok(Some(bytes)) if bytes == Bytes::from_static(b"readyz") => {
                match backend.delete(&probe_key).await {
                    Ok(()) => (true, None::<String>),
                    Err(e) => (true, Some(format!("could not remove probe object: {e}"))),
                }
            }
            Ok(_) => {
                let _ = backend.delete(&probe_key).await; // best-effort cleanup
                (false, Some("probe object content mismatch".to_string()))
            }
            Err(e) => {
                let _ = backend.delete(&probe_key).await; // best-effort cleanup
                (false, Some(format!("could not read probe object: {e}")))
            }
        },
        Err(e) => (false, Some(format!("could not write probe object: {e}"))),
    };

    let backend_ok = backend_check.0;
    let mut checks = HashMap::new();
    checks.insert(
        "backend",
        CheckStatus {
            ok: backend_ok,
            error: backend_check.1,
        },
    );

    let body = ReadyResponse {
        status: if backend_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if backend_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}
