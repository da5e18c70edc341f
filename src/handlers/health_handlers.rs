//! Health & readiness probes.
//!
//! - GET /healthz -> liveness, no I/O
//! - GET /readyz  -> readiness: SQLite ping plus a disk write/read/delete
//!   round trip under the payload root

use crate::services::folders::FolderService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::{collections::HashMap, path::Path};
use tokio::fs;
use uuid::Uuid;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<&'static str, CheckStatus>,
}

/// `GET /healthz` — always 200, never performs I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

async fn check_sqlite(service: &FolderService) -> Result<(), String> {
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&*service.store().db)
        .await
    {
        Ok(1) => Ok(()),
        Ok(other) => Err(format!("unexpected result: {other}")),
        Err(err) => Err(format!("error: {err}")),
    }
}

async fn check_disk(base: &Path) -> Result<(), String> {
    let tmp_path = base.join(format!(".readyz-{}", Uuid::new_v4()));
    fs::write(&tmp_path, b"readyz")
        .await
        .map_err(|err| format!("could not write tmp file: {err}"))?;
    let read_back = fs::read(&tmp_path).await;
    let _ = fs::remove_file(&tmp_path).await;
    match read_back {
        Ok(bytes) if bytes == b"readyz" => Ok(()),
        Ok(_) => Err("file content mismatch".to_string()),
        Err(err) => Err(format!("could not read tmp file: {err}")),
    }
}

/// `GET /readyz` — 200 when both checks pass, 503 otherwise.
pub async fn readyz(State(service): State<FolderService>) -> impl IntoResponse {
    let sqlite = check_sqlite(&service).await;
    let disk = check_disk(&service.store().base_path).await;
    let overall_ok = sqlite.is_ok() && disk.is_ok();

    let mut checks = HashMap::new();
    checks.insert(
        "sqlite",
        CheckStatus {
            ok: sqlite.is_ok(),
            error: sqlite.err(),
        },
    );
    checks.insert(
        "disk",
        CheckStatus {
            ok: disk.is_ok(),
            error: disk.err(),
        },
    );

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ReadyResponse {
            status: if overall_ok { "ok" } else { "error" }.into(),
            checks,
        }),
    )
}
