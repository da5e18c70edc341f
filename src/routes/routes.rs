//! Route table for the folder-manager API.
//!
//! - `GET  /folders`        — list folders/files/breadcrumbs for a prefix
//! - `POST /folders/create` — create a folder marker
//! - `POST /folders/delete` — delete a file or a whole prefix
//! - `POST /upload`         — multipart upload into a prefix
//! - `GET  /objects/{*key}` — stream a stored payload
//! - `GET  /healthz`, `GET /readyz` — probes

use crate::{
    handlers::{
        folder_handlers::{create_folder, delete_entry, download_object, list_folder, upload},
        health_handlers::{healthz, readyz},
    },
    services::folders::FolderService,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build the router; shared state is the `FolderService`.
pub fn routes() -> Router<FolderService> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/folders", get(list_folder))
        .route("/folders/create", post(create_folder))
        .route("/folders/delete", post(delete_entry))
        .route("/upload", post(upload))
        .route("/objects/{*key}", get(download_object))
}
