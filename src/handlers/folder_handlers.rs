//! HTTP handlers for the folder-manager surface.
//!
//! Every failure is logged with detail here and reduced to a flat `{error}`
//! body; the response alone never distinguishes failure causes. The one
//! non-500 case is an empty upload batch (400).

use crate::{
    errors::AppError,
    models::entry::{FolderListing, UploadFile, UploadResult},
    services::folders::{FolderError, FolderService},
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

#[derive(Debug, Deserialize)]
pub struct ListFolderQuery {
    #[serde(default)]
    pub prefix: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderReq {
    pub folder_path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderResp {
    pub success: bool,
    pub folder_path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEntryReq {
    pub path: String,
    pub is_folder: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteEntryResp {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResp {
    pub success: bool,
    pub files: Vec<UploadResult>,
}

/// Reduce a service error to the endpoint's generic message, logging the
/// detail server-side. The empty-upload validation is the only 400.
fn reduce(err: FolderError, fallback: &'static str) -> AppError {
    match err {
        FolderError::NoFiles => AppError::new(StatusCode::BAD_REQUEST, "No files provided"),
        other => {
            tracing::error!("{fallback}: {other}");
            AppError::internal(fallback)
        }
    }
}

/// GET `/folders?prefix=` — project the current prefix into folders, files,
/// and breadcrumbs.
pub async fn list_folder(
    State(service): State<FolderService>,
    Query(query): Query<ListFolderQuery>,
) -> Result<Json<FolderListing>, AppError> {
    let listing = service
        .list_folder(&query.prefix)
        .await
        .map_err(|err| reduce(err, "Failed to fetch folders"))?;
    Ok(Json(listing))
}

/// POST `/folders/create` — write a zero-byte folder marker.
pub async fn create_folder(
    State(service): State<FolderService>,
    Json(req): Json<CreateFolderReq>,
) -> Result<Json<CreateFolderResp>, AppError> {
    let folder_path = service
        .create_folder(&req.folder_path)
        .await
        .map_err(|err| reduce(err, "Failed to create folder"))?;
    Ok(Json(CreateFolderResp {
        success: true,
        folder_path,
    }))
}

/// POST `/folders/delete` — delete a file, or a folder and everything
/// beneath it.
pub async fn delete_entry(
    State(service): State<FolderService>,
    Json(req): Json<DeleteEntryReq>,
) -> Result<Json<DeleteEntryResp>, AppError> {
    service
        .delete_entry(&req.path, req.is_folder)
        .await
        .map_err(|err| reduce(err, "Failed to delete"))?;
    Ok(Json(DeleteEntryResp {
        success: true,
        message: format!(
            "Successfully deleted {}",
            if req.is_folder { "folder" } else { "file" }
        ),
    }))
}

/// POST `/upload` — multipart form with repeated `files` fields and a
/// `folderPath` field naming the target prefix.
pub async fn upload(
    State(service): State<FolderService>,
    mut multipart: Multipart,
) -> Result<Json<UploadResp>, AppError> {
    let mut folder_path = String::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        tracing::error!("malformed multipart body: {err}");
        AppError::internal("Upload failed")
    })? {
        // capture before `bytes`/`text` consume the field
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("files") => {
                let original_name = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|err| {
                    tracing::error!("failed to read upload field {original_name}: {err}");
                    AppError::internal("Upload failed")
                })?;
                files.push(UploadFile {
                    original_name,
                    content_type,
                    bytes,
                });
            }
            Some("folderPath") => {
                folder_path = field.text().await.map_err(|err| {
                    tracing::error!("failed to read folderPath field: {err}");
                    AppError::internal("Upload failed")
                })?;
            }
            _ => {}
        }
    }

    let results = service
        .upload_batch(files, &folder_path, None)
        .await
        .map_err(|err| reduce(err, "Upload failed"))?;

    Ok(Json(UploadResp {
        success: true,
        files: results,
    }))
}

/// GET `/objects/{*key}` — stream a stored payload back out. This is where
/// `UploadResult.url` points.
pub async fn download_object(
    State(service): State<FolderService>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let (meta, file) = service
        .store()
        .get_object_reader(&key)
        .await
        .map_err(|err| {
            tracing::debug!("download of {key} failed: {err}");
            AppError::not_found("Object not found")
        })?;

    let body = Body::from_stream(ReaderStream::new(file));
    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    let content_type = meta
        .content_type
        .unwrap_or_else(|| "application/octet-stream".into());
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&meta.size_bytes.max(0).to_string())
            .unwrap_or_else(|_| HeaderValue::from_static("0")),
    );
    if let Some(etag) = meta.etag {
        if let Ok(value) = HeaderValue::from_str(&format!("\"{etag}\"")) {
            headers.insert(header::ETAG, value);
        }
    }

    Ok(response)
}
