//! Derived view entities. None of these are stored; they are recomputed from
//! the flat key space on every listing request.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One level of folder hierarchy, synthesized from a common prefix.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FolderEntry {
    /// Full prefix of the folder, trailing `/` included.
    pub path: String,

    /// Last path segment, for display.
    pub name: String,
}

/// A file beneath the current prefix. Folder markers never appear here.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub key: String,
    pub name: String,
    pub last_modified: DateTime<Utc>,
    pub size: i64,
}

/// One element of the navigation trail. The head of the trail is always the
/// synthetic root crumb `{name: "Root", path: ""}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

/// Projection of one delimiter-scoped listing: the folder/file partition plus
/// the breadcrumb trail for the requested prefix.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FolderListing {
    pub folders: Vec<FolderEntry>,
    pub files: Vec<FileEntry>,
    pub current_prefix: String,
    pub breadcrumbs: Vec<Breadcrumb>,
}

/// An incoming file in an upload batch.
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub original_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Outcome of one uploaded file within a batch.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub original_name: String,
    pub url: String,
    pub folder: String,
}
