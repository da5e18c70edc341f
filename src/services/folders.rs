//! Folder emulation over the flat store: delimiter-scoped listing projection,
//! marker-object folder lifecycle, recursive prefix deletion, and the
//! concurrent upload fan-out.

use crate::models::entry::{FileEntry, FolderEntry, FolderListing, UploadFile, UploadResult};
use crate::paths::{derive_breadcrumbs, folder_display_name, normalize_folder_path, sanitize_file_name};
use crate::services::store::{ListObjectsParams, ObjectStore, StorageError};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

const LIST_PAGE_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum FolderError {
    #[error("no files provided")]
    NoFiles,
    #[error("folder path must not be empty")]
    EmptyFolderPath,
    #[error(transparent)]
    Store(#[from] StorageError),
}

pub type FolderResult<T> = Result<T, FolderError>;

/// Best-effort progress event for an upload batch: one event per file with
/// its own byte count, emitted when that file's put completes. Purely
/// informational.
#[derive(Clone, Debug)]
pub struct UploadProgress {
    pub original_name: String,
    pub bytes_sent: u64,
}

/// Folder-level operations over one bucket. Stateless and cheap to clone;
/// every call re-derives its view from the store.
#[derive(Clone)]
pub struct FolderService {
    store: ObjectStore,
}

impl FolderService {
    pub fn new(store: ObjectStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Project one delimiter-scoped listing into the folder/file partition
    /// plus the breadcrumb trail. Side-effect free and safe to call
    /// concurrently.
    pub async fn list_folder(&self, prefix: &str) -> FolderResult<FolderListing> {
        let page = self
            .store
            .list_objects(ListObjectsParams {
                prefix: Some(prefix.to_string()),
                delimiter: Some("/".to_string()),
                continuation_token: None,
                max_keys: LIST_PAGE_SIZE,
            })
            .await?;

        let folders = page
            .common_prefixes
            .into_iter()
            .map(|path| FolderEntry {
                name: folder_display_name(&path),
                path,
            })
            .collect();

        // keys ending in `/` are markers, including the prefix's own
        let files = page
            .objects
            .into_iter()
            .filter(|obj| !obj.key.ends_with('/'))
            .map(|obj| FileEntry {
                name: obj.filename,
                key: obj.key,
                last_modified: obj.last_modified,
                size: obj.size_bytes,
            })
            .collect();

        Ok(FolderListing {
            folders,
            files,
            current_prefix: prefix.to_string(),
            breadcrumbs: derive_breadcrumbs(prefix),
        })
    }

    /// Write the zero-byte marker that makes an empty folder visible.
    ///
    /// Re-creating an existing folder is an idempotent overwrite. Empty and
    /// bare-`/` paths are rejected before any store call.
    pub async fn create_folder(&self, folder_path: &str) -> FolderResult<String> {
        let trimmed = folder_path.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Err(FolderError::EmptyFolderPath);
        }

        let key = normalize_folder_path(trimmed);
        self.store.put_object(&key, bytes::Bytes::new(), None).await?;
        Ok(key)
    }

    /// Delete a file, or a folder with everything beneath it.
    ///
    /// The folder branch enumerates the whole prefix (no delimiter, paginated)
    /// and then issues one batched delete over exactly those keys, the
    /// folder's own marker included. An empty enumeration is a successful
    /// no-op. Writers racing between the list and the delete may leave new
    /// objects behind; the store offers no stronger guarantee and none is
    /// added here.
    pub async fn delete_entry(&self, path: &str, is_folder: bool) -> FolderResult<()> {
        if !is_folder {
            self.store.delete_object(path).await?;
            return Ok(());
        }

        let mut keys = Vec::new();
        let mut token = None;
        loop {
            let page = self
                .store
                .list_objects(ListObjectsParams {
                    prefix: Some(path.to_string()),
                    delimiter: None,
                    continuation_token: token,
                    max_keys: LIST_PAGE_SIZE,
                })
                .await?;
            keys.extend(page.objects.into_iter().map(|obj| obj.key));
            if !page.is_truncated {
                break;
            }
            token = page.next_continuation_token;
        }

        if keys.is_empty() {
            debug!("delete of empty prefix {path} is a no-op");
            return Ok(());
        }

        let removed = self.store.delete_objects(&keys).await?;
        debug!("deleted {removed} objects under {path}");
        Ok(())
    }

    /// Upload a batch of files into a target folder.
    ///
    /// All puts run concurrently with no cap; the first failure aborts the
    /// batch without rolling back files already written. Results come back
    /// one per input file. `progress` is a best-effort side channel and has
    /// no bearing on the outcome.
    pub async fn upload_batch(
        &self,
        files: Vec<UploadFile>,
        folder_path: &str,
        progress: Option<UnboundedSender<UploadProgress>>,
    ) -> FolderResult<Vec<UploadResult>> {
        if files.is_empty() {
            return Err(FolderError::NoFiles);
        }

        // "" stays "", anything else gains exactly one trailing slash;
        // keys never start with `/`
        let stripped = folder_path.trim_end_matches('/');
        let target = if stripped.is_empty() {
            String::new()
        } else {
            format!("{stripped}/")
        };

        let puts = files.into_iter().map(|file| {
            let store = self.store.clone();
            let target = target.clone();
            let progress = progress.clone();
            async move {
                let key = format!("{target}{}", sanitize_file_name(&file.original_name));
                let object = store
                    .put_object(&key, file.bytes, file.content_type)
                    .await?;
                if let Some(tx) = &progress {
                    let _ = tx.send(UploadProgress {
                        original_name: file.original_name.clone(),
                        bytes_sent: object.size_bytes as u64,
                    });
                }
                Ok::<_, FolderError>(UploadResult {
                    original_name: file.original_name,
                    url: format!("/objects/{}", object.key),
                    folder: target,
                })
            }
        });

        futures::future::try_join_all(puts).await
    }
}
