//! Client-side view orchestration as an explicit state machine.
//!
//! `ViewState` owns the transition rules: every navigation bumps a generation
//! counter and a listing or error is applied only when its generation still
//! matches, so a slow response from an abandoned navigation can never
//! overwrite the current view. Deletion passes through a confirmation
//! sub-state before anything reaches the store.

use crate::models::entry::{FolderListing, UploadFile, UploadResult};
use crate::paths::join_prefix_and_name;
use crate::services::folders::FolderService;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// A delete awaiting user confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDelete {
    pub path: String,
    pub name: String,
    pub is_folder: bool,
}

/// Monotonic tag for in-flight listing requests.
pub type Generation = u64;

/// UI-facing state bag with well-defined transitions.
///
/// Invariants:
/// - a refresh failure never clears previously loaded listing data;
/// - the last error message replaces the previous one, and any later success
///   clears it;
/// - stale responses (generation mismatch) are ignored entirely.
#[derive(Debug)]
pub struct ViewState {
    phase: ViewPhase,
    current_prefix: String,
    generation: Generation,
    listing: Option<FolderListing>,
    error: Option<String>,
    pending_delete: Option<PendingDelete>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            phase: ViewPhase::Idle,
            current_prefix: String::new(),
            generation: 0,
            listing: None,
            error: None,
            pending_delete: None,
        }
    }
}

impl ViewState {
    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn current_prefix(&self) -> &str {
        &self.current_prefix
    }

    pub fn listing(&self) -> Option<&FolderListing> {
        self.listing.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    /// Enter `Loading` for a (possibly unchanged) prefix and return the
    /// generation the eventual response must carry.
    pub fn begin_navigation(&mut self, prefix: impl Into<String>) -> Generation {
        self.current_prefix = prefix.into();
        self.phase = ViewPhase::Loading;
        self.generation += 1;
        self.generation
    }

    /// Apply a listing response. Returns false (and changes nothing) when the
    /// response is stale.
    pub fn apply_listing(&mut self, generation: Generation, listing: FolderListing) -> bool {
        if generation != self.generation {
            return false;
        }
        self.listing = Some(listing);
        self.phase = ViewPhase::Loaded;
        self.error = None;
        true
    }

    /// Apply a fetch failure. Stale listing data is retained; `Errored` is
    /// only entered when there is nothing loaded to fall back on.
    pub fn apply_error(&mut self, generation: Generation, message: impl Into<String>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.error = Some(message.into());
        self.phase = if self.listing.is_some() {
            ViewPhase::Loaded
        } else {
            ViewPhase::Errored
        };
        true
    }

    /// Record a mutating-action failure without touching the view.
    pub fn fail_action(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn request_delete(&mut self, path: impl Into<String>, name: impl Into<String>, is_folder: bool) {
        self.pending_delete = Some(PendingDelete {
            path: path.into(),
            name: name.into(),
            is_folder,
        });
    }

    /// Confirm the pending delete, handing it to the caller to execute.
    pub fn confirm_delete(&mut self) -> Option<PendingDelete> {
        self.pending_delete.take()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }
}

/// Sequences `FolderService` calls through a `ViewState`: navigate, refresh,
/// create, upload, and the gated delete flow. Every successful mutation
/// re-navigates to the unchanged current prefix.
pub struct Browser {
    service: FolderService,
    pub state: ViewState,
}

impl Browser {
    pub fn new(service: FolderService) -> Self {
        Self {
            service,
            state: ViewState::default(),
        }
    }

    pub async fn navigate(&mut self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        let generation = self.state.begin_navigation(prefix.clone());
        match self.service.list_folder(&prefix).await {
            Ok(listing) => {
                self.state.apply_listing(generation, listing);
            }
            Err(err) => {
                tracing::error!("failed to fetch folder contents: {err}");
                self.state
                    .apply_error(generation, "Failed to load folder contents");
            }
        }
    }

    pub async fn refresh(&mut self) {
        let prefix = self.state.current_prefix().to_string();
        self.navigate(prefix).await;
    }

    /// Create a child folder of the current prefix from a display name.
    /// Blank names are ignored rather than sent to the store.
    pub async fn create_folder(&mut self, name: &str) {
        if name.trim().is_empty() {
            return;
        }
        let folder_path = join_prefix_and_name(self.state.current_prefix(), name);
        match self.service.create_folder(&folder_path).await {
            Ok(_) => self.refresh().await,
            Err(err) => {
                tracing::error!("failed to create folder {folder_path}: {err}");
                self.state.fail_action("Failed to create folder");
            }
        }
    }

    pub async fn upload(&mut self, files: Vec<UploadFile>) -> Option<Vec<UploadResult>> {
        let prefix = self.state.current_prefix().to_string();
        match self.service.upload_batch(files, &prefix, None).await {
            Ok(results) => {
                self.refresh().await;
                Some(results)
            }
            Err(err) => {
                tracing::error!("upload into {prefix:?} failed: {err}");
                self.state.fail_action("Upload failed");
                None
            }
        }
    }

    pub fn request_delete(&mut self, path: &str, name: &str, is_folder: bool) {
        self.state.request_delete(path, name, is_folder);
    }

    pub fn cancel_delete(&mut self) {
        self.state.cancel_delete();
    }

    /// Run the pending delete, if any, then refresh the view.
    pub async fn confirm_delete(&mut self) {
        let Some(pending) = self.state.confirm_delete() else {
            return;
        };
        match self
            .service
            .delete_entry(&pending.path, pending.is_folder)
            .await
        {
            Ok(()) => self.refresh().await,
            Err(err) => {
                tracing::error!("failed to delete {}: {err}", pending.path);
                self.state.fail_action("Delete failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entry::Breadcrumb;
    use crate::services::store::{ObjectStore, apply_migrations};
    use bytes::Bytes;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn listing_for(prefix: &str) -> FolderListing {
        FolderListing {
            folders: vec![],
            files: vec![],
            current_prefix: prefix.to_string(),
            breadcrumbs: vec![Breadcrumb {
                name: "Root".into(),
                path: "".into(),
            }],
        }
    }

    #[test]
    fn navigation_moves_idle_to_loading_to_loaded() {
        let mut state = ViewState::default();
        assert_eq!(state.phase(), ViewPhase::Idle);

        let generation = state.begin_navigation("x/");
        assert_eq!(state.phase(), ViewPhase::Loading);
        assert_eq!(state.current_prefix(), "x/");

        assert!(state.apply_listing(generation, listing_for("x/")));
        assert_eq!(state.phase(), ViewPhase::Loaded);
        assert!(state.error().is_none());
    }

    #[test]
    fn stale_responses_are_ignored() {
        let mut state = ViewState::default();
        let first = state.begin_navigation("slow/");
        let second = state.begin_navigation("fast/");

        // the fast navigation's listing lands first
        assert!(state.apply_listing(second, listing_for("fast/")));
        // the slow response arrives late and must not overwrite the view
        assert!(!state.apply_listing(first, listing_for("slow/")));
        assert_eq!(state.listing().unwrap().current_prefix, "fast/");

        // a stale error is ignored too
        assert!(!state.apply_error(first, "too late"));
        assert!(state.error().is_none());
    }

    #[test]
    fn fetch_failure_keeps_stale_listing() {
        let mut state = ViewState::default();
        let generation = state.begin_navigation("x/");
        state.apply_listing(generation, listing_for("x/"));

        let generation = state.begin_navigation("y/");
        assert!(state.apply_error(generation, "boom"));
        assert_eq!(state.phase(), ViewPhase::Loaded);
        assert_eq!(state.error(), Some("boom"));
        // previous data survives
        assert_eq!(state.listing().unwrap().current_prefix, "x/");
    }

    #[test]
    fn first_fetch_failure_enters_errored() {
        let mut state = ViewState::default();
        let generation = state.begin_navigation("");
        assert!(state.apply_error(generation, "boom"));
        assert_eq!(state.phase(), ViewPhase::Errored);
        assert!(state.listing().is_none());
    }

    #[test]
    fn later_success_clears_error() {
        let mut state = ViewState::default();
        let generation = state.begin_navigation("x/");
        state.apply_error(generation, "boom");

        let generation = state.begin_navigation("x/");
        state.apply_listing(generation, listing_for("x/"));
        assert!(state.error().is_none());
    }

    #[test]
    fn delete_confirmation_gates_the_operation() {
        let mut state = ViewState::default();
        state.request_delete("x/f.txt", "f.txt", false);
        assert!(state.pending_delete().is_some());

        state.cancel_delete();
        assert!(state.pending_delete().is_none());
        assert!(state.confirm_delete().is_none());

        state.request_delete("x/", "x", true);
        let pending = state.confirm_delete().expect("pending delete");
        assert_eq!(pending.path, "x/");
        assert!(pending.is_folder);
        // consumed on confirmation
        assert!(state.pending_delete().is_none());
    }

    async fn test_browser() -> (Browser, TempDir) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        apply_migrations(&pool).await.expect("migrations");
        let dir = TempDir::new().expect("tempdir");
        let store = ObjectStore::open(Arc::new(pool), dir.path(), "test-bucket", "local")
            .await
            .expect("open store");
        (Browser::new(FolderService::new(store)), dir)
    }

    #[tokio::test]
    async fn browser_drives_the_full_flow() {
        let (mut browser, _dir) = test_browser().await;

        browser.navigate("").await;
        assert_eq!(browser.state.phase(), ViewPhase::Loaded);
        assert!(browser.state.listing().unwrap().folders.is_empty());

        // create a folder under root, view refreshes
        browser.create_folder("My Photos").await;
        let listing = browser.state.listing().unwrap();
        assert_eq!(listing.folders.len(), 1);
        assert_eq!(listing.folders[0].path, "my-photos/");

        // navigate in and upload
        browser.navigate("my-photos/").await;
        let results = browser
            .upload(vec![UploadFile {
                original_name: "cat pic.png".into(),
                content_type: Some("image/png".into()),
                bytes: Bytes::from_static(b"png"),
            }])
            .await
            .expect("upload results");
        assert_eq!(results[0].folder, "my-photos/");
        let listing = browser.state.listing().unwrap();
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].key, "my-photos/cat_pic.png");

        // cancel leaves everything in place
        browser.request_delete("my-photos/cat_pic.png", "cat_pic.png", false);
        browser.cancel_delete();
        browser.confirm_delete().await;
        assert_eq!(browser.state.listing().unwrap().files.len(), 1);

        // confirmed folder delete wipes marker and contents
        browser.navigate("").await;
        browser.request_delete("my-photos/", "my-photos", true);
        browser.confirm_delete().await;
        let listing = browser.state.listing().unwrap();
        assert!(listing.folders.is_empty());
        assert!(listing.files.is_empty());
    }

    #[tokio::test]
    async fn browser_ignores_blank_folder_names() {
        let (mut browser, _dir) = test_browser().await;
        browser.navigate("").await;
        browser.create_folder("   ").await;
        assert!(browser.state.error().is_none());
        assert!(browser.state.listing().unwrap().folders.is_empty());
    }

    #[tokio::test]
    async fn browser_upload_failure_sets_error_and_keeps_view() {
        let (mut browser, _dir) = test_browser().await;
        browser.navigate("").await;

        let results = browser.upload(vec![]).await;
        assert!(results.is_none());
        assert_eq!(browser.state.error(), Some("Upload failed"));
        // still Loaded with the old view
        assert_eq!(browser.state.phase(), ViewPhase::Loaded);
    }
}
