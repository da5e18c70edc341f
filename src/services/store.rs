//! Single-bucket object store: SQLite rows for metadata, local disk for
//! payloads sharded beneath `base_path/{bucket}/{shard}/{shard}/{key}`.
//!
//! Folder markers (keys ending in `/`) are metadata-only; no payload file is
//! ever written or removed for them.

use crate::models::{bucket::Bucket, object::Object};
use bytes::Bytes;
use chrono::Utc;
use md5::Context;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::{
    collections::BTreeSet,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct ListObjectsParams {
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub continuation_token: Option<String>,
    pub max_keys: usize,
}

#[derive(Debug)]
pub struct ListObjectsResult {
    pub objects: Vec<Object>,
    pub common_prefixes: Vec<String>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("bucket `{name}` is not usable: {reason}")]
    InvalidBucketName { name: String, reason: String },
    #[error("region `{0}` is not supported")]
    UnsupportedRegion(String),
    #[error("object `{0}` not found")]
    ObjectNotFound(String),
    #[error("invalid object key")]
    InvalidObjectKey,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

const MAX_OBJECT_KEY_LEN: usize = 1024;
const DELETE_BATCH_BINDS: usize = 500;
const SUPPORTED_REGIONS: [&str; 7] = [
    "local",
    "us-east-1",
    "us-west-2",
    "eu-west-1",
    "eu-central-1",
    "ap-southeast-1",
    "ap-northeast-1",
];

/// Apply the embedded schema. Statements are idempotent, so this runs
/// unconditionally at startup and in tests.
pub async fn apply_migrations(db: &SqlitePool) -> StorageResult<()> {
    let sql = include_str!("../../migrations/0001_init.sql");
    for stmt in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(stmt).execute(db).await?;
    }
    Ok(())
}

/// Store handle scoped to one configured bucket.
///
/// Exposes exactly the collaborator surface the folder layer needs:
/// `list_objects`, `put_object`, `delete_object`, `delete_objects`, plus a
/// payload reader for downloads.
#[derive(Clone)]
pub struct ObjectStore {
    /// Shared SQLite pool for metadata operations.
    pub db: Arc<SqlitePool>,

    /// Root directory for object payloads.
    pub base_path: PathBuf,

    bucket: Bucket,
}

impl ObjectStore {
    /// Resolve the configured bucket, provisioning its metadata row and
    /// directory when absent. Name or region rejection here is a
    /// configuration failure and happens before any object operation.
    pub async fn open(
        db: Arc<SqlitePool>,
        base_path: impl Into<PathBuf>,
        bucket_name: &str,
        region: &str,
    ) -> StorageResult<Self> {
        ensure_bucket_name_safe(bucket_name)?;
        let normalized_region = region.to_lowercase();
        if !SUPPORTED_REGIONS
            .iter()
            .any(|candidate| *candidate == normalized_region)
        {
            return Err(StorageError::UnsupportedRegion(region.to_string()));
        }

        let base_path = base_path.into();
        fs::create_dir_all(base_path.join(bucket_name)).await?;

        sqlx::query(
            "INSERT OR IGNORE INTO buckets (id, name, region, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4())
        .bind(bucket_name)
        .bind(&normalized_region)
        .bind(Utc::now())
        .execute(&*db)
        .await?;

        let bucket = sqlx::query_as::<_, Bucket>(
            "SELECT id, name, region, created_at FROM buckets WHERE name = ?",
        )
        .bind(bucket_name)
        .fetch_one(&*db)
        .await?;

        Ok(Self {
            db,
            base_path,
            bucket,
        })
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket.name
    }

    /// Write an object, overwriting any previous version under the same key
    /// (last-writer-wins, no error on overwrite).
    ///
    /// File payloads go through a temp file, fsync, and atomic rename.
    /// Marker keys (trailing `/`) skip the filesystem entirely.
    pub async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<String>,
    ) -> StorageResult<Object> {
        ensure_key_safe(key)?;

        let is_marker = key.ends_with('/');
        let mut digest = Context::new();
        digest.consume(&body);
        let etag = format!("{:x}", digest.compute());
        let size_bytes = body.len() as i64;

        if !is_marker {
            self.write_payload(key, &body).await?;
        }

        let filename = key
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(key)
            .to_string();

        let upserted = sqlx::query_as::<_, Object>(
            r#"
            INSERT INTO objects (
                id, bucket_id, key, filename, content_type, size_bytes,
                etag, last_modified, is_deleted
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)
            ON CONFLICT(bucket_id, key) DO UPDATE SET
                filename = excluded.filename,
                content_type = excluded.content_type,
                size_bytes = excluded.size_bytes,
                etag = excluded.etag,
                last_modified = excluded.last_modified,
                is_deleted = 0
            RETURNING id, bucket_id, key, filename, content_type, size_bytes,
                      etag, last_modified, is_deleted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(self.bucket.id)
        .bind(key)
        .bind(&filename)
        .bind(content_type)
        .bind(size_bytes)
        .bind(&etag)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await;

        match upserted {
            Ok(obj) => Ok(obj),
            Err(err) => {
                if !is_marker {
                    let _ = fs::remove_file(self.object_path(key)).await;
                }
                Err(StorageError::Sqlx(err))
            }
        }
    }

    /// Open an object payload for streaming out.
    pub async fn get_object_reader(&self, key: &str) -> StorageResult<(Object, File)> {
        ensure_key_safe(key)?;
        if key.ends_with('/') {
            // markers have no payload
            return Err(StorageError::ObjectNotFound(key.to_string()));
        }
        let object = self.fetch_object(key).await?;

        let file_path = self.object_path(key);
        let file = File::open(&file_path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                StorageError::ObjectNotFound(key.to_string())
            } else {
                StorageError::Io(err)
            }
        })?;

        Ok((object, file))
    }

    /// List live objects following S3 ListObjectsV2 rules: prefix filter,
    /// delimiter grouping into common prefixes, lexicographic order, and
    /// continuation-token pagination.
    pub async fn list_objects(&self, params: ListObjectsParams) -> StorageResult<ListObjectsResult> {
        let max_keys = params.max_keys.clamp(1, 1000);
        let fetch_limit = max_keys + 1;

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, bucket_id, key, filename, content_type, size_bytes, etag, \
             last_modified, is_deleted \
             FROM objects WHERE bucket_id = ",
        );
        builder.push_bind(self.bucket.id);
        builder.push(" AND is_deleted = 0");

        if let Some(prefix) = params.prefix.as_deref().filter(|p| !p.is_empty()) {
            builder.push(" AND key LIKE ");
            builder.push_bind(format!("{}%", escape_like(prefix)));
            builder.push(" ESCAPE '\\'");
        }

        if let Some(token) = &params.continuation_token {
            builder.push(" AND key > ");
            builder.push_bind(token);
        }

        builder.push(" ORDER BY key ASC LIMIT ");
        builder.push_bind(fetch_limit as i64);

        let mut rows: Vec<Object> = builder.build_query_as().fetch_all(&*self.db).await?;

        let mut is_truncated = false;
        let mut next_continuation_token = None;
        if rows.len() == fetch_limit {
            if let Some(last) = rows.pop() {
                next_continuation_token = Some(last.key.clone());
            }
            is_truncated = true;
        }

        let mut objects = Vec::new();
        let mut common_prefixes = BTreeSet::new();
        for obj in rows {
            if let Some(delim) = &params.delimiter {
                if let Some(grouped) =
                    compute_common_prefix(&obj.key, params.prefix.as_deref(), delim)
                {
                    common_prefixes.insert(grouped);
                    continue;
                }
            }
            objects.push(obj);
        }

        Ok(ListObjectsResult {
            objects,
            common_prefixes: common_prefixes.into_iter().collect(),
            is_truncated,
            next_continuation_token,
        })
    }

    /// Soft-delete one object and remove its payload best-effort.
    ///
    /// Idempotent: deleting an absent key is a successful no-op. Returns
    /// whether a live row was actually removed.
    pub async fn delete_object(&self, key: &str) -> StorageResult<bool> {
        ensure_key_safe(key)?;
        let result = sqlx::query(
            "UPDATE objects SET is_deleted = 1 WHERE bucket_id = ? AND key = ? AND is_deleted = 0",
        )
        .bind(self.bucket.id)
        .bind(key)
        .execute(&*self.db)
        .await?;

        self.remove_payload(key).await;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a batch of keys in chunked statements, then sweep their
    /// payloads. Returns the number of rows removed.
    pub async fn delete_objects(&self, keys: &[String]) -> StorageResult<u64> {
        let mut removed = 0;
        for chunk in keys.chunks(DELETE_BATCH_BINDS) {
            let mut builder = QueryBuilder::<Sqlite>::new(
                "UPDATE objects SET is_deleted = 1 WHERE bucket_id = ",
            );
            builder.push_bind(self.bucket.id);
            builder.push(" AND is_deleted = 0 AND key IN (");
            let mut separated = builder.separated(", ");
            for key in chunk {
                separated.push_bind(key);
            }
            builder.push(")");
            removed += builder.build().execute(&*self.db).await?.rows_affected();
        }

        for key in keys {
            self.remove_payload(key).await;
        }

        Ok(removed)
    }

    async fn fetch_object(&self, key: &str) -> StorageResult<Object> {
        sqlx::query_as::<_, Object>(
            "SELECT id, bucket_id, key, filename, content_type, size_bytes, etag,
                    last_modified, is_deleted
             FROM objects
             WHERE bucket_id = ? AND key = ? AND is_deleted = 0",
        )
        .bind(self.bucket.id)
        .bind(key)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => StorageError::ObjectNotFound(key.to_string()),
            other => StorageError::Sqlx(other),
        })
    }

    async fn write_payload(&self, key: &str, body: &Bytes) -> StorageResult<()> {
        let file_path = self.object_path(key);
        let parent = file_path.parent().map(Path::to_path_buf).ok_or_else(|| {
            StorageError::Io(io::Error::other("object path missing parent directory"))
        })?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let write_result = async {
            let mut file = File::create(&tmp_path).await?;
            file.write_all(body).await?;
            file.flush().await?;
            file.sync_all().await?;
            Ok::<(), io::Error>(())
        }
        .await;
        if let Err(err) = write_result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StorageError::Io(err));
            }
        }

        Ok(())
    }

    /// Best-effort payload removal plus empty-shard pruning. Marker keys have
    /// no payload and are skipped; a failed unlink is logged, never surfaced,
    /// since the metadata row is already gone.
    async fn remove_payload(&self, key: &str) {
        if key.ends_with('/') {
            return;
        }

        let file_path = self.object_path(key);
        match fs::remove_file(&file_path).await {
            Ok(_) => debug!("removed payload {}", file_path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("payload {} already missing", file_path.display());
            }
            Err(err) => {
                debug!("failed to remove payload {}: {}", file_path.display(), err);
                return;
            }
        }

        if let Some(parent) = file_path.parent() {
            self.prune_empty_dirs(parent).await;
        }
    }

    fn bucket_root(&self) -> PathBuf {
        self.base_path.join(&self.bucket.name)
    }

    /// Payload location: `base/{bucket}/{shard}/{shard}/{key}` where the two
    /// shard levels come from MD5(bucket/key), keeping per-directory file
    /// counts bounded.
    fn object_path(&self, key: &str) -> PathBuf {
        let digest = md5::compute(format!("{}/{}", self.bucket.name, key));
        let mut path = self.bucket_root();
        path.push(format!("{:02x}", digest[0]));
        path.push(format!("{:02x}", digest[1]));
        path.push(key);
        path
    }

    /// Walk upward from `start`, removing empty directories until the bucket
    /// root, a non-empty directory, or an I/O error stops the climb.
    async fn prune_empty_dirs(&self, start: &Path) {
        let stop = self.bucket_root();
        let mut current = start.to_path_buf();
        while current.starts_with(&stop) && current != stop {
            match fs::remove_dir(&current).await {
                Ok(_) => match current.parent() {
                    Some(parent) => current = parent.to_path_buf(),
                    None => break,
                },
                Err(err) if err.kind() == ErrorKind::NotFound => break,
                Err(err) if err.kind() == ErrorKind::DirectoryNotEmpty => break,
                Err(err) => {
                    debug!("failed to prune directory {}: {}", current.display(), err);
                    break;
                }
            }
        }
    }
}

/// Escape LIKE wildcards so a bound prefix matches itself literally.
/// `_` in particular is common in keys: `sanitize_file_name` produces it.
fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Reject keys that could escape the bucket root: empty, oversized, leading
/// `/`, `..` segments, control characters, backslashes. Trailing `/` is
/// allowed (folder markers).
fn ensure_key_safe(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
        return Err(StorageError::InvalidObjectKey);
    }
    if key.starts_with('/') || key.contains("..") {
        return Err(StorageError::InvalidObjectKey);
    }
    if key
        .bytes()
        .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
    {
        return Err(StorageError::InvalidObjectKey);
    }
    Ok(())
}

/// S3-like bucket naming rules: 3-63 chars of lowercase letters, digits,
/// dots, and hyphens; must start and end alphanumeric; no consecutive dots or
/// dot-hyphen runs; must not look like an IPv4 address.
fn ensure_bucket_name_safe(name: &str) -> StorageResult<()> {
    let invalid = |reason: &str| StorageError::InvalidBucketName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.len() < 3 || name.len() > 63 {
        return Err(invalid("must be between 3 and 63 characters"));
    }
    if !name
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
    {
        return Err(invalid(
            "allowed characters are lowercase letters, digits, dots, and hyphens",
        ));
    }
    let first = name.chars().next().unwrap_or('.');
    let last = name.chars().last().unwrap_or('.');
    if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
        return Err(invalid("must start and end with a letter or digit"));
    }
    if name.contains("..") || name.contains("-.") || name.contains(".-") {
        return Err(invalid(
            "cannot contain consecutive dots or dot-hyphen combinations",
        ));
    }
    if is_ipv4_like(name) {
        return Err(invalid("must not be formatted like an IP address"));
    }
    Ok(())
}

fn is_ipv4_like(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|segment| !segment.is_empty() && segment.parse::<u8>().is_ok())
}

/// Group a key under its one-level-deeper common prefix, if the delimiter
/// appears after the requested prefix. Returns None for keys that belong in
/// `Contents` rather than `CommonPrefixes`.
fn compute_common_prefix(key: &str, requested_prefix: Option<&str>, delimiter: &str) -> Option<String> {
    let requested = requested_prefix.unwrap_or("");
    let remainder = key.strip_prefix(requested)?;
    let pos = remainder.find(delimiter)?;
    Some(format!(
        "{requested}{}",
        &remainder[..pos + delimiter.len()]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::TempDir;

    async fn test_store() -> (ObjectStore, TempDir) {
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
        (store, dir)
    }

    fn params(prefix: &str, delimiter: Option<&str>) -> ListObjectsParams {
        ListObjectsParams {
            prefix: Some(prefix.to_string()),
            delimiter: delimiter.map(str::to_string),
            continuation_token: None,
            max_keys: 1000,
        }
    }

    #[tokio::test]
    async fn open_rejects_bad_bucket_names() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        apply_migrations(&pool).await.unwrap();
        let pool = Arc::new(pool);
        let dir = TempDir::new().unwrap();

        for name in ["ab", "Has-Upper", "-leading", "1.2.3.4", "a..b"] {
            let result = ObjectStore::open(pool.clone(), dir.path(), name, "local").await;
            assert!(
                matches!(result, Err(StorageError::InvalidBucketName { .. })),
                "expected rejection for {name:?}"
            );
        }

        let result = ObjectStore::open(pool.clone(), dir.path(), "good-bucket", "nowhere-9").await;
        assert!(matches!(result, Err(StorageError::UnsupportedRegion(_))));
    }

    #[tokio::test]
    async fn put_and_read_back_roundtrip() {
        let (store, _dir) = test_store().await;
        let obj = store
            .put_object("x/f.txt", Bytes::from_static(b"hello"), Some("text/plain".into()))
            .await
            .unwrap();
        assert_eq!(obj.key, "x/f.txt");
        assert_eq!(obj.filename, "f.txt");
        assert_eq!(obj.size_bytes, 5);

        let (meta, _file) = store.get_object_reader("x/f.txt").await.unwrap();
        assert_eq!(meta.etag, obj.etag);
    }

    #[tokio::test]
    async fn overwrite_is_last_writer_wins() {
        let (store, _dir) = test_store().await;
        store
            .put_object("doc.txt", Bytes::from_static(b"one"), None)
            .await
            .unwrap();
        let second = store
            .put_object("doc.txt", Bytes::from_static(b"two"), None)
            .await
            .unwrap();
        assert_eq!(second.size_bytes, 3);

        let listing = store.list_objects(params("", None)).await.unwrap();
        assert_eq!(listing.objects.len(), 1);
        assert_eq!(listing.objects[0].etag, second.etag);
    }

    #[tokio::test]
    async fn markers_are_metadata_only() {
        let (store, dir) = test_store().await;
        let marker = store.put_object("photos/", Bytes::new(), None).await.unwrap();
        assert_eq!(marker.size_bytes, 0);

        // nothing but the bucket root directory on disk
        let mut entries = std::fs::read_dir(dir.path().join("test-bucket"))
            .unwrap()
            .filter_map(Result::ok);
        assert!(entries.next().is_none());

        assert!(matches!(
            store.get_object_reader("photos/").await,
            Err(StorageError::ObjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn delimiter_listing_groups_common_prefixes() {
        let (store, _dir) = test_store().await;
        for key in ["x/", "x/f.txt", "y/", "top.txt"] {
            store.put_object(key, Bytes::new(), None).await.unwrap();
        }

        let root = store.list_objects(params("", Some("/"))).await.unwrap();
        assert_eq!(root.common_prefixes, vec!["x/".to_string(), "y/".to_string()]);
        let keys: Vec<&str> = root.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["top.txt"]);

        let under_x = store.list_objects(params("x/", Some("/"))).await.unwrap();
        assert!(under_x.common_prefixes.is_empty());
        let keys: Vec<&str> = under_x.objects.iter().map(|o| o.key.as_str()).collect();
        // the prefix's own marker shows up as a content row here
        assert_eq!(keys, vec!["x/", "x/f.txt"]);
    }

    #[tokio::test]
    async fn prefix_wildcards_match_literally() {
        let (store, _dir) = test_store().await;
        for key in ["a_b/", "a_b/f.txt", "axb/", "axb/secret.txt", "a%c/x.txt"] {
            store.put_object(key, Bytes::new(), None).await.unwrap();
        }

        // `_` must not match `x`
        let listing = store.list_objects(params("a_b/", None)).await.unwrap();
        let keys: Vec<&str> = listing.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["a_b/", "a_b/f.txt"]);

        // `%` must not match everything
        let listing = store.list_objects(params("a%c/", None)).await.unwrap();
        let keys: Vec<&str> = listing.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["a%c/x.txt"]);
    }

    #[tokio::test]
    async fn listing_paginates_with_continuation_tokens() {
        let (store, _dir) = test_store().await;
        for i in 0..5 {
            store
                .put_object(&format!("k/{i:02}.bin"), Bytes::from_static(b"x"), None)
                .await
                .unwrap();
        }

        let mut seen = Vec::new();
        let mut token = None;
        loop {
            let page = store
                .list_objects(ListObjectsParams {
                    prefix: Some("k/".into()),
                    delimiter: None,
                    continuation_token: token,
                    max_keys: 2,
                })
                .await
                .unwrap();
            seen.extend(page.objects.into_iter().map(|o| o.key));
            if !page.is_truncated {
                break;
            }
            token = page.next_continuation_token;
        }
        assert_eq!(seen.len(), 5);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn delete_object_is_idempotent() {
        let (store, _dir) = test_store().await;
        store
            .put_object("gone.txt", Bytes::from_static(b"x"), None)
            .await
            .unwrap();

        assert!(store.delete_object("gone.txt").await.unwrap());
        // second delete and never-existed delete are successful no-ops
        assert!(!store.delete_object("gone.txt").await.unwrap());
        assert!(!store.delete_object("never-existed.txt").await.unwrap());

        let listing = store.list_objects(params("", None)).await.unwrap();
        assert!(listing.objects.is_empty());
    }

    #[tokio::test]
    async fn delete_succeeds_when_payload_unlink_fails() {
        let (store, _dir) = test_store().await;
        store
            .put_object("stuck.txt", Bytes::from_static(b"x"), None)
            .await
            .unwrap();

        // swap the payload for a non-empty directory so unlink cannot succeed
        let path = store.object_path("stuck.txt");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("inner"), b"x").unwrap();

        assert!(store.delete_object("stuck.txt").await.unwrap());
        let listing = store.list_objects(params("", None)).await.unwrap();
        assert!(listing.objects.is_empty());
    }

    #[tokio::test]
    async fn delete_objects_batches_all_keys() {
        let (store, _dir) = test_store().await;
        for key in ["x/", "x/f.txt", "x/sub/"] {
            store.put_object(key, Bytes::new(), None).await.unwrap();
        }

        let keys: Vec<String> = ["x/", "x/f.txt", "x/sub/"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(store.delete_objects(&keys).await.unwrap(), 3);

        let listing = store.list_objects(params("x/", None)).await.unwrap();
        assert!(listing.objects.is_empty());
    }

    #[tokio::test]
    async fn unsafe_keys_are_rejected() {
        let (store, _dir) = test_store().await;
        for key in ["", "/leading", "a/../b", "nul\0byte"] {
            assert!(matches!(
                store.put_object(key, Bytes::new(), None).await,
                Err(StorageError::InvalidObjectKey)
            ));
        }
    }

    #[test]
    fn like_escaping_covers_wildcards() {
        assert_eq!(escape_like("a_b/"), "a\\_b/");
        assert_eq!(escape_like("a%c/"), "a\\%c/");
        assert_eq!(escape_like("a\\b/"), "a\\\\b/");
        assert_eq!(escape_like("plain/"), "plain/");
    }

    #[test]
    fn common_prefix_grouping() {
        assert_eq!(
            compute_common_prefix("x/f.txt", Some(""), "/"),
            Some("x/".to_string())
        );
        assert_eq!(
            compute_common_prefix("x/sub/f.txt", Some("x/"), "/"),
            Some("x/sub/".to_string())
        );
        assert_eq!(compute_common_prefix("x/", Some("x/"), "/"), None);
        assert_eq!(compute_common_prefix("top.txt", Some(""), "/"), None);
        assert_eq!(compute_common_prefix("y/f.txt", Some("x/"), "/"), None);
    }
}
