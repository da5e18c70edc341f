//! A stored object: a file payload or a zero-byte folder marker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata for a single object in the bucket. Hierarchy is purely notational:
/// keys ending in `/` are folder markers and carry no payload file.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Object {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Parent bucket.
    pub bucket_id: Uuid,

    /// Flat object key; `/` separates notional path segments.
    pub key: String,

    /// Last path segment of the key at write time.
    pub filename: String,

    /// Declared MIME type, if any.
    pub content_type: Option<String>,

    /// Payload size in bytes (zero for folder markers).
    pub size_bytes: i64,

    /// MD5 checksum of the payload.
    pub etag: Option<String>,

    /// Timestamp of the last overwrite.
    pub last_modified: DateTime<Utc>,

    /// Soft-delete marker.
    pub is_deleted: bool,
}
