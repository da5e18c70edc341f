//! The single configured bucket backing the folder view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata row for a bucket. The service operates on exactly one of these,
/// resolved from configuration at startup.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Bucket {
    /// Internal UUID for DB use.
    pub id: Uuid,

    /// Bucket name (DNS-style naming rules).
    pub name: String,

    /// Region label, e.g. "local" or "us-east-1".
    pub region: String,

    /// When this bucket was provisioned.
    pub created_at: DateTime<Utc>,
}
