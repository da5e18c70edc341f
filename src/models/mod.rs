//! Data models: stored rows (`bucket`, `object`) and the derived view
//! entities (`entry`) recomputed on every listing.

pub mod bucket;
pub mod entry;
pub mod object;
