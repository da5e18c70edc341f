//! Folder-manager backend over a flat object store.
//!
//! The store itself knows nothing about directories; `paths` and
//! `services::folders` emulate a folder tree with trailing-slash keys,
//! delimiter-scoped listings, and zero-byte folder markers.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod paths;
pub mod routes;
pub mod services;
