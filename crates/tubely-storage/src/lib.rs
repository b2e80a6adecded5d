//! Tubely Storage Library
//!
//! This crate provides the object storage abstraction used by the ingestion
//! pipeline and its S3 and local filesystem implementations.
//!
//! # Storage key format
//!
//! - **Videos**: `{landscape|portrait|other}/{asset_id}.mp4`
//! - **Thumbnails**: `{asset_id}.{subtype}`
//!
//! Keys must not contain `..` or a leading `/`. Key construction lives in the
//! `keys` module so every backend sees the same layout.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::StorageKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
