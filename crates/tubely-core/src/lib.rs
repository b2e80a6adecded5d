//! Tubely Core Library
//!
//! This crate provides the domain models, error types, configuration and asset
//! identity helpers shared across all Tubely components.

pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, LogFormat, MediaConfig};
pub use error::{AppError, ErrorCategory, ErrorMetadata, LogLevel};
pub use identity::{extension_for, AssetIdGenerator, RandomAssetIds};
pub use models::{AspectClass, AssetClass, CreateVideoRequest, Video};
pub use storage_types::StorageBackend;
