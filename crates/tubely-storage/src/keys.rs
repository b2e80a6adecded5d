//! Storage key construction shared by all backends.

use std::fmt::{Display, Formatter, Result as FmtResult};

use tubely_core::{extension_for, AspectClass};

use crate::traits::{StorageError, StorageResult};

const VIDEO_EXTENSION: &str = ".mp4";

/// Object key: optional aspect-ratio prefix, random segment, extension.
///
/// Uniqueness comes from the random segment; no existence check is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey {
    prefix: Option<AspectClass>,
    random_segment: String,
    extension: String,
}

impl StorageKey {
    /// `{aspect}/{asset_id}.mp4`
    pub fn video(asset_id: &str, aspect: AspectClass) -> Self {
        StorageKey {
            prefix: Some(aspect),
            random_segment: asset_id.to_string(),
            extension: VIDEO_EXTENSION.to_string(),
        }
    }

    /// `{asset_id}.{subtype}` where the subtype comes from the validated media type.
    pub fn thumbnail(asset_id: &str, media_type: &str) -> Self {
        StorageKey {
            prefix: None,
            random_segment: asset_id.to_string(),
            extension: extension_for(media_type),
        }
    }

    pub fn prefix(&self) -> Option<AspectClass> {
        self.prefix
    }

    pub fn random_segment(&self) -> &str {
        &self.random_segment
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.prefix {
            Some(aspect) => write!(
                f,
                "{}/{}{}",
                aspect.prefix(),
                self.random_segment,
                self.extension
            ),
            None => write!(f, "{}{}", self.random_segment, self.extension),
        }
    }
}

/// Reject keys that could escape a backend's root.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if storage_key.contains("..") || storage_key.starts_with('/') || storage_key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
