//! Asset identifiers and file extensions.

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::constants::{ASSET_ID_BYTES, FALLBACK_EXTENSION};

/// Source of storage object identifiers.
///
/// Identifiers must be unique with overwhelming probability and safe to embed
/// in a storage key and a URL path segment.
pub trait AssetIdGenerator: Send + Sync {
    fn new_asset_id(&self) -> String;
}

/// 128-bit identifiers from the operating system CSPRNG, hex encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAssetIds;

impl AssetIdGenerator for RandomAssetIds {
    /// # Panics
    ///
    /// Panics if the operating system entropy source fails. A predictable
    /// identifier would let clients guess object keys, so there is no fallback.
    fn new_asset_id(&self) -> String {
        let mut buf = [0u8; ASSET_ID_BYTES];
        if let Err(e) = OsRng.try_fill_bytes(&mut buf) {
            panic!("OS entropy source failed while generating asset id: {}", e);
        }
        hex::encode(buf)
    }
}

/// File extension (with leading dot) for a canonical media type.
///
/// `type/subtype` yields `.subtype`; anything else yields `.bin`.
pub fn extension_for(media_type: &str) -> String {
    let parts: Vec<&str> = media_type.split('/').collect();
    match parts.as_slice() {
        [kind, subtype] if !kind.is_empty() && !subtype.is_empty() => format!(".{}", subtype),
        _ => FALLBACK_EXTENSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_filename_safe_hex() {
        let id = RandomAssetIds.new_asset_id();
        assert_eq!(id.len(), ASSET_ID_BYTES * 2);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_ten_thousand_ids_are_distinct() {
        let ids: HashSet<String> = (0..10_000).map(|_| RandomAssetIds.new_asset_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/png"), ".png");
        assert_eq!(extension_for("image/jpeg"), ".jpeg");
        assert_eq!(extension_for("video/mp4"), ".mp4");
        assert_eq!(extension_for("png"), ".bin");
        assert_eq!(extension_for("a/b/c"), ".bin");
        assert_eq!(extension_for("image/"), ".bin");
        assert_eq!(extension_for(""), ".bin");
    }
}
