//! Shared constants

/// Number of random bytes in an asset identifier (128 bits).
pub const ASSET_ID_BYTES: usize = 16;

/// Extension used when a media type carries no usable subtype.
pub const FALLBACK_EXTENSION: &str = ".bin";

/// JWT issuer for access tokens.
pub const JWT_ISSUER: &str = "tubely-access";

pub const BYTES_PER_MB: u64 = 1024 * 1024;
