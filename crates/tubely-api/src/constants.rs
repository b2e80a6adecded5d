//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Route the local storage backend is served from.
pub const ASSETS_ROUTE: &str = "/assets";

/// Headroom on top of the media size limit for multipart framing and other fields.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Suffix of the remux output written next to a staged upload.
pub const REMUX_SUFFIX: &str = ".processing";
