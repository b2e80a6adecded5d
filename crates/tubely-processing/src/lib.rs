//! Tubely Processing Library
//!
//! Media-type validation, upload staging, and the external-tool adapters used
//! by the ingestion pipeline:
//!
//! - [`validate_media_type`] whitelists declared content types per asset class
//! - [`StagingArea`] copies an upload stream to a drop-guarded temp file
//! - [`FfmpegRemuxer`] rewrites MP4 containers for fast start
//! - [`FfprobeInspector`] reads stream geometry for aspect classification

pub mod staging;
pub mod traits;
pub mod validator;
pub mod video;

pub use staging::{StagedFile, StagingArea, StagingError};
pub use traits::{InspectError, Remuxer, StreamInspector, TranscodeError};
pub use validator::{validate_media_type, ValidationError};
pub use video::{FfmpegRemuxer, FfprobeInspector};
