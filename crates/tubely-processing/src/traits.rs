//! Seams for the external media tools
//!
//! The upload pipeline only sees these traits; the ffmpeg/ffprobe adapters in
//! [`crate::video`] are the production implementations.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tubely_core::{AppError, AspectClass};

/// Container remux failures
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("{tool} is not available: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{tool} timed out after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    #[error("{tool} produced no output")]
    EmptyOutput { tool: String },

    #[error("IO error during remux: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TranscodeError> for AppError {
    fn from(err: TranscodeError) -> Self {
        match err {
            TranscodeError::ToolUnavailable { .. } => AppError::ToolUnavailable(err.to_string()),
            other => AppError::TranscodeFailed(other.to_string()),
        }
    }
}

/// Stream inspection failures
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("{tool} is not available: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{tool} timed out after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    #[error("No video stream found")]
    NoVideoStream,

    #[error("Unparseable probe output: {0}")]
    Parse(String),

    #[error("IO error during inspection: {0}")]
    Io(#[from] std::io::Error),
}

impl From<InspectError> for AppError {
    fn from(err: InspectError) -> Self {
        match err {
            InspectError::ToolUnavailable { .. } => AppError::ToolUnavailable(err.to_string()),
            InspectError::NoVideoStream => AppError::NoVideoStream(err.to_string()),
            other => AppError::InspectionFailed(other.to_string()),
        }
    }
}

/// Rewrites a video container so its index precedes the media data, without
/// re-encoding.
#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Remux `input` into `output`. `output` must not be the input path.
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}

/// Reads stream geometry from a media file.
#[async_trait]
pub trait StreamInspector: Send + Sync {
    /// Width and height of the first video stream.
    async fn video_dimensions(&self, path: &Path) -> Result<(u32, u32), InspectError>;

    /// Aspect bucket of the first video stream.
    async fn inspect_aspect(&self, path: &Path) -> Result<AspectClass, InspectError> {
        let (width, height) = self.video_dimensions(path).await?;
        let aspect = AspectClass::from_dimensions(width, height);
        tracing::debug!(width, height, aspect = %aspect, "Classified video stream");
        Ok(aspect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedDimensions(u32, u32);

    #[async_trait]
    impl StreamInspector for FixedDimensions {
        async fn video_dimensions(&self, _path: &Path) -> Result<(u32, u32), InspectError> {
            Ok((self.0, self.1))
        }
    }

    #[tokio::test]
    async fn test_inspect_aspect_classifies_dimensions() {
        let path = Path::new("unused.mp4");
        assert_eq!(
            FixedDimensions(1920, 1080).inspect_aspect(path).await.unwrap(),
            AspectClass::Landscape
        );
        assert_eq!(
            FixedDimensions(1080, 1920).inspect_aspect(path).await.unwrap(),
            AspectClass::Portrait
        );
        assert_eq!(
            FixedDimensions(1000, 1000).inspect_aspect(path).await.unwrap(),
            AspectClass::Other
        );
    }

    #[test]
    fn test_error_mapping() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: AppError = TranscodeError::ToolUnavailable {
            tool: "ffmpeg".into(),
            source: missing,
        }
        .into();
        assert!(matches!(err, AppError::ToolUnavailable(_)));

        let err: AppError = TranscodeError::Failed {
            tool: "ffmpeg".into(),
            status: "exit status: 1".into(),
            stderr: "moov atom not found".into(),
        }
        .into();
        match err {
            AppError::TranscodeFailed(msg) => assert!(msg.contains("moov atom not found")),
            other => panic!("unexpected {:?}", other),
        }

        let err: AppError = InspectError::NoVideoStream.into();
        assert!(matches!(err, AppError::NoVideoStream(_)));

        let err: AppError = InspectError::Parse("eof".into()).into();
        assert!(matches!(err, AppError::InspectionFailed(_)));
    }
}
