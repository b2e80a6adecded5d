//! Fast-start remux via ffmpeg

use super::command::{diagnostic, run_tool, validate_tool_path, ToolError};
use crate::traits::{Remuxer, TranscodeError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

/// Stream-copies an MP4 with the `moov` atom moved to the front.
#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: String, timeout: Duration) -> Result<Self> {
        validate_tool_path(&ffmpeg_path).context("Invalid ffmpeg_path")?;
        Ok(Self {
            ffmpeg_path,
            timeout,
        })
    }

    fn args(input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-i".into(), input.into()];
        args.extend(
            ["-c", "copy", "-movflags", "faststart", "-f", "mp4"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(output.into());
        args
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        if input == output {
            return Err(TranscodeError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "remux output must differ from input",
            )));
        }

        let start = std::time::Instant::now();
        let tool = "ffmpeg".to_string();

        let result = run_tool(&self.ffmpeg_path, Self::args(input, output), self.timeout).await;
        let out = match result {
            Ok(out) => out,
            Err(ToolError::Unavailable(source)) => {
                tracing::error!(error = %source, "ffmpeg is not available");
                return Err(TranscodeError::ToolUnavailable { tool, source });
            }
            Err(ToolError::Timeout) => {
                tracing::error!(timeout_secs = self.timeout.as_secs(), "ffmpeg timed out");
                return Err(TranscodeError::Timeout {
                    tool,
                    timeout: self.timeout,
                });
            }
            Err(ToolError::Io(e)) => return Err(TranscodeError::Io(e)),
        };

        if !out.status.success() {
            let stderr = diagnostic(&out.stderr);
            tracing::error!(status = %out.status, stderr = %stderr, "ffmpeg remux failed");
            return Err(TranscodeError::Failed {
                tool,
                status: out.status.to_string(),
                stderr,
            });
        }

        let written = tokio::fs::metadata(output)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            tracing::error!("ffmpeg exited successfully without writing output");
            return Err(TranscodeError::EmptyOutput { tool });
        }

        tracing::info!(
            size_bytes = written,
            duration_ms = start.elapsed().as_millis(),
            "Video remuxed for fast start"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_remux_arguments() {
        let args = FfmpegRemuxer::args(Path::new("/tmp/in"), Path::new("/tmp/in.processing"));
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-i",
                "/tmp/in",
                "-c",
                "copy",
                "-movflags",
                "faststart",
                "-f",
                "mp4",
                "/tmp/in.processing"
            ]
        );
    }

    #[test]
    fn test_rejects_unsafe_path() {
        assert!(FfmpegRemuxer::new("ffmpeg && echo".to_string(), Duration::from_secs(1)).is_err());
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_is_tool_unavailable() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"not really mp4").unwrap();

        let remuxer =
            FfmpegRemuxer::new("/nonexistent/ffmpeg".to_string(), Duration::from_secs(5)).unwrap();
        let result = remuxer.remux(&input, &dir.path().join("out.mp4")).await;
        assert!(matches!(result, Err(TranscodeError::ToolUnavailable { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failed() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"data").unwrap();

        let remuxer = FfmpegRemuxer::new("false".to_string(), Duration::from_secs(5)).unwrap();
        let result = remuxer.remux(&input, &dir.path().join("out.mp4")).await;
        assert!(matches!(result, Err(TranscodeError::Failed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_without_output_is_failure() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"data").unwrap();

        let remuxer = FfmpegRemuxer::new("true".to_string(), Duration::from_secs(5)).unwrap();
        let result = remuxer.remux(&input, &dir.path().join("out.mp4")).await;
        assert!(matches!(result, Err(TranscodeError::EmptyOutput { .. })));
    }

    #[tokio::test]
    async fn test_same_input_and_output_rejected() {
        let remuxer = FfmpegRemuxer::new("ffmpeg".to_string(), Duration::from_secs(5)).unwrap();
        let path = Path::new("/tmp/same.mp4");
        assert!(remuxer.remux(path, path).await.is_err());
    }
}
