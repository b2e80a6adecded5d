//! Stream geometry via ffprobe

use super::command::{diagnostic, run_tool, validate_tool_path, ToolError};
use crate::traits::{InspectError, StreamInspector};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Width and height of the first video stream in ffprobe's JSON output.
///
/// An empty stream list (or one without any video stream) is
/// [`InspectError::NoVideoStream`]; a video stream without positive
/// dimensions is a parse failure.
pub fn parse_probe_output(stdout: &[u8]) -> Result<(u32, u32), InspectError> {
    let probe: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| InspectError::Parse(format!("invalid ffprobe JSON: {}", e)))?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref().map_or(true, |t| t == "video"))
        .ok_or(InspectError::NoVideoStream)?;

    match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
        (w, h) => Err(InspectError::Parse(format!(
            "video stream has no usable dimensions (width: {:?}, height: {:?})",
            w, h
        ))),
    }
}

/// Reads stream metadata with `ffprobe -v error -print_format json -show_streams`.
#[derive(Debug, Clone)]
pub struct FfprobeInspector {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeInspector {
    pub fn new(ffprobe_path: String, timeout: Duration) -> Result<Self> {
        validate_tool_path(&ffprobe_path).context("Invalid ffprobe_path")?;
        Ok(Self {
            ffprobe_path,
            timeout,
        })
    }

    fn args(path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(path.into());
        args
    }
}

#[async_trait]
impl StreamInspector for FfprobeInspector {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn video_dimensions(&self, path: &Path) -> Result<(u32, u32), InspectError> {
        let start = std::time::Instant::now();
        let tool = "ffprobe".to_string();

        let out = match run_tool(&self.ffprobe_path, Self::args(path), self.timeout).await {
            Ok(out) => out,
            Err(ToolError::Unavailable(source)) => {
                tracing::error!(error = %source, "ffprobe is not available");
                return Err(InspectError::ToolUnavailable { tool, source });
            }
            Err(ToolError::Timeout) => {
                tracing::error!(timeout_secs = self.timeout.as_secs(), "ffprobe timed out");
                return Err(InspectError::Timeout {
                    tool,
                    timeout: self.timeout,
                });
            }
            Err(ToolError::Io(e)) => return Err(InspectError::Io(e)),
        };

        if !out.status.success() {
            let stderr = diagnostic(&out.stderr);
            tracing::error!(status = %out.status, stderr = %stderr, "ffprobe failed");
            return Err(InspectError::Failed {
                tool,
                status: out.status.to_string(),
                stderr,
            });
        }

        let (width, height) = parse_probe_output(&out.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            width,
            height,
            "Video probe completed"
        );

        Ok((width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_video_stream() {
        let json = br#"{"streams":[{"index":0,"codec_type":"video","codec_name":"h264","width":1920,"height":1080}]}"#;
        assert_eq!(parse_probe_output(json).unwrap(), (1920, 1080));
    }

    #[test]
    fn test_parse_skips_audio_streams() {
        let json = br#"{"streams":[
            {"index":0,"codec_type":"audio","codec_name":"aac"},
            {"index":1,"codec_type":"video","width":1080,"height":1920}
        ]}"#;
        assert_eq!(parse_probe_output(json).unwrap(), (1080, 1920));
    }

    #[test]
    fn test_parse_no_streams() {
        assert!(matches!(
            parse_probe_output(br#"{"streams":[]}"#),
            Err(InspectError::NoVideoStream)
        ));
        assert!(matches!(
            parse_probe_output(br#"{}"#),
            Err(InspectError::NoVideoStream)
        ));
        assert!(matches!(
            parse_probe_output(br#"{"streams":[{"codec_type":"audio"}]}"#),
            Err(InspectError::NoVideoStream)
        ));
    }

    #[test]
    fn test_parse_missing_dimensions() {
        assert!(matches!(
            parse_probe_output(br#"{"streams":[{"codec_type":"video"}]}"#),
            Err(InspectError::Parse(_))
        ));
        assert!(matches!(
            parse_probe_output(br#"{"streams":[{"codec_type":"video","width":0,"height":0}]}"#),
            Err(InspectError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_probe_output(b"Invalid data found when processing input"),
            Err(InspectError::Parse(_))
        ));
    }

    #[test]
    fn test_probe_arguments() {
        let args: Vec<String> = FfprobeInspector::args(Path::new("/tmp/v.mp4"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[..5], ["-v", "error", "-print_format", "json", "-show_streams"]);
        assert_eq!(args.last().unwrap(), "/tmp/v.mp4");
    }

    #[tokio::test]
    async fn test_missing_ffprobe_is_tool_unavailable() {
        let inspector =
            FfprobeInspector::new("/nonexistent/ffprobe".to_string(), Duration::from_secs(5))
                .unwrap();
        let result = inspector.inspect_aspect(Path::new("/tmp/none.mp4")).await;
        assert!(matches!(result, Err(InspectError::ToolUnavailable { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failed() {
        let inspector = FfprobeInspector::new("false".to_string(), Duration::from_secs(5)).unwrap();
        let result = inspector.video_dimensions(Path::new("/tmp/none.mp4")).await;
        assert!(matches!(result, Err(InspectError::Failed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_output_is_parse_failure() {
        let inspector = FfprobeInspector::new("true".to_string(), Duration::from_secs(5)).unwrap();
        let result = inspector.video_dimensions(Path::new("/tmp/none.mp4")).await;
        assert!(matches!(result, Err(InspectError::Parse(_))));
    }
}
