//! Bounded invocation of external media tools.

use anyhow::{anyhow, Result};
use std::ffi::OsStr;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Longest stretch of tool stderr kept in errors and logs.
const MAX_DIAGNOSTIC_BYTES: usize = 4096;

pub(crate) enum ToolError {
    /// Binary missing or not executable.
    Unavailable(std::io::Error),
    Timeout,
    Io(std::io::Error),
}

/// Reject executable paths carrying shell metacharacters.
pub(crate) fn validate_tool_path(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() {
        return Err(anyhow!("Tool path is empty"));
    }
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Tool path contains dangerous characters: {}", path));
    }
    Ok(())
}

/// Run `program` with `args`, killing it if it outlives `timeout`.
///
/// stdin is closed and stdout/stderr are captured.
pub(crate) async fn run_tool<I, S>(program: &str, args: I, timeout: Duration) -> Result<Output, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                ToolError::Unavailable(e)
            }
            _ => ToolError::Io(e),
        })?;

    // Dropping the wait future on timeout drops the child, which kills it.
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(ToolError::Io(e)),
        Err(_) => Err(ToolError::Timeout),
    }
}

/// Tail of the tool's stderr, lossily decoded.
pub(crate) fn diagnostic(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(MAX_DIAGNOSTIC_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}
