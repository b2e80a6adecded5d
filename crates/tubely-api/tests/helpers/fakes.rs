//! Stand-ins for ffmpeg, ffprobe and the random asset id source.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tubely_core::AssetIdGenerator;
use tubely_processing::{InspectError, Remuxer, StreamInspector, TranscodeError};

/// Copies the input byte for byte.
pub struct CopyRemuxer;

#[async_trait]
impl Remuxer for CopyRemuxer {
    async fn remux(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

/// Truncated output followed by a non-zero exit, like ffmpeg dying mid-write.
pub struct PartialOutputRemuxer;

#[async_trait]
impl Remuxer for PartialOutputRemuxer {
    async fn remux(&self, _input: &Path, output: &Path) -> Result<(), TranscodeError> {
        tokio::fs::write(output, b"\x00\x00\x00\x18ftyp").await?;
        Err(TranscodeError::Failed {
            tool: "ffmpeg".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "moov atom not found".to_string(),
        })
    }
}

/// Reports the same geometry for every file and records what else was
/// staged next to the file it inspected.
pub struct FixedInspector {
    dimensions: Option<(u32, u32)>,
    staged: Mutex<Option<Vec<String>>>,
}

impl FixedInspector {
    pub fn new(dimensions: Option<(u32, u32)>) -> Self {
        Self {
            dimensions,
            staged: Mutex::new(None),
        }
    }

    /// File names in the staging directory during the last inspection.
    pub fn staged_at_inspection(&self) -> Option<Vec<String>> {
        self.staged.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreamInspector for FixedInspector {
    async fn video_dimensions(&self, path: &Path) -> Result<(u32, u32), InspectError> {
        let dir = path.parent().expect("inspected file has a parent");
        let mut names: Vec<String> = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<Result<_, _>>()?;
        names.sort();
        *self.staged.lock().unwrap() = Some(names);

        self.dimensions.ok_or(InspectError::NoVideoStream)
    }
}

/// Ids `000…001`, `000…002`, … so keys are predictable.
#[derive(Default)]
pub struct SequentialIds(AtomicUsize);

impl SequentialIds {
    pub fn nth(n: usize) -> String {
        format!("{:032x}", n)
    }
}

impl AssetIdGenerator for SequentialIds {
    fn new_asset_id(&self) -> String {
        Self::nth(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}
