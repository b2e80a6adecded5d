//! Upload staging
//!
//! An inbound upload is copied to a uniquely named file in the staging
//! directory before anything else touches it. [`StagedFile`] owns that file
//! through a [`TempPath`], so the file is removed on every exit path, including
//! early returns, errors and a dropped request future.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tubely_core::AppError;

const STAGED_FILE_PREFIX: &str = "tubely-upload-";

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("Upload exceeds the limit of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Failed to read upload stream: {0}")]
    Read(#[source] std::io::Error),

    #[error("Staging IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::TooLarge { limit } => AppError::PayloadTooLarge(format!(
                "File exceeds the maximum size of {} bytes",
                limit
            )),
            StagingError::Read(e) => {
                AppError::InvalidInput(format!("Failed to read upload: {}", e))
            }
            StagingError::Io(e) => AppError::Internal(format!("Failed to stage upload: {}", e)),
        }
    }
}

/// Directory uploads are staged into.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `reader` into a new staged file, failing with
    /// [`StagingError::TooLarge`] once more than `limit` bytes arrive.
    ///
    /// On success the file handle is rewound to byte 0.
    pub async fn stage<R>(&self, reader: R, limit: u64) -> Result<StagedFile, StagingError>
    where
        R: AsyncRead + Unpin,
    {
        tokio::fs::create_dir_all(&self.dir).await?;

        let named = tempfile::Builder::new()
            .prefix(STAGED_FILE_PREFIX)
            .tempfile_in(&self.dir)?;
        let (std_file, path) = named.into_parts();
        let mut file = File::from_std(std_file);

        // One byte past the limit is enough to detect an oversized upload
        // without draining the rest of the stream.
        let mut limited = reader.take(limit.saturating_add(1));
        let size = tokio::io::copy(&mut limited, &mut file)
            .await
            .map_err(StagingError::Read)?;

        if size > limit {
            tracing::debug!(limit, "Upload exceeded staging limit");
            return Err(StagingError::TooLarge { limit });
        }

        file.flush().await?;
        file.seek(SeekFrom::Start(0)).await?;

        tracing::debug!(path = %path.display(), size_bytes = size, "Upload staged");

        Ok(StagedFile { path, file, size })
    }

    /// Path for a file derived from `staged` (e.g. a remux output), guarded the
    /// same way. The file itself is not created.
    pub fn derived_path(&self, staged: &StagedFile, suffix: &str) -> TempPath {
        let mut name = staged.path().as_os_str().to_owned();
        name.push(suffix);
        TempPath::from_path(PathBuf::from(name))
    }
}

/// A staged upload on local disk, removed when dropped.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
    file: File,
    size: u64,
}

impl StagedFile {
    /// Adopt an existing file (such as a tool's output) into a staged file.
    pub async fn open(path: TempPath) -> Result<Self, StagingError> {
        let file = File::open(&path).await?;
        let size = file.metadata().await?.len();
        Ok(Self { path, file, size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Hand out the open file, positioned at byte 0, keeping the path guard.
    pub fn into_reader(self) -> (File, TempPath) {
        (self.file, self.path)
    }

    /// Close and delete the file now rather than at drop.
    pub fn release(self) -> Result<(), StagingError> {
        let Self { path, file, .. } = self;
        drop(file);
        path.close()?;
        Ok(())
    }
}
