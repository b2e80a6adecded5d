//! Record store trait used by the upload pipeline

use async_trait::async_trait;
use tubely_core::{AppError, Video};
use uuid::Uuid;

/// Video metadata store.
///
/// Each operation is atomic for a single record.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Insert a new record and return it as stored.
    async fn create_video(&self, video: &Video) -> Result<Video, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Point the record's thumbnail at `url` and bump `updated_at`.
    ///
    /// Only that column is written, so a concurrent write to any other field
    /// survives. Returns [`AppError::NotFound`] when the record no longer exists.
    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<Video, AppError>;

    /// Point the record's video at `url` and bump `updated_at`.
    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<Video, AppError>;
}
