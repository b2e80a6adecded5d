//! Service initialization and application state setup

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::{Config, RandomAssetIds};
use tubely_db::{InMemoryVideoRepository, PgVideoRepository, VideoStore};
use tubely_processing::{FfmpegRemuxer, FfprobeInspector, StagingArea};
use tubely_storage::Storage;

use crate::auth::JwtService;
use crate::services::upload::{UploadLimits, UploadPipeline};
use crate::state::AppState;

/// Wire repositories, media tools and the upload pipeline into [`AppState`].
pub fn initialize_services(
    config: &Config,
    pool: Option<PgPool>,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let videos: Arc<dyn VideoStore> = match pool {
        Some(pool) => Arc::new(PgVideoRepository::new(pool)),
        None => Arc::new(InMemoryVideoRepository::new()),
    };

    let timeout = config.media_tool_timeout();
    let remuxer = FfmpegRemuxer::new(config.ffmpeg_path().to_string(), timeout)
        .context("Failed to configure ffmpeg")?;
    let inspector = FfprobeInspector::new(config.ffprobe_path().to_string(), timeout)
        .context("Failed to configure ffprobe")?;

    let staging = StagingArea::new(config.staging_dir());
    let limits = UploadLimits::from_config(config);

    tracing::info!(
        ffmpeg_path = %config.ffmpeg_path(),
        ffprobe_path = %config.ffprobe_path(),
        timeout_secs = timeout.as_secs(),
        staging_dir = %staging.dir().display(),
        max_thumbnail_bytes = limits.thumbnail_bytes,
        max_video_bytes = limits.video_bytes,
        "Upload pipeline configured"
    );

    let uploads = UploadPipeline::new(
        videos.clone(),
        storage,
        Arc::new(remuxer),
        Arc::new(inspector),
        Arc::new(RandomAssetIds),
        staging,
        limits,
    );

    let jwt = JwtService::new(config.jwt_secret(), config.jwt_expiry_hours());

    Ok(Arc::new(AppState::new(videos, uploads, jwt)))
}
