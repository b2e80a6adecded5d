//! Upload pipeline
//!
//! Both upload kinds run the same sequence: resolve the record and check
//! ownership, validate the declared media type, stage the body to disk, derive
//! the storage key, persist the object, then commit its URL to the record.
//! Videos are additionally remuxed for fast start and classified by aspect
//! ratio between staging and persisting.
//!
//! Every staged or derived file is owned by a drop guard, so nothing is left in
//! the staging directory whichever step fails.

use std::sync::Arc;

use tokio::io::AsyncRead;
use tubely_core::{AppError, AssetClass, AssetIdGenerator, Video};
use tubely_db::VideoStore;
use tubely_processing::{
    validate_media_type, Remuxer, StagedFile, StagingArea, StreamInspector,
};
use tubely_storage::{Storage, StorageKey};
use uuid::Uuid;

use super::types::UploadLimits;
use crate::auth::Principal;
use crate::constants::REMUX_SUFFIX;

#[derive(Clone)]
pub struct UploadPipeline {
    videos: Arc<dyn VideoStore>,
    storage: Arc<dyn Storage>,
    remuxer: Arc<dyn Remuxer>,
    inspector: Arc<dyn StreamInspector>,
    ids: Arc<dyn AssetIdGenerator>,
    staging: StagingArea,
    limits: UploadLimits,
}

impl UploadPipeline {
    pub fn new(
        videos: Arc<dyn VideoStore>,
        storage: Arc<dyn Storage>,
        remuxer: Arc<dyn Remuxer>,
        inspector: Arc<dyn StreamInspector>,
        ids: Arc<dyn AssetIdGenerator>,
        staging: StagingArea,
        limits: UploadLimits,
    ) -> Self {
        Self {
            videos,
            storage,
            remuxer,
            inspector,
            ids,
            staging,
            limits,
        }
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Load the record and require that `principal` owns it.
    pub async fn authorize(&self, principal: &Principal, video_id: Uuid) -> Result<Video, AppError> {
        let video = self
            .videos
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        if !video.is_owned_by(principal.user_id) {
            tracing::warn!(
                video_id = %video_id,
                owner_id = %video.user_id,
                "Upload attempted by non-owner"
            );
            return Err(AppError::Forbidden(
                "You do not own this video".to_string(),
            ));
        }

        Ok(video)
    }

    /// Store a thumbnail image and record its URL on the video.
    #[tracing::instrument(skip(self, principal, content_type, body), fields(
        video_id = %video_id,
        user_id = %principal.user_id,
        asset.class = "thumbnail"
    ))]
    pub async fn upload_thumbnail<R>(
        &self,
        principal: &Principal,
        video_id: Uuid,
        content_type: Option<&str>,
        body: R,
    ) -> Result<Video, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let class = AssetClass::Thumbnail;
        self.authorize(principal, video_id).await?;
        let media_type = validate_media_type(content_type, class)?;

        let staged = self.staging.stage(body, self.limits.for_class(class)).await?;

        let asset_id = self.ids.new_asset_id();
        let key = StorageKey::thumbnail(&asset_id, &media_type).to_string();
        let url = self.persist(&key, &media_type, staged).await?;

        let updated = self.commit(video_id, class, &url, &key).await?;

        tracing::info!(storage_key = %key, "Thumbnail uploaded");
        Ok(updated)
    }

    /// Remux, classify and store a video file and record its URL on the video.
    #[tracing::instrument(skip(self, principal, content_type, body), fields(
        video_id = %video_id,
        user_id = %principal.user_id,
        asset.class = "video"
    ))]
    pub async fn upload_video<R>(
        &self,
        principal: &Principal,
        video_id: Uuid,
        content_type: Option<&str>,
        body: R,
    ) -> Result<Video, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let class = AssetClass::Video;
        self.authorize(principal, video_id).await?;
        let media_type = validate_media_type(content_type, class)?;

        let staged = self.staging.stage(body, self.limits.for_class(class)).await?;

        let output = self.staging.derived_path(&staged, REMUX_SUFFIX);
        self.remuxer.remux(staged.path(), &output).await?;
        if let Err(e) = staged.release() {
            tracing::warn!(error = %e, "Failed to release staged upload");
        }
        let processed = StagedFile::open(output).await?;

        let aspect = self.inspector.inspect_aspect(processed.path()).await?;

        let asset_id = self.ids.new_asset_id();
        let key = StorageKey::video(&asset_id, aspect).to_string();
        let url = self.persist(&key, &media_type, processed).await?;

        let updated = self.commit(video_id, class, &url, &key).await?;

        tracing::info!(
            storage_key = %key,
            aspect = %aspect,
            aspect.ratio = aspect.ratio(),
            "Video uploaded"
        );
        Ok(updated)
    }

    async fn persist(
        &self,
        key: &str,
        content_type: &str,
        file: StagedFile,
    ) -> Result<String, AppError> {
        let size = file.size();
        // The guard keeps the staged path alive until the upload has finished.
        let (reader, _guard) = file.into_reader();
        let url = self
            .storage
            .upload_stream(key, content_type, Some(size), Box::pin(reader))
            .await?;
        Ok(url)
    }

    /// Set the one URL field `class` owns; on failure remove the object that
    /// was just stored.
    async fn commit(
        &self,
        video_id: Uuid,
        class: AssetClass,
        url: &str,
        key: &str,
    ) -> Result<Video, AppError> {
        let result = match class {
            AssetClass::Thumbnail => self.videos.set_thumbnail_url(video_id, url).await,
            AssetClass::Video => self.videos.set_video_url(video_id, url).await,
        };

        match result {
            Ok(updated) => Ok(updated),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    storage_key = %key,
                    "Failed to update video record, removing stored object"
                );
                if let Err(cleanup) = self.storage.delete(key).await {
                    tracing::error!(
                        error = %cleanup,
                        storage_key = %key,
                        "Failed to remove orphaned object"
                    );
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tubely_db::InMemoryVideoRepository;
    use tubely_processing::{InspectError, TranscodeError};
    use tubely_storage::LocalStorage;

    struct CopyRemuxer;

    #[async_trait]
    impl Remuxer for CopyRemuxer {
        async fn remux(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
            tokio::fs::copy(input, output).await?;
            Ok(())
        }
    }

    /// Sets a thumbnail on the record while the remux is still running.
    struct ThumbnailRacingRemuxer {
        videos: InMemoryVideoRepository,
        video_id: Uuid,
    }

    #[async_trait]
    impl Remuxer for ThumbnailRacingRemuxer {
        async fn remux(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
            tokio::fs::copy(input, output).await?;
            self.videos
                .set_thumbnail_url(self.video_id, "http://x/thumb.png")
                .await
                .unwrap();
            Ok(())
        }
    }

    /// Leaves a truncated output behind, then exits non-zero.
    struct PartialOutputRemuxer;

    #[async_trait]
    impl Remuxer for PartialOutputRemuxer {
        async fn remux(&self, _input: &Path, output: &Path) -> Result<(), TranscodeError> {
            tokio::fs::write(output, b"ftyp").await?;
            Err(TranscodeError::Failed {
                tool: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "moov atom not found".to_string(),
            })
        }
    }

    /// Answers fixed dimensions; the inspected file must be the only one staged.
    struct FixedInspector(Result<(u32, u32), ()>);

    #[async_trait]
    impl StreamInspector for FixedInspector {
        async fn video_dimensions(&self, path: &Path) -> Result<(u32, u32), InspectError> {
            let staged: Vec<_> = std::fs::read_dir(path.parent().unwrap())
                .unwrap()
                .map(|e| e.unwrap().path())
                .collect();
            assert_eq!(staged, vec![path.to_path_buf()]);
            self.0.map_err(|_| InspectError::NoVideoStream)
        }
    }

    #[derive(Default)]
    struct CountingIds(AtomicUsize);

    impl AssetIdGenerator for CountingIds {
        fn new_asset_id(&self) -> String {
            format!("{:032x}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    /// Store whose updates always fail.
    struct ReadOnlyStore(InMemoryVideoRepository);

    #[async_trait]
    impl VideoStore for ReadOnlyStore {
        async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
            self.0.create_video(video).await
        }
        async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
            self.0.get_video(id).await
        }
        async fn set_thumbnail_url(&self, _id: Uuid, _url: &str) -> Result<Video, AppError> {
            Err(AppError::Internal("record store offline".to_string()))
        }
        async fn set_video_url(&self, _id: Uuid, _url: &str) -> Result<Video, AppError> {
            Err(AppError::Internal("record store offline".to_string()))
        }
    }

    struct Fixture {
        pipeline: UploadPipeline,
        storage_dir: TempDir,
        staging_dir: TempDir,
    }

    async fn fixture(
        videos: Arc<dyn VideoStore>,
        dimensions: Result<(u32, u32), ()>,
    ) -> Fixture {
        fixture_with(videos, Arc::new(CopyRemuxer), dimensions).await
    }

    async fn fixture_with(
        videos: Arc<dyn VideoStore>,
        remuxer: Arc<dyn Remuxer>,
        dimensions: Result<(u32, u32), ()>,
    ) -> Fixture {
        let storage_dir = TempDir::new().unwrap();
        let staging_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(
            storage_dir.path(),
            "http://localhost:8091/assets".to_string(),
        )
        .await
        .unwrap();

        let pipeline = UploadPipeline::new(
            videos,
            Arc::new(storage),
            remuxer,
            Arc::new(FixedInspector(dimensions)),
            Arc::new(CountingIds::default()),
            StagingArea::new(staging_dir.path()),
            UploadLimits {
                thumbnail_bytes: 1024,
                video_bytes: 4096,
            },
        );

        Fixture {
            pipeline,
            storage_dir,
            staging_dir,
        }
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| {
                let path = e.unwrap().path();
                if path.is_dir() {
                    entries(&path)
                } else {
                    1
                }
            })
            .sum()
    }

    #[tokio::test]
    async fn test_portrait_video_is_keyed_by_aspect() {
        let repo = InMemoryVideoRepository::new();
        let owner = Principal {
            user_id: Uuid::new_v4(),
        };
        let video = repo
            .create_video(&Video::new(owner.user_id, "Vertical".to_string(), None))
            .await
            .unwrap();
        let fx = fixture(Arc::new(repo), Ok((1080, 1920))).await;

        let updated = fx
            .pipeline
            .upload_video(&owner, video.id, Some("video/mp4"), &b"mp4 bytes"[..])
            .await
            .unwrap();

        let expected_key = format!("portrait/{:032x}.mp4", 1);
        assert!(updated.video_url.unwrap().ends_with(&expected_key));
        assert!(fx.storage_dir.path().join(&expected_key).exists());
        assert_eq!(entries(fx.staging_dir.path()), 0);
    }

    #[tokio::test]
    async fn test_video_commit_keeps_thumbnail_set_during_remux() {
        let repo = InMemoryVideoRepository::new();
        let owner = Principal {
            user_id: Uuid::new_v4(),
        };
        let video = repo
            .create_video(&Video::new(owner.user_id, "Racing".to_string(), None))
            .await
            .unwrap();
        let remuxer = ThumbnailRacingRemuxer {
            videos: repo.clone(),
            video_id: video.id,
        };
        let fx = fixture_with(
            Arc::new(repo.clone()),
            Arc::new(remuxer),
            Ok((1920, 1080)),
        )
        .await;

        let updated = fx
            .pipeline
            .upload_video(&owner, video.id, Some("video/mp4"), &b"mp4 bytes"[..])
            .await
            .unwrap();

        assert_eq!(updated.thumbnail_url.as_deref(), Some("http://x/thumb.png"));
        assert!(updated
            .video_url
            .as_deref()
            .unwrap()
            .ends_with(&format!("landscape/{:032x}.mp4", 1)));

        let stored = repo.get_video(video.id).await.unwrap().unwrap();
        assert_eq!(stored.thumbnail_url.as_deref(), Some("http://x/thumb.png"));
        assert_eq!(stored.video_url, updated.video_url);
    }

    #[tokio::test]
    async fn test_failed_remux_removes_partial_output() {
        let repo = InMemoryVideoRepository::new();
        let owner = Principal {
            user_id: Uuid::new_v4(),
        };
        let video = repo
            .create_video(&Video::new(owner.user_id, "Broken".to_string(), None))
            .await
            .unwrap();
        let fx = fixture_with(
            Arc::new(repo.clone()),
            Arc::new(PartialOutputRemuxer),
            Ok((1920, 1080)),
        )
        .await;

        let result = fx
            .pipeline
            .upload_video(&owner, video.id, Some("video/mp4"), &b"mp4 bytes"[..])
            .await;

        assert!(matches!(result, Err(AppError::TranscodeFailed(_))));
        assert_eq!(entries(fx.staging_dir.path()), 0);
        assert_eq!(entries(fx.storage_dir.path()), 0);
        let stored = repo.get_video(video.id).await.unwrap().unwrap();
        assert_eq!(stored.video_url, None);
    }

    #[tokio::test]
    async fn test_failed_commit_removes_stored_object() {
        let repo = InMemoryVideoRepository::new();
        let owner = Principal {
            user_id: Uuid::new_v4(),
        };
        let video = repo
            .create_video(&Video::new(owner.user_id, "Doomed".to_string(), None))
            .await
            .unwrap();
        let fx = fixture(Arc::new(ReadOnlyStore(repo)), Ok((1920, 1080))).await;

        let result = fx
            .pipeline
            .upload_thumbnail(&owner, video.id, Some("image/png"), &b"png bytes"[..])
            .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(entries(fx.storage_dir.path()), 0);
        assert_eq!(entries(fx.staging_dir.path()), 0);
    }

    #[tokio::test]
    async fn test_no_video_stream_cleans_up() {
        let repo = InMemoryVideoRepository::new();
        let owner = Principal {
            user_id: Uuid::new_v4(),
        };
        let video = repo
            .create_video(&Video::new(owner.user_id, "Silent".to_string(), None))
            .await
            .unwrap();
        let fx = fixture(Arc::new(repo.clone()), Err(())).await;

        let result = fx
            .pipeline
            .upload_video(&owner, video.id, Some("video/mp4"), &b"audio only"[..])
            .await;

        assert!(matches!(result, Err(AppError::NoVideoStream(_))));
        assert_eq!(entries(fx.staging_dir.path()), 0);
        assert_eq!(entries(fx.storage_dir.path()), 0);
        let stored = repo.get_video(video.id).await.unwrap().unwrap();
        assert_eq!(stored.video_url, None);
    }

    #[tokio::test]
    async fn test_unknown_video_is_not_found() {
        let fx = fixture(Arc::new(InMemoryVideoRepository::new()), Ok((1, 1))).await;
        let principal = Principal {
            user_id: Uuid::new_v4(),
        };
        let result = fx.pipeline.authorize(&principal, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
