use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tubely_core::{AppError, Video};
use uuid::Uuid;

use crate::store_traits::VideoStore;

/// Process-local video store.
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<Uuid, Video>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `change` to the stored record while holding the write lock.
    async fn modify<F>(&self, id: Uuid, change: F) -> Result<Video, AppError>
    where
        F: FnOnce(&mut Video),
    {
        let mut videos = self.videos.write().await;
        let stored = videos
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;

        change(stored);
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoRepository {
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(AppError::InvalidInput(format!(
                "Video {} already exists",
                video.id
            )));
        }
        videos.insert(video.id, video.clone());
        Ok(video.clone())
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    async fn set_thumbnail_url(&self, id: Uuid, url: &str) -> Result<Video, AppError> {
        self.modify(id, |video| video.thumbnail_url = Some(url.to_string()))
            .await
    }

    async fn set_video_url(&self, id: Uuid, url: &str) -> Result<Video, AppError> {
        self.modify(id, |video| video.video_url = Some(url.to_string()))
            .await
    }
}
