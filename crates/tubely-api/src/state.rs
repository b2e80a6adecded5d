use std::sync::Arc;

use tubely_db::VideoStore;

use crate::auth::JwtService;
use crate::services::upload::UploadPipeline;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoStore>,
    pub uploads: UploadPipeline,
    pub jwt: JwtService,
}

impl AppState {
    pub fn new(videos: Arc<dyn VideoStore>, uploads: UploadPipeline, jwt: JwtService) -> Self {
        Self {
            videos,
            uploads,
            jwt,
        }
    }
}
