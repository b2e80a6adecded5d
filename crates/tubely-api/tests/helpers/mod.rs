//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in-process: records live in an [`InMemoryVideoRepository`],
//! objects in a [`LocalStorage`] rooted in a temp dir, and the media tools are
//! replaced by the fakes in [`fakes`] unless a test supplies its own.

#![allow(dead_code)]

pub mod fakes;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtService;
use tubely_api::constants;
use tubely_api::setup::routes::{build_router, RouterSettings};
use tubely_api::{AppState, UploadLimits, UploadPipeline};
use tubely_core::Video;
use tubely_db::{InMemoryVideoRepository, VideoStore};
use tubely_processing::{Remuxer, StagingArea};
use tubely_storage::LocalStorage;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";
pub const ASSETS_BASE_URL: &str = "http://localhost:8091/assets";

/// API path prefix for tests (e.g. `/api/videos`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub struct TestOptions {
    pub remuxer: Arc<dyn Remuxer>,
    /// Dimensions reported by the inspector; `None` means no video stream.
    pub dimensions: Option<(u32, u32)>,
    pub limits: UploadLimits,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            remuxer: Arc::new(fakes::CopyRemuxer),
            dimensions: Some((1920, 1080)),
            limits: UploadLimits {
                thumbnail_bytes: 1024 * 1024,
                video_bytes: 8 * 1024 * 1024,
            },
        }
    }
}

/// Test application: server plus handles on everything it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub videos: InMemoryVideoRepository,
    pub inspector: Arc<fakes::FixedInspector>,
    pub jwt: JwtService,
    pub storage_dir: TempDir,
    pub staging_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.jwt.issue(user_id).expect("Failed to issue token")
    }

    /// Insert a record owned by `owner` straight into the store.
    pub async fn seed_video(&self, owner: Uuid) -> Video {
        let video = Video::new(owner, "Boots of Escaping".to_string(), None);
        self.videos
            .create_video(&video)
            .await
            .expect("Failed to seed video")
    }

    pub async fn stored_video(&self, id: Uuid) -> Video {
        self.videos
            .get_video(id)
            .await
            .expect("Failed to load video")
            .expect("Video missing from store")
    }

    /// Files left behind in the staging directory.
    pub fn staged_files(&self) -> usize {
        count_files(self.staging_dir.path())
    }

    /// Keys of every object in local storage.
    pub fn stored_objects(&self) -> Vec<String> {
        let mut keys = Vec::new();
        collect_keys(self.storage_dir.path(), self.storage_dir.path(), &mut keys);
        keys.sort();
        keys
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|entry| {
            let path = entry.expect("Failed to read entry").path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

fn collect_keys(root: &Path, dir: &Path, keys: &mut Vec<String>) {
    for entry in std::fs::read_dir(dir).expect("Failed to read dir") {
        let path = entry.expect("Failed to read entry").path();
        if path.is_dir() {
            collect_keys(root, &path, keys);
        } else {
            let key = path
                .strip_prefix(root)
                .expect("Object outside storage root")
                .to_string_lossy()
                .replace('\\', "/");
            keys.push(key);
        }
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let storage_dir = TempDir::new().expect("Failed to create storage dir");
    let staging_dir = TempDir::new().expect("Failed to create staging dir");

    let videos = InMemoryVideoRepository::new();
    let storage = Arc::new(
        LocalStorage::new(storage_dir.path(), ASSETS_BASE_URL.to_string())
            .await
            .expect("Failed to create local storage"),
    );

    let inspector = Arc::new(fakes::FixedInspector::new(options.dimensions));
    let uploads = UploadPipeline::new(
        Arc::new(videos.clone()),
        storage,
        options.remuxer,
        inspector.clone(),
        Arc::new(fakes::SequentialIds::default()),
        StagingArea::new(staging_dir.path()),
        options.limits,
    );

    let jwt = JwtService::new(JWT_SECRET, 1);
    let state = Arc::new(AppState::new(Arc::new(videos.clone()), uploads, jwt.clone()));

    let settings = RouterSettings {
        cors_origins: vec!["*".to_string()],
        assets_dir: Some(storage_dir.path().to_path_buf()),
    };
    let app = build_router(state, &settings).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        videos,
        inspector,
        jwt,
        storage_dir,
        staging_dir,
    }
}

/// Single-file multipart form.
pub fn file_form(field: &str, file_name: &str, mime: &str, data: Vec<u8>) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name(file_name)
        .mime_type(mime);
    MultipartForm::new().add_part(field, part)
}

/// Bytes that stand in for an MP4 upload; the fakes never parse them.
pub fn fake_mp4(len: usize) -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.resize(len.max(data.len()), 0xAB);
    data
}
