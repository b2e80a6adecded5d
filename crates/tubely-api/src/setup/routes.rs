//! Route configuration and setup.

use crate::auth::auth_middleware;
use crate::constants::{API_PREFIX, ASSETS_ROUTE, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::services::upload::UploadLimits;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::{Config, StorageBackend};

/// Router options that come from configuration rather than state.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub cors_origins: Vec<String>,
    /// Directory served under `/assets` (local storage backend only).
    pub assets_dir: Option<PathBuf>,
}

impl RouterSettings {
    pub fn from_config(config: &Config) -> Self {
        let assets_dir = match config.storage_backend() {
            StorageBackend::Local => Some(config.assets_root().clone()),
            StorageBackend::S3 => None,
        };
        Self {
            cors_origins: config.cors_origins().to_vec(),
            assets_dir,
        }
    }
}

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    build_router(state, &RouterSettings::from_config(config))
}

pub fn build_router(state: Arc<AppState>, settings: &RouterSettings) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(&settings.cors_origins)?;

    let limits = state.uploads.limits();
    let body_limit = multipart_limit(limits.video_bytes.max(limits.thumbnail_bytes));

    let protected = protected_routes(limits).layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let mut app = public_routes().merge(protected);

    if let Some(dir) = &settings.assets_dir {
        tracing::info!(path = %dir.display(), route = ASSETS_ROUTE, "Serving local assets");
        app = app.nest_service(ASSETS_ROUTE, ServeDir::new(dir));
    }

    let app = app
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Request body cap for a form carrying a file of at most `file_bytes`.
fn multipart_limit(file_bytes: u64) -> usize {
    usize::try_from(file_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)).unwrap_or(usize::MAX)
}

fn setup_cors(cors_origins: &[String]) -> Result<CorsLayer, anyhow::Error> {
    let cors = if cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            &format!("{}/openapi.json", API_PREFIX),
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

fn protected_routes(limits: UploadLimits) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            post(handlers::videos::create_video),
        )
        .route(
            &format!("{}/videos/{{video_id}}", API_PREFIX),
            get(handlers::videos::get_video),
        )
        .route(
            &format!("{}/thumbnail_upload/{{video_id}}", API_PREFIX),
            post(handlers::thumbnail_upload::upload_thumbnail)
                .layer(DefaultBodyLimit::max(multipart_limit(limits.thumbnail_bytes))),
        )
        .route(
            &format!("{}/video_upload/{{video_id}}", API_PREFIX),
            post(handlers::video_upload::upload_video)
                .layer(DefaultBodyLimit::max(multipart_limit(limits.video_bytes))),
        )
}
