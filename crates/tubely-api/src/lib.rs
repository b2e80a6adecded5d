//! Tubely API Library
//!
//! HTTP surface of the media ingestion service: bearer-token auth, video
//! record endpoints, and the thumbnail/video upload pipeline.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
mod utils;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::{UploadLimits, UploadPipeline};
pub use state::AppState;
