mod service;
mod types;

pub use service::UploadPipeline;
pub use types::UploadLimits;
