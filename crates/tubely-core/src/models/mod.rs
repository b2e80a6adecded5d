//! Data models for the application

mod media;
mod video;

pub use media::*;
pub use video::*;
