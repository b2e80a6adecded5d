use tubely_core::{AssetClass, Config};

/// Per-class upload size limits in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub thumbnail_bytes: u64,
    pub video_bytes: u64,
}

impl UploadLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            thumbnail_bytes: config.max_thumbnail_size_bytes(),
            video_bytes: config.max_video_size_bytes(),
        }
    }

    pub fn for_class(&self, class: AssetClass) -> u64 {
        match class {
            AssetClass::Thumbnail => self.thumbnail_bytes,
            AssetClass::Video => self.video_bytes,
        }
    }
}
