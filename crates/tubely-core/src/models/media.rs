use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Kind of asset being attached to a video record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Thumbnail,
    Video,
}

impl AssetClass {
    /// Media types accepted for this class, in canonical (lowercase, parameter-free) form.
    pub fn allowed_media_types(&self) -> &'static [&'static str] {
        match self {
            AssetClass::Thumbnail => &["image/jpeg", "image/png"],
            AssetClass::Video => &["video/mp4"],
        }
    }

    /// Multipart form field carrying the file.
    pub fn form_field(&self) -> &'static str {
        match self {
            AssetClass::Thumbnail => "thumbnail",
            AssetClass::Video => "video",
        }
    }
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.form_field())
    }
}

/// Aspect-ratio bucket of a video stream, used as the storage key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AspectClass {
    Landscape,
    Portrait,
    Other,
}

impl AspectClass {
    /// Classify stream geometry.
    ///
    /// The test is exact integer equality after truncating division:
    /// `w == 16*h/9` is landscape, otherwise `h == 16*w/9` is portrait.
    /// Near-16:9 sizes such as 1366x768 therefore fall into `Other`.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        let (w, h) = (u64::from(width), u64::from(height));
        if w == 16 * h / 9 {
            AspectClass::Landscape
        } else if h == 16 * w / 9 {
            AspectClass::Portrait
        } else {
            AspectClass::Other
        }
    }

    /// Human-readable ratio label.
    pub fn ratio(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "16:9",
            AspectClass::Portrait => "9:16",
            AspectClass::Other => "other",
        }
    }

    /// Storage key prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl Display for AspectClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.prefix())
    }
}
