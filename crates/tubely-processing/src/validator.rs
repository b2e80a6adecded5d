use tubely_core::{AppError, AssetClass};

/// Media type validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing content type")]
    MissingContentType,

    #[error("Malformed content type: {0}")]
    Malformed(String),

    #[error("Invalid content type for {class}: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        class: AssetClass,
        content_type: String,
        allowed: &'static [&'static str],
    },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidMediaType(err.to_string())
    }
}

/// Parse a declared content type and check it against the allow-list for `class`.
///
/// Parameters (`; charset=...`, `; codecs=...`) are stripped and the canonical
/// lowercase `type/subtype` is returned. Runs before anything is staged.
pub fn validate_media_type(
    declared: Option<&str>,
    class: AssetClass,
) -> Result<String, ValidationError> {
    let declared = declared
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingContentType)?;

    let parsed = declared
        .parse::<mime::Mime>()
        .map_err(|_| ValidationError::Malformed(declared.to_string()))?;

    let essence = parsed.essence_str().to_ascii_lowercase();
    let allowed = class.allowed_media_types();

    if !allowed.contains(&essence.as_str()) {
        return Err(ValidationError::InvalidContentType {
            class,
            content_type: essence,
            allowed,
        });
    }

    Ok(essence)
}
