//! Multipart helpers shared by the upload handlers

use axum::extract::multipart::Field;
use futures::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use tubely_core::{AppError, AssetClass};

/// Error for a form that ended without the field `class` is uploaded under.
pub fn missing_field(class: AssetClass) -> AppError {
    AppError::InvalidInput(format!(
        "Missing '{}' field in multipart form",
        class.form_field()
    ))
}

/// Declared content type of a field, if any.
pub fn declared_content_type(field: &Field<'_>) -> Option<String> {
    field.content_type().map(str::to_string)
}

/// Stream a field's body as an [`AsyncRead`] without buffering it.
pub fn field_reader<'a>(field: Field<'a>) -> impl AsyncRead + Unpin + Send + 'a {
    StreamReader::new(Box::pin(field.map_err(std::io::Error::other)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_form_field() {
        let err = missing_field(AssetClass::Video);
        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg.contains("'video'")));
    }
}
