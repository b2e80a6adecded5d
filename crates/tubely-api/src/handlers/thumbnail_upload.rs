use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::AssetClass;

use super::videos::parse_video_id;
use crate::auth::Principal;
use crate::error::{multipart_error, ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::{declared_content_type, field_reader, missing_field};

#[utoipa::path(
    post,
    path = "/api/thumbnail_upload/{video_id}",
    tag = "uploads",
    params(
        ("video_id" = uuid::Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Image in the `thumbnail` field (image/jpeg or image/png)"),
    responses(
        (status = 200, description = "Thumbnail stored and recorded", body = tubely_core::Video),
        (status = 400, description = "Missing field or unsupported media type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "Image exceeds the size limit", body = ErrorResponse),
        (status = 502, description = "Object storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let class = AssetClass::Thumbnail;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(class.form_field()) {
            continue;
        }

        let content_type = declared_content_type(&field);
        let video = state
            .uploads
            .upload_thumbnail(
                &principal,
                video_id,
                content_type.as_deref(),
                field_reader(field),
            )
            .await?;
        return Ok(Json(video));
    }

    Err(missing_field(class).into())
}
