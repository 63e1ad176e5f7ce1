use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::QueryRejection, Query},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    media_storage::{count_images, ObjectStore},
    types::AppError,
};

/// Content type assumed when the client does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Number of images the bucket may hold before uploads are refused
pub const MAX_BUCKET_IMAGES: usize = 100;

/// Validity window of every issued upload URL
pub const PRESIGNED_URL_EXPIRY: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlQuery {
    /// MIME type of the image that will be uploaded, e.g. `image/jpeg`
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    /// Presigned URL to PUT the image to
    pub upload_url: String,
    /// S3 key the image will be stored under, used later to fetch its labels
    pub key: String,
    /// RFC 3339 UTC timestamp when the presigned URL expires
    pub expires_at: String,
}

/// Returns the file extension for a content type: everything after the last `/`
#[must_use]
pub fn extension_for(content_type: &str) -> &str {
    content_type
        .rsplit_once('/')
        .map_or(content_type, |(_, subtype)| subtype)
}

/// Issues a presigned URL for uploading one image to S3
///
/// 1. Counts the images already in the bucket and refuses once it is full
/// 2. Derives the extension from the declared content type
/// 3. Generates a fresh `{uuid}.{extension}` key and presigns a PUT for it
///
/// # Errors
///
/// - `403` when the bucket already holds `MAX_BUCKET_IMAGES` images
/// - `500` when the query string cannot be parsed, or listing the bucket or presigning fails
#[instrument(skip(media_storage))]
pub async fn create_upload_url(
    Extension(media_storage): Extension<Arc<dyn ObjectStore>>,
    query: Result<Query<UploadUrlQuery>, QueryRejection>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let Query(query) = query?;
    let objects = media_storage.list_objects().await?;
    let image_count = count_images(&objects);

    if image_count >= MAX_BUCKET_IMAGES {
        tracing::warn!("Bucket holds {image_count} images, refusing upload");
        return Err(AppError::capacity_exceeded());
    }

    let content_type = query
        .content_type
        .filter(|content_type| !content_type.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    tracing::info!("Requested Content-Type: {content_type}");

    let s3_key = format!("{}.{}", Uuid::new_v4(), extension_for(&content_type));

    let presigned_url = media_storage
        .generate_presigned_put_url(&s3_key, &content_type, PRESIGNED_URL_EXPIRY)
        .await?;

    tracing::info!("Issued upload URL for {s3_key}");

    Ok(Json(UploadUrlResponse {
        upload_url: presigned_url.url,
        key: s3_key,
        expires_at: presigned_url.expires_at.to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_the_subtype() {
        assert_eq!(extension_for("image/jpeg"), "jpeg");
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/svg+xml"), "svg+xml");
    }

    #[test]
    fn test_extension_without_slash_is_whole_value() {
        assert_eq!(extension_for("jpeg"), "jpeg");
    }
}
