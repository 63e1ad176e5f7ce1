//! S3 notification handling

use aws_lambda_events::event::s3::{S3Event, S3EventRecord};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use crate::{
    labeler::ImageLabeler,
    types::{LabelerError, LabelerResult},
    vision::ImageRef,
};

/// Status reported back to the invoker; nothing consumes it beyond the logs
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LabelerResponse {
    /// HTTP-style status code
    pub status_code: u16,
    /// JSON encoded `message` or `error` object
    pub body: String,
}

impl LabelerResponse {
    fn processed() -> Self {
        Self {
            status_code: 200,
            body: json!({ "message": "Image processed and saved." }).to_string(),
        }
    }

    fn failed(error: &LabelerError) -> Self {
        Self {
            status_code: 500,
            body: json!({ "error": error.to_string() }).to_string(),
        }
    }
}

/// Decodes an object key as it appears in S3 notifications, where spaces are `+`
///
/// # Errors
///
/// Returns `LabelerError::InvalidKey` if the decoded bytes are not UTF-8
pub fn decode_object_key(raw: &str) -> LabelerResult<String> {
    percent_decode_str(&raw.replace('+', " "))
        .decode_utf8()
        .map(|key| key.into_owned())
        .map_err(|_| LabelerError::InvalidKey(raw.to_string()))
}

fn image_ref(record: &S3EventRecord) -> LabelerResult<ImageRef> {
    let bucket = record
        .s3
        .bucket
        .name
        .as_deref()
        .ok_or(LabelerError::MissingBucket)?;
    let key = record
        .s3
        .object
        .key
        .as_deref()
        .ok_or(LabelerError::MissingKey)?;

    Ok(ImageRef::new(bucket, decode_object_key(key)?))
}

/// Extracts the images referenced by an S3 notification
///
/// # Errors
///
/// Returns an error if the event has no records or a record lacks its bucket or key
pub fn image_refs(event: &S3Event) -> LabelerResult<Vec<ImageRef>> {
    if event.records.is_empty() {
        return Err(LabelerError::NoRecords);
    }

    event.records.iter().map(image_ref).collect()
}

impl ImageLabeler {
    /// Labels every image referenced by the event
    ///
    /// Stops at the first image whose record cannot be written.
    pub async fn handle_event(&self, event: S3Event) -> LabelerResponse {
        match self.label_event(&event).await {
            Ok(count) => {
                info!("Labelled {count} image(s)");
                LabelerResponse::processed()
            }
            Err(e) => {
                error!("Labelling failed: {e}");
                LabelerResponse::failed(&e)
            }
        }
    }

    async fn label_event(&self, event: &S3Event) -> LabelerResult<usize> {
        let images = image_refs(event)?;

        for image in &images {
            info!("Processing file: s3://{}/{}", image.bucket, image.key);
            self.label_image(image).await?;
        }

        Ok(images.len())
    }
}
