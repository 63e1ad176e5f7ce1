use std::num::ParseFloatError;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query},
    Extension, Json,
};
use label_storage::image_labels::{AnnotationRecord, AnnotationStore, StoredLabel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::types::AppError;

#[derive(Debug, Deserialize)]
pub struct ImageLabelsQuery {
    /// S3 key returned by the upload URL endpoint
    pub key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct LabelResponse {
    /// Label name
    pub name: String,
    /// Confidence percentage
    pub confidence: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ImageLabelsResponse {
    /// S3 key of the analyzed image
    pub image_key: String,
    /// Detected labels
    pub labels: Vec<LabelResponse>,
    /// Recognized celebrity names
    pub celebrities: Vec<String>,
    /// Face attribute descriptions
    pub faces: Vec<String>,
}

impl TryFrom<StoredLabel> for LabelResponse {
    type Error = ParseFloatError;

    fn try_from(label: StoredLabel) -> Result<Self, Self::Error> {
        Ok(Self {
            name: label.name,
            confidence: decimal_to_f64(label.confidence)?,
        })
    }
}

// Goes through the decimal text so the result is the f64 nearest to the stored value
fn decimal_to_f64(value: Decimal) -> Result<f64, ParseFloatError> {
    value.to_string().parse()
}

impl TryFrom<AnnotationRecord> for ImageLabelsResponse {
    type Error = ParseFloatError;

    fn try_from(record: AnnotationRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            image_key: record.image_key,
            labels: record
                .labels
                .into_iter()
                .map(LabelResponse::try_from)
                .collect::<Result<_, _>>()?,
            celebrities: record.celebrities,
            faces: record.faces,
        })
    }
}

/// Returns the labels stored for an uploaded image
///
/// # Errors
///
/// - `404` when no labels have been stored for the key
/// - `500` when the key parameter is missing or repeated, or label storage fails
#[instrument(skip(label_storage))]
pub async fn get_image_labels(
    Extension(label_storage): Extension<Arc<dyn AnnotationStore>>,
    query: Result<Query<ImageLabelsQuery>, QueryRejection>,
) -> Result<Json<ImageLabelsResponse>, AppError> {
    let Query(query) = query?;
    let image_key = query
        .key
        .ok_or_else(|| AppError::internal("Missing required query parameter: key"))?;

    tracing::info!("Looking up key: {image_key}");

    let record = label_storage
        .get(&image_key)
        .await?
        .ok_or_else(|| AppError::not_found("Image not found"))?;

    let response = ImageLabelsResponse::try_from(record)
        .map_err(|e| AppError::internal(format!("Invalid stored confidence: {e}")))?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_record_converts_decimals_to_floats() {
        let record = AnnotationRecord {
            image_key: "abc-123.jpeg".to_string(),
            labels: vec![
                StoredLabel::new("Dog", Decimal::new(9_876, 2)),
                StoredLabel::new("Person (injected)", Decimal::new(990, 1)),
            ],
            celebrities: vec!["Jane Doe".to_string()],
            faces: vec!["Smiling (97.5%)".to_string()],
        };

        let response = ImageLabelsResponse::try_from(record).unwrap();

        assert_eq!(
            response,
            ImageLabelsResponse {
                image_key: "abc-123.jpeg".to_string(),
                labels: vec![
                    LabelResponse {
                        name: "Dog".to_string(),
                        confidence: 98.76,
                    },
                    LabelResponse {
                        name: "Person (injected)".to_string(),
                        confidence: 99.0,
                    },
                ],
                celebrities: vec!["Jane Doe".to_string()],
                faces: vec!["Smiling (97.5%)".to_string()],
            }
        );
    }

    #[test]
    fn test_decimal_text_converts_exactly() {
        assert_eq!(decimal_to_f64(Decimal::new(9_876, 2)), Ok(98.76));
        assert_eq!(decimal_to_f64(Decimal::new(-5, 1)), Ok(-0.5));
        assert_eq!(decimal_to_f64(Decimal::MAX), Ok(7.922_816_251_426_434e28));
    }

    #[test]
    fn test_response_uses_stored_field_names() {
        let response = ImageLabelsResponse::try_from(AnnotationRecord {
            labels: vec![StoredLabel::new("Cat", Decimal::new(5_025, 2))],
            ..AnnotationRecord::empty("cat.png")
        })
        .unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "ImageKey": "cat.png",
                "Labels": [{ "Name": "Cat", "Confidence": 50.25 }],
                "Celebrities": [],
                "Faces": [],
            })
        );
    }
}
