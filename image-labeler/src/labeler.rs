//! Annotation of newly uploaded images

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use label_storage::image_labels::{AnnotationRecord, AnnotationStore, StoredLabel};
use rust_decimal::Decimal;
use tracing::{error, info, instrument};

use crate::{
    types::LabelerResult,
    vision::{DetectedFace, DetectedLabel, FaceFlag, ImageRef, VisionAnalyzer},
};

/// Label stored when no label was found but a face was
pub const INJECTED_PERSON_LABEL: &str = "Person (injected)";

/// Confidence of the injected person label, 99.0
#[must_use]
pub fn injected_person_confidence() -> Decimal {
    Decimal::new(990, 1)
}

/// Runs the vision analyses for an image and stores the combined result
pub struct ImageLabeler {
    vision: Arc<dyn VisionAnalyzer>,
    label_storage: Arc<dyn AnnotationStore>,
    consistency_delay: Duration,
}

impl ImageLabeler {
    /// Creates a new labeler
    ///
    /// # Arguments
    ///
    /// * `vision` - Vision service used for every analysis
    /// * `label_storage` - Store receiving the annotation records
    /// * `consistency_delay` - Wait before the first analysis of an image
    #[must_use]
    pub fn new(
        vision: Arc<dyn VisionAnalyzer>,
        label_storage: Arc<dyn AnnotationStore>,
        consistency_delay: Duration,
    ) -> Self {
        Self {
            vision,
            label_storage,
            consistency_delay,
        }
    }

    /// Analyzes one image and overwrites its annotation record
    ///
    /// Label detection, celebrity recognition and face detection run independently; a
    /// failing one is logged and contributes an empty list.
    ///
    /// # Errors
    ///
    /// Returns `LabelerError::Storage` if the record cannot be written
    #[instrument(skip(self), fields(bucket = %image.bucket, key = %image.key))]
    pub async fn label_image(&self, image: &ImageRef) -> LabelerResult<AnnotationRecord> {
        if !self.consistency_delay.is_zero() {
            info!("Waiting {:?} for S3 consistency", self.consistency_delay);
            tokio::time::sleep(self.consistency_delay).await;
        }

        let (labels, celebrities, faces) = tokio::join!(
            self.detect_labels(image),
            self.recognize_celebrities(image),
            self.detect_faces(image),
        );

        let record = build_record(image.key.clone(), labels, celebrities, &faces);

        info!(
            labels = record.labels.len(),
            celebrities = record.celebrities.len(),
            faces = record.faces.len(),
            "Saving image labels"
        );
        self.label_storage.put(&record).await?;

        Ok(record)
    }

    async fn detect_labels(&self, image: &ImageRef) -> Vec<StoredLabel> {
        match self.vision.detect_labels(image).await {
            Ok(labels) => labels.iter().map(stored_label).collect(),
            Err(e) => {
                error!("{e}");
                Vec::new()
            }
        }
    }

    async fn recognize_celebrities(&self, image: &ImageRef) -> Vec<String> {
        self.vision
            .recognize_celebrities(image)
            .await
            .unwrap_or_else(|e| {
                error!("{e}");
                Vec::new()
            })
    }

    async fn detect_faces(&self, image: &ImageRef) -> Vec<DetectedFace> {
        self.vision.detect_faces(image).await.unwrap_or_else(|e| {
            error!("{e}");
            Vec::new()
        })
    }
}

/// Combines the analysis results into the record stored for `image_key`
///
/// When no label was found but at least one face was, a single
/// `Person (injected)` label is added so the record does not look empty.
#[must_use]
pub fn build_record(
    image_key: String,
    mut labels: Vec<StoredLabel>,
    celebrities: Vec<String>,
    faces: &[DetectedFace],
) -> AnnotationRecord {
    if labels.is_empty() && !faces.is_empty() {
        info!("Injecting '{INJECTED_PERSON_LABEL}' label due to face presence");
        labels.push(StoredLabel::new(
            INJECTED_PERSON_LABEL,
            injected_person_confidence(),
        ));
    }

    AnnotationRecord {
        image_key,
        labels,
        celebrities,
        faces: describe_faces(faces),
    }
}

/// Describes the present attributes of every face, in face order
#[must_use]
pub fn describe_faces(faces: &[DetectedFace]) -> Vec<String> {
    faces
        .iter()
        .flat_map(|face| {
            [
                ("Has beard", face.beard),
                ("Has mustache", face.mustache),
                ("Wearing glasses", face.eyeglasses),
                ("Smiling", face.smile),
            ]
            .into_iter()
            .filter_map(|(description, flag)| match flag {
                Some(FaceFlag {
                    present: true,
                    confidence,
                }) => Some(format!(
                    "{description} ({}%)",
                    format_percentage(round_confidence(confidence))
                )),
                _ => None,
            })
        })
        .collect()
}

fn stored_label(label: &DetectedLabel) -> StoredLabel {
    StoredLabel::new(label.name.clone(), round_confidence(label.confidence))
}

/// Rounds a reported confidence to two decimal places
///
/// The value is taken from its shortest decimal text, which is what the service sent
/// on the wire, so no binary noise ends up in the stored number.
#[must_use]
pub fn round_confidence(confidence: f32) -> Decimal {
    Decimal::from_str(&confidence.to_string())
        .unwrap_or_default()
        .round_dp(2)
}

// Always shows at least one fractional digit: 99 -> "99.0", 97.50 -> "97.5"
fn format_percentage(value: Decimal) -> String {
    let value = value.normalize();
    if value.scale() == 0 {
        format!("{value}.0")
    } else {
        value.to_string()
    }
}
