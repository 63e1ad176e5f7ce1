//! Rekognition-backed vision analysis

use aws_sdk_rekognition::{
    types::{Attribute, FaceDetail, Image, S3Object},
    Client as RekognitionClient,
};
use tracing::debug;

use super::{DetectedFace, DetectedLabel, FaceFlag, ImageRef, VisionAnalyzer, VisionResult};

/// Upper bound on labels returned per image
const MAX_LABELS: i32 = 15;
/// Labels below this confidence percentage are dropped by the service
const MIN_LABEL_CONFIDENCE: f32 = 10.0;

/// Vision analyzer calling Amazon Rekognition on objects stored in S3
pub struct RekognitionAnalyzer {
    client: RekognitionClient,
}

impl RekognitionAnalyzer {
    /// Creates a new analyzer from a pre-configured Rekognition client
    #[must_use]
    pub const fn new(client: RekognitionClient) -> Self {
        Self { client }
    }

    fn image(image: &ImageRef) -> Image {
        Image::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&image.bucket)
                    .name(&image.key)
                    .build(),
            )
            .build()
    }
}

fn face_flag(present: impl Into<Option<bool>>, confidence: Option<f32>) -> FaceFlag {
    FaceFlag {
        present: present.into().unwrap_or(false),
        confidence: confidence.unwrap_or_default(),
    }
}

impl From<&FaceDetail> for DetectedFace {
    fn from(detail: &FaceDetail) -> Self {
        Self {
            beard: detail
                .beard()
                .map(|beard| face_flag(beard.value(), beard.confidence())),
            mustache: detail
                .mustache()
                .map(|mustache| face_flag(mustache.value(), mustache.confidence())),
            eyeglasses: detail
                .eyeglasses()
                .map(|eyeglasses| face_flag(eyeglasses.value(), eyeglasses.confidence())),
            smile: detail
                .smile()
                .map(|smile| face_flag(smile.value(), smile.confidence())),
        }
    }
}

#[async_trait::async_trait]
impl VisionAnalyzer for RekognitionAnalyzer {
    async fn detect_labels(&self, image: &ImageRef) -> VisionResult<Vec<DetectedLabel>> {
        let response = self
            .client
            .detect_labels()
            .image(Self::image(image))
            .max_labels(MAX_LABELS)
            .min_confidence(MIN_LABEL_CONFIDENCE)
            .send()
            .await?;

        let labels: Vec<DetectedLabel> = response
            .labels()
            .iter()
            .filter_map(|label| {
                label.name().map(|name| DetectedLabel {
                    name: name.to_string(),
                    confidence: label.confidence().unwrap_or_default(),
                })
            })
            .collect();

        debug!("Rekognition returned {} labels for {}", labels.len(), image.key);
        Ok(labels)
    }

    async fn recognize_celebrities(&self, image: &ImageRef) -> VisionResult<Vec<String>> {
        let response = self
            .client
            .recognize_celebrities()
            .image(Self::image(image))
            .send()
            .await?;

        Ok(response
            .celebrity_faces()
            .iter()
            .filter_map(|celebrity| celebrity.name().map(ToString::to_string))
            .collect())
    }

    async fn detect_faces(&self, image: &ImageRef) -> VisionResult<Vec<DetectedFace>> {
        let response = self
            .client
            .detect_faces()
            .image(Self::image(image))
            .attributes(Attribute::All)
            .send()
            .await?;

        Ok(response
            .face_details()
            .iter()
            .map(DetectedFace::from)
            .collect())
    }
}
