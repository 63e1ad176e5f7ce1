//! Vision analysis of uploaded images
//!
//! The labeler only sees the types in this module. `RekognitionAnalyzer` maps the
//! Rekognition responses onto them.

mod error;
mod rekognition;

pub use error::{VisionError, VisionResult};
pub use rekognition::RekognitionAnalyzer;

/// Location of an image in S3, analyzed in place by the vision service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Bucket name
    pub bucket: String,
    /// Object key
    pub key: String,
}

impl ImageRef {
    /// Creates a reference to `s3://{bucket}/{key}`
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// A generic label found in the image
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLabel {
    /// Label name, e.g. `Dog`
    pub name: String,
    /// Confidence percentage reported by the service
    pub confidence: f32,
}

/// A boolean face attribute with the service's confidence in it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceFlag {
    /// Whether the attribute is present
    pub present: bool,
    /// Confidence percentage of the verdict
    pub confidence: f32,
}

impl FaceFlag {
    /// An attribute detected as present
    #[must_use]
    pub const fn present(confidence: f32) -> Self {
        Self {
            present: true,
            confidence,
        }
    }

    /// An attribute detected as absent
    #[must_use]
    pub const fn absent(confidence: f32) -> Self {
        Self {
            present: false,
            confidence,
        }
    }
}

/// Attributes of one detected face; `None` when the service did not report one
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DetectedFace {
    /// Beard
    pub beard: Option<FaceFlag>,
    /// Mustache
    pub mustache: Option<FaceFlag>,
    /// Eyeglasses
    pub eyeglasses: Option<FaceFlag>,
    /// Smile
    pub smile: Option<FaceFlag>,
}

/// Image analysis capabilities used by the labeler
#[async_trait::async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Detects generic labels in the image
    async fn detect_labels(&self, image: &ImageRef) -> VisionResult<Vec<DetectedLabel>>;

    /// Returns the names of recognized celebrities
    async fn recognize_celebrities(&self, image: &ImageRef) -> VisionResult<Vec<String>>;

    /// Detects faces along with their attributes
    async fn detect_faces(&self, image: &ImageRef) -> VisionResult<Vec<DetectedFace>>;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{DetectedFace, DetectedLabel, ImageRef, VisionAnalyzer, VisionError, VisionResult};

    /// Vision analyzer returning scripted results
    ///
    /// A facet set to `None` fails with a service error.
    pub struct MockVisionAnalyzer {
        labels: Option<Vec<DetectedLabel>>,
        celebrities: Option<Vec<String>>,
        faces: Option<Vec<DetectedFace>>,
        calls: AtomicUsize,
    }

    impl Default for MockVisionAnalyzer {
        fn default() -> Self {
            Self {
                labels: Some(Vec::new()),
                celebrities: Some(Vec::new()),
                faces: Some(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl MockVisionAnalyzer {
        /// Analyzer that finds nothing
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Analyzer whose every call fails
        #[must_use]
        pub fn failing() -> Self {
            Self {
                labels: None,
                celebrities: None,
                faces: None,
                ..Self::default()
            }
        }

        /// Scripts the label detection result
        #[must_use]
        pub fn with_labels(mut self, labels: Option<Vec<DetectedLabel>>) -> Self {
            self.labels = labels;
            self
        }

        /// Scripts the celebrity recognition result
        #[must_use]
        pub fn with_celebrities(mut self, celebrities: Option<Vec<String>>) -> Self {
            self.celebrities = celebrities;
            self
        }

        /// Scripts the face detection result
        #[must_use]
        pub fn with_faces(mut self, faces: Option<Vec<DetectedFace>>) -> Self {
            self.faces = faces;
            self
        }

        /// Total number of analysis calls received
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn record_call(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait::async_trait]
    impl VisionAnalyzer for MockVisionAnalyzer {
        async fn detect_labels(&self, image: &ImageRef) -> VisionResult<Vec<DetectedLabel>> {
            self.record_call();
            self.labels
                .clone()
                .ok_or_else(|| VisionError::DetectLabels(format!("throttled: {}", image.key)))
        }

        async fn recognize_celebrities(&self, image: &ImageRef) -> VisionResult<Vec<String>> {
            self.record_call();
            self.celebrities.clone().ok_or_else(|| {
                VisionError::RecognizeCelebrities(format!("throttled: {}", image.key))
            })
        }

        async fn detect_faces(&self, image: &ImageRef) -> VisionResult<Vec<DetectedFace>> {
            self.record_call();
            self.faces
                .clone()
                .ok_or_else(|| VisionError::DetectFaces(format!("throttled: {}", image.key)))
        }
    }
}
