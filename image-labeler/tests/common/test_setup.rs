use std::sync::Arc;
use std::time::Duration;

use aws_lambda_events::event::s3::S3Event;
use image_labeler::{labeler::ImageLabeler, vision::mock::MockVisionAnalyzer};
use label_storage::image_labels::{mock::InMemoryLabelStorage, AnnotationStore};
use serde_json::json;

pub const TEST_BUCKET: &str = "rekognition-image-input";

/// Setup test logging
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Labeler wired to a scripted vision service and an in-memory label table
pub struct TestContext {
    pub labeler: ImageLabeler,
    pub vision: Arc<MockVisionAnalyzer>,
    pub label_storage: Arc<InMemoryLabelStorage>,
}

impl TestContext {
    pub fn new(vision: MockVisionAnalyzer, label_storage: InMemoryLabelStorage) -> Self {
        setup_test_env();

        let vision = Arc::new(vision);
        let label_storage = Arc::new(label_storage);
        let labeler = ImageLabeler::new(
            vision.clone(),
            label_storage.clone() as Arc<dyn AnnotationStore>,
            Duration::ZERO,
        );

        Self {
            labeler,
            vision,
            label_storage,
        }
    }

    pub fn with_vision(vision: MockVisionAnalyzer) -> Self {
        Self::new(vision, InMemoryLabelStorage::new())
    }
}

/// S3 `ObjectCreated:Put` notification as delivered to the Lambda
pub fn object_created_event(keys: &[&str]) -> S3Event {
    let records: Vec<_> = keys
        .iter()
        .map(|key| {
            json!({
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "awsRegion": "us-east-1",
                "eventTime": "2024-05-01T12:00:00.000Z",
                "eventName": "ObjectCreated:Put",
                "userIdentity": { "principalId": "AWS:AIDAEXAMPLE" },
                "requestParameters": { "sourceIPAddress": "127.0.0.1" },
                "responseElements": {
                    "x-amz-request-id": "C3D13FE58DE4C810",
                    "x-amz-id-2": "FMyUVURIY8/IgAtTv8xRjskZQpcIZ9KG4V5Wp6S7S/JRWeUWerMUE5JgHvANOjpD"
                },
                "s3": {
                    "s3SchemaVersion": "1.0",
                    "configurationId": "image-uploaded",
                    "bucket": {
                        "name": TEST_BUCKET,
                        "ownerIdentity": { "principalId": "A3NL1KOZZKExample" },
                        "arn": format!("arn:aws:s3:::{TEST_BUCKET}")
                    },
                    "object": {
                        "key": key,
                        "size": 1024,
                        "eTag": "d41d8cd98f00b204e9800998ecf8427e",
                        "sequencer": "0055AED6DCD90281E5"
                    }
                }
            })
        })
        .collect();

    serde_json::from_value(json!({ "Records": records })).expect("Valid S3 event")
}

/// Body of a labeler response, parsed as JSON
pub fn response_body(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("Body is not JSON")
}
