mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use http::StatusCode;
use image_labeler::{
    labeler::ImageLabeler,
    vision::{mock::MockVisionAnalyzer, DetectedFace, DetectedLabel, FaceFlag, ImageRef},
};
use label_storage::image_labels::AnnotationStore;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_uploaded_image_labels_are_served() {
    let setup = TestContext::empty();

    let response = setup
        .send_get_request("/v1/GenerateUploadUrl?contentType=image/jpeg")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let key = parse_response_body(response).await["key"]
        .as_str()
        .expect("key in response")
        .to_string();

    // Labeler writes to the same table the reader serves from
    let vision = MockVisionAnalyzer::new()
        .with_labels(Some(vec![DetectedLabel {
            name: "Mountain".to_string(),
            confidence: 96.328,
        }]))
        .with_faces(Some(vec![DetectedFace {
            eyeglasses: Some(FaceFlag::present(91.5)),
            ..DetectedFace::default()
        }]));
    let labeler = ImageLabeler::new(
        Arc::new(vision),
        setup.label_storage.clone() as Arc<dyn AnnotationStore>,
        Duration::ZERO,
    );
    labeler
        .label_image(&ImageRef::new("rekognition-image-input", key.clone()))
        .await
        .expect("labelling succeeds");

    let response = setup
        .send_get_request(&format!("/v1/GetImageLabels?key={key}"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_response_body(response).await,
        json!({
            "ImageKey": key,
            "Labels": [{ "Name": "Mountain", "Confidence": 96.33 }],
            "Celebrities": [],
            "Faces": ["Wearing glasses (91.5%)"]
        })
    );
}

#[tokio::test]
async fn test_labels_unavailable_before_labelling() {
    let setup = TestContext::empty();

    let response = setup
        .send_get_request("/v1/GenerateUploadUrl?contentType=image/png")
        .await;
    let key = parse_response_body(response).await["key"]
        .as_str()
        .expect("key in response")
        .to_string();

    let response = setup
        .send_get_request(&format!("/v1/GetImageLabels?key={key}"))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        parse_response_body(response).await,
        json!({ "message": "Image not found" })
    );
}
