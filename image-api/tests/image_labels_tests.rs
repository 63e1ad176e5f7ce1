mod common;

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use common::*;
use http::StatusCode;
use image_api::media_storage::mock::MockMediaStorage;
use label_storage::image_labels::{
    mock::InMemoryLabelStorage, AnnotationRecord, AnnotationStore, StoredLabel,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde_json::json;

fn stored_record() -> AnnotationRecord {
    AnnotationRecord {
        image_key: "abc-123.jpeg".to_string(),
        labels: vec![
            StoredLabel::new("Dog", Decimal::new(9_876, 2)),
            StoredLabel::new("Grass", Decimal::new(4_210, 2)),
        ],
        celebrities: vec!["Jane Doe".to_string()],
        faces: vec![
            "Has beard (88.4%)".to_string(),
            "Smiling (97.12%)".to_string(),
        ],
    }
}

#[tokio::test]
async fn test_get_labels_happy_path() {
    let setup = TestContext::empty();
    setup.label_storage.put(&stored_record()).await.unwrap();

    let response = setup
        .send_get_request("/v1/GetImageLabels?key=abc-123.jpeg")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors_headers(&response, "GET");

    let body = parse_response_body(response).await;
    assert_eq!(
        body,
        json!({
            "ImageKey": "abc-123.jpeg",
            "Labels": [
                { "Name": "Dog", "Confidence": 98.76 },
                { "Name": "Grass", "Confidence": 42.1 },
            ],
            "Celebrities": ["Jane Doe"],
            "Faces": ["Has beard (88.4%)", "Smiling (97.12%)"],
        })
    );
}

#[tokio::test]
async fn test_confidence_is_a_json_float() {
    let setup = TestContext::empty();
    let record = AnnotationRecord {
        labels: vec![StoredLabel::new("Person (injected)", Decimal::new(990, 1))],
        ..AnnotationRecord::empty("face.png")
    };
    setup.label_storage.put(&record).await.unwrap();

    let response = setup.send_get_request("/v1/GetImageLabels?key=face.png").await;
    let body = parse_response_body(response).await;

    let confidence = &body["Labels"][0]["Confidence"];
    assert!(confidence.is_f64());
    assert_eq!(confidence.as_f64(), Some(99.0));
}

#[tokio::test]
async fn test_empty_record_keeps_empty_lists() {
    let setup = TestContext::empty();
    setup
        .label_storage
        .put(&AnnotationRecord::empty("blank.png"))
        .await
        .unwrap();

    let response = setup.send_get_request("/v1/GetImageLabels?key=blank.png").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_response_body(response).await,
        json!({ "ImageKey": "blank.png", "Labels": [], "Celebrities": [], "Faces": [] })
    );
}

#[tokio::test]
async fn test_url_encoded_key_is_decoded() {
    let setup = TestContext::empty();
    setup
        .label_storage
        .put(&AnnotationRecord::empty("my photo.png"))
        .await
        .unwrap();

    let response = setup
        .send_get_request("/v1/GetImageLabels?key=my%20photo.png")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

// Not found

#[tokio::test]
async fn test_unknown_key_is_not_found() {
    let setup = TestContext::empty();
    setup.label_storage.put(&stored_record()).await.unwrap();

    let response = setup
        .send_get_request("/v1/GetImageLabels?key=missing.png")
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors_headers(&response, "GET");
    assert_eq!(
        parse_response_body(response).await,
        json!({ "message": "Image not found" })
    );
}

// Failure tests

#[tokio::test]
async fn test_missing_key_parameter_is_internal_error() {
    let setup = TestContext::empty();

    let response = setup.send_get_request("/v1/GetImageLabels").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors_headers(&response, "GET");
    assert_eq!(
        parse_response_body(response).await,
        json!({ "error": "Missing required query parameter: key" })
    );
}

#[tokio::test]
async fn test_repeated_key_parameter_is_internal_error() {
    let setup = TestContext::empty();

    let response = setup
        .send_get_request("/v1/GetImageLabels?key=a.png&key=b.png")
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors_headers(&response, "GET");
    assert_eq!(response.headers()["content-type"], "application/json");
    let body = parse_response_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("duplicate field"));
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let setup = TestContext::new(
        MockMediaStorage::new(Vec::new()),
        InMemoryLabelStorage::unavailable(),
    );

    let response = setup
        .send_get_request("/v1/GetImageLabels?key=abc-123.jpeg")
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Label storage unavailable"));
}

#[tokio::test]
async fn test_malformed_item_is_internal_error() {
    let setup = TestContext::empty();
    setup
        .label_storage
        .insert_raw(
            "broken.png",
            HashMap::from([(
                "Labels".to_string(),
                AttributeValue::S("not a list".to_string()),
            )]),
        )
        .await;

    let response = setup
        .send_get_request("/v1/GetImageLabels?key=broken.png")
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("Malformed"));
}
