use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Extension, Router};
use http_body_util::BodyExt;
use image_api::{
    media_storage::{mock::MockMediaStorage, ObjectStore},
    routes,
};
use label_storage::image_labels::{mock::InMemoryLabelStorage, AnnotationStore};
use tower::ServiceExt;

/// Setup test logging
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Router wired to in-memory S3 and Dynamo DB stand-ins
pub struct TestContext {
    pub router: Router,
    pub media_storage: Arc<MockMediaStorage>,
    pub label_storage: Arc<InMemoryLabelStorage>,
}

impl TestContext {
    pub fn new(media_storage: MockMediaStorage, label_storage: InMemoryLabelStorage) -> Self {
        setup_test_env();

        let media_storage = Arc::new(media_storage);
        let label_storage = Arc::new(label_storage);

        let router = routes::handler()
            .layer(Extension(media_storage.clone() as Arc<dyn ObjectStore>))
            .layer(Extension(label_storage.clone() as Arc<dyn AnnotationStore>));

        Self {
            router,
            media_storage,
            label_storage,
        }
    }

    /// Empty bucket and empty label table
    pub fn empty() -> Self {
        Self::new(MockMediaStorage::new(Vec::new()), InMemoryLabelStorage::new())
    }

    pub async fn send_get_request(&self, route: &str) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())
            .expect("Failed to build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }
}

pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&body).expect("Body is not JSON")
}

/// Asserts the permissive CORS headers every response carries
pub fn assert_cors_headers(response: &Response, allowed_methods: &str) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-headers"], "*");
    assert_eq!(headers["access-control-allow-methods"], allowed_methods);
}
