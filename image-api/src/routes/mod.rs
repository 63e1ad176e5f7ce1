pub mod image_labels;
pub mod upload_url;

use axum::{routing::get, Router};
use http::{
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    },
    HeaderValue,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

/// Methods advertised by the upload URL endpoint; the URL itself is used with PUT
const UPLOAD_URL_METHODS: &str = "GET, PUT";
/// Methods advertised by the image labels endpoint
const IMAGE_LABELS_METHODS: &str = "GET";

/// Adds the permissive CORS headers to every response of `router`, errors included
fn with_cors(router: Router, allowed_methods: &'static str) -> Router {
    router
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(allowed_methods),
        ))
}

/// Router served by the `generate-upload-url` Lambda
///
/// API Gateway owns the path, so the handler answers on any path.
pub fn upload_url_lambda() -> Router {
    with_cors(
        Router::new().fallback(upload_url::create_upload_url),
        UPLOAD_URL_METHODS,
    )
    .layer(TraceLayer::new_for_http())
}

/// Router served by the `get-image-labels` Lambda
///
/// API Gateway owns the path, so the handler answers on any path.
pub fn image_labels_lambda() -> Router {
    with_cors(
        Router::new().fallback(image_labels::get_image_labels),
        IMAGE_LABELS_METHODS,
    )
    .layer(TraceLayer::new_for_http())
}

/// Creates the router with both endpoints mounted under `/v1`
pub fn handler() -> Router {
    let upload_url = with_cors(
        Router::new().route("/v1/GenerateUploadUrl", get(upload_url::create_upload_url)),
        UPLOAD_URL_METHODS,
    );

    let image_labels = with_cors(
        Router::new().route("/v1/GetImageLabels", get(image_labels::get_image_labels)),
        IMAGE_LABELS_METHODS,
    );

    upload_url
        .merge(image_labels)
        .layer(TraceLayer::new_for_http())
}
