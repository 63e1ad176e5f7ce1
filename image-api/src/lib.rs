//! HTTP Lambdas of the image labelling pipeline
//!
//! `generate-upload-url` hands out presigned S3 upload URLs and `get-image-labels`
//! returns the labels the `image-labeler` Lambda stored for an uploaded image.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

/// S3 operations for image uploads
pub mod media_storage;

/// Route handlers
pub mod routes;

/// Logging setup
pub mod telemetry;

/// Environment and error types
pub mod types;
