//! S3-triggered Lambda labelling uploaded images
//!
//! Every object created in the upload bucket is run through label detection, celebrity
//! recognition and face detection, and the combined result is written to the labels
//! table read by `get-image-labels`.

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

/// S3 notification parsing and the Lambda response
pub mod event;

/// Annotation pipeline
pub mod labeler;

/// Logging setup
pub mod telemetry;

/// Environment and error types
pub mod types;

/// Vision service abstraction
pub mod vision;
