//! Label storage for the image labelling pipeline
//!
//! This crate owns the annotation records written by the `image-labeler` Lambda and read
//! back by the `image-api` Lambdas, including the DynamoDB item layout shared by both.

pub mod image_labels;
