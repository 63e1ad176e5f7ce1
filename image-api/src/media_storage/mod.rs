//! S3-based image storage operations
mod error;

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::{error::DisplayErrorContext, presigning::PresigningConfig, Client as S3Client};
use chrono::{DateTime, Utc};

pub use error::{BucketError, BucketResult};

/// File extensions counted towards the bucket capacity
const IMAGE_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Presigned URL with expiration information
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL for PUT operations
    pub url: String,
    /// UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
}

/// An object listed from the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key
    pub key: String,
    /// Object size in bytes, when reported
    pub size: Option<i64>,
}

impl ObjectSummary {
    /// Whether the key ends in a recognized image extension, ignoring case
    #[must_use]
    pub fn is_image(&self) -> bool {
        let key = self.key.to_lowercase();
        IMAGE_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
    }
}

/// Counts the objects whose key looks like an image
#[must_use]
pub fn count_images(objects: &[ObjectSummary]) -> usize {
    objects.iter().filter(|object| object.is_image()).count()
}

/// Object store operations needed to hand out upload URLs
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists every object in the bucket
    async fn list_objects(&self) -> BucketResult<Vec<ObjectSummary>>;

    /// Generates a presigned PUT URL scoped to one key and content type
    async fn generate_presigned_put_url(
        &self,
        s3_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> BucketResult<PresignedUrl>;
}

/// Image storage client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for image uploads
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String) -> Self {
        Self {
            s3_client,
            bucket_name,
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for MediaStorage {
    /// Lists every object in the bucket, following continuation tokens
    ///
    /// # Errors
    ///
    /// Returns `BucketError::S3Error` if any listing page fails
    async fn list_objects(&self) -> BucketResult<Vec<ObjectSummary>> {
        let mut pages = self
            .s3_client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page?;
            objects.extend(page.contents().iter().filter_map(|object| {
                object.key().map(|key| ObjectSummary {
                    key: key.to_string(),
                    size: object.size(),
                })
            }));
        }

        tracing::debug!(
            "Listed {} objects in bucket {}",
            objects.len(),
            self.bucket_name
        );

        Ok(objects)
    }

    /// Generates a presigned URL for PUT operations
    ///
    /// # Arguments
    ///
    /// * `s3_key` - Key the upload will be written to
    /// * `content_type` - Content type the uploader must send
    /// * `expires_in` - How long the URL stays valid
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ConfigError` if presigning config creation fails
    /// Returns `BucketError::S3Error` if presigned URL generation fails
    async fn generate_presigned_put_url(
        &self,
        s3_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> BucketResult<PresignedUrl> {
        let presigned_config = PresigningConfig::expires_in(expires_in).map_err(|e| {
            BucketError::ConfigError(format!("Failed to create presigning config: {e}"))
        })?;

        let presigned_url = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(s3_key)
            .content_type(content_type)
            .presigned(presigned_config)
            .await
            .map_err(|e| {
                BucketError::S3Error(format!(
                    "Failed to generate presigned URL: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let expires_at: DateTime<Utc> = Utc::now() + expires_in;

        Ok(PresignedUrl {
            url: presigned_url.uri().to_string(),
            expires_at,
        })
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::time::Duration;

    use chrono::Utc;
    use tokio::sync::Mutex;

    use super::{BucketError, BucketResult, ObjectStore, ObjectSummary, PresignedUrl};

    /// A presign request captured by the mock
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PresignRequest {
        /// Requested key
        pub s3_key: String,
        /// Requested content type
        pub content_type: String,
        /// Requested validity window
        pub expires_in: Duration,
    }

    /// In-memory object store with a fixed listing
    pub struct MockMediaStorage {
        objects: Vec<ObjectSummary>,
        fail_listing: bool,
        presign_requests: Mutex<Vec<PresignRequest>>,
    }

    impl MockMediaStorage {
        /// Creates a store whose listing returns `objects`
        #[must_use]
        pub fn new(objects: Vec<ObjectSummary>) -> Self {
            Self {
                objects,
                fail_listing: false,
                presign_requests: Mutex::default(),
            }
        }

        /// Creates a store with `count` objects named `{i}.{extension}`
        #[must_use]
        pub fn with_objects(count: usize, extension: &str) -> Self {
            Self::new(
                (0..count)
                    .map(|i| ObjectSummary {
                        key: format!("{i}.{extension}"),
                        size: Some(1024),
                    })
                    .collect(),
            )
        }

        /// Creates a store whose listing fails
        #[must_use]
        pub fn failing() -> Self {
            Self {
                fail_listing: true,
                ..Self::new(Vec::new())
            }
        }

        /// Presign requests received so far
        pub async fn presign_requests(&self) -> Vec<PresignRequest> {
            self.presign_requests.lock().await.clone()
        }
    }

    #[async_trait::async_trait]
    impl ObjectStore for MockMediaStorage {
        async fn list_objects(&self) -> BucketResult<Vec<ObjectSummary>> {
            if self.fail_listing {
                return Err(BucketError::S3Error("Access Denied".to_string()));
            }
            Ok(self.objects.clone())
        }

        async fn generate_presigned_put_url(
            &self,
            s3_key: &str,
            content_type: &str,
            expires_in: Duration,
        ) -> BucketResult<PresignedUrl> {
            self.presign_requests.lock().await.push(PresignRequest {
                s3_key: s3_key.to_string(),
                content_type: content_type.to_string(),
                expires_in,
            });

            Ok(PresignedUrl {
                url: format!(
                    "https://mock-bucket.s3.amazonaws.com/{s3_key}?X-Amz-Expires={}",
                    expires_in.as_secs()
                ),
                expires_at: Utc::now() + expires_in,
            })
        }
    }
}
