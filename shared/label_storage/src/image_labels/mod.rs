//! Image label storage integration using Dynamo DB
//!
//! Each uploaded image gets exactly one annotation record, keyed by its S3 object key.
//! Records are written as a whole, so re-labelling an image replaces the previous record.

mod error;
mod item;

use std::sync::Arc;

use aws_sdk_dynamodb::{types::AttributeValue, Client as DynamoDbClient};
use rust_decimal::Decimal;
use strum::Display;
use tracing::{debug, instrument};

pub use error::{LabelStorageError, LabelStorageResult};

/// Attribute names for the image labels table
#[derive(Debug, Clone, Copy, Display)]
#[strum(serialize_all = "PascalCase")]
pub enum ImageLabelsAttribute {
    /// S3 object key (Primary Key)
    ImageKey,
    /// Detected labels, a list of `Name`/`Confidence` maps
    Labels,
    /// Recognized celebrity names
    Celebrities,
    /// Human readable face attribute descriptions
    Faces,
    /// Label name, nested inside `Labels`
    Name,
    /// Label confidence, nested inside `Labels`
    Confidence,
}

/// A single detected label with its confidence score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLabel {
    /// Label name as reported by the vision service
    pub name: String,
    /// Confidence percentage, kept as an exact decimal
    pub confidence: Decimal,
}

impl StoredLabel {
    /// Creates a label from a name and an exact confidence value
    #[must_use]
    pub fn new(name: impl Into<String>, confidence: Decimal) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// Persisted outcome of analyzing one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// S3 object key of the analyzed image (Primary Key)
    pub image_key: String,
    /// Detected labels, in the order the vision service returned them
    pub labels: Vec<StoredLabel>,
    /// Recognized celebrity names
    pub celebrities: Vec<String>,
    /// Face attribute descriptions, each embedding its confidence
    pub faces: Vec<String>,
}

impl AnnotationRecord {
    /// Creates an empty record for the given image key
    #[must_use]
    pub fn empty(image_key: impl Into<String>) -> Self {
        Self {
            image_key: image_key.into(),
            labels: Vec::new(),
            celebrities: Vec::new(),
            faces: Vec::new(),
        }
    }
}

/// Read and write access to annotation records
#[async_trait::async_trait]
pub trait AnnotationStore: Send + Sync {
    /// Writes the record, replacing any record stored under the same key
    async fn put(&self, record: &AnnotationRecord) -> LabelStorageResult<()>;

    /// Fetches the record stored under `image_key`, if any
    async fn get(&self, image_key: &str) -> LabelStorageResult<Option<AnnotationRecord>>;
}

/// Image label storage client for Dynamo DB operations
pub struct LabelStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl LabelStorage {
    /// Creates a new image label storage client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for image labels
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }
}

#[async_trait::async_trait]
impl AnnotationStore for LabelStorage {
    /// Puts an annotation record, overwriting any existing one
    ///
    /// # Errors
    ///
    /// Returns `LabelStorageError::DynamoDbPutError` if the Dynamo DB operation fails
    #[instrument(skip(self, record), fields(image_key = %record.image_key))]
    async fn put(&self, record: &AnnotationRecord) -> LabelStorageResult<()> {
        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item::to_item(record)))
            .send()
            .await?;

        debug!(
            labels = record.labels.len(),
            table = %self.table_name,
            "Stored image labels"
        );
        Ok(())
    }

    /// Gets an annotation record by image key
    ///
    /// # Errors
    ///
    /// Returns `LabelStorageError::DynamoDbGetError` if the Dynamo DB operation fails
    /// Returns `LabelStorageError::MalformedItem` if the stored item cannot be decoded
    #[instrument(skip(self))]
    async fn get(&self, image_key: &str) -> LabelStorageResult<Option<AnnotationRecord>> {
        let response = self
            .dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(
                ImageLabelsAttribute::ImageKey.to_string(),
                AttributeValue::S(image_key.to_string()),
            )
            .send()
            .await?;

        if response.item().is_none() {
            debug!(table = %self.table_name, "No image labels stored");
        }
        response.item().map(item::from_item).transpose()
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::collections::HashMap;

    use aws_sdk_dynamodb::types::AttributeValue;
    use tokio::sync::RwLock;

    use super::{item, AnnotationRecord, AnnotationStore, LabelStorageError, LabelStorageResult};

    type Item = HashMap<String, AttributeValue>;

    /// In-memory annotation store
    ///
    /// Records go through the same item encoding as the Dynamo DB client, so decimal
    /// precision behaves the same way it does against a real table.
    #[derive(Default)]
    pub struct InMemoryLabelStorage {
        items: RwLock<HashMap<String, Item>>,
        unavailable: bool,
    }

    impl InMemoryLabelStorage {
        /// Creates an empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a store whose every operation fails
        #[must_use]
        pub fn unavailable() -> Self {
            Self {
                items: RwLock::default(),
                unavailable: true,
            }
        }

        /// Stores a raw item, bypassing encoding
        pub async fn insert_raw(&self, image_key: &str, raw: Item) {
            self.items.write().await.insert(image_key.to_string(), raw);
        }

        /// Number of stored records
        pub async fn len(&self) -> usize {
            self.items.read().await.len()
        }

        /// Whether no record has been stored
        pub async fn is_empty(&self) -> bool {
            self.items.read().await.is_empty()
        }

        fn check_available(&self) -> LabelStorageResult<()> {
            if self.unavailable {
                return Err(LabelStorageError::Unavailable(
                    "in-memory store configured to fail".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl AnnotationStore for InMemoryLabelStorage {
        async fn put(&self, record: &AnnotationRecord) -> LabelStorageResult<()> {
            self.check_available()?;
            self.items
                .write()
                .await
                .insert(record.image_key.clone(), item::to_item(record));
            Ok(())
        }

        async fn get(&self, image_key: &str) -> LabelStorageResult<Option<AnnotationRecord>> {
            self.check_available()?;
            self.items
                .read()
                .await
                .get(image_key)
                .map(item::from_item)
                .transpose()
        }
    }
}
