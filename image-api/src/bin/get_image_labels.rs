use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use axum::Extension;
use image_api::{routes, telemetry, types::Environment};
use label_storage::image_labels::{AnnotationStore, LabelStorage};
use lambda_http::{run, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let environment = Environment::from_env();
    telemetry::init(&environment);

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
    let label_storage: Arc<dyn AnnotationStore> = Arc::new(LabelStorage::new(
        dynamodb_client,
        environment.labels_table(),
    ));

    tracing::info!("Starting get-image-labels in {:?} environment", environment);

    run(routes::image_labels_lambda().layer(Extension(label_storage))).await
}
