use std::sync::Arc;

use aws_lambda_events::event::s3::S3Event;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_rekognition::Client as RekognitionClient;
use image_labeler::{
    event::LabelerResponse,
    labeler::ImageLabeler,
    telemetry,
    types::Environment,
    vision::RekognitionAnalyzer,
};
use label_storage::image_labels::LabelStorage;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::info;

async fn function_handler(
    event: LambdaEvent<S3Event>,
    labeler: &ImageLabeler,
) -> Result<LabelerResponse, Error> {
    info!(
        request_id = %event.context.request_id,
        records = event.payload.records.len(),
        "Received S3 event"
    );

    Ok(labeler.handle_event(event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let environment = Environment::from_env();
    telemetry::init(&environment);

    let aws_config = environment.aws_config().await;

    let vision = Arc::new(RekognitionAnalyzer::new(RekognitionClient::new(&aws_config)));
    let label_storage = Arc::new(LabelStorage::new(
        Arc::new(DynamoDbClient::new(&aws_config)),
        environment.labels_table(),
    ));

    let labeler = ImageLabeler::new(vision, label_storage, environment.consistency_delay());

    info!("Starting image labeler in {environment:?} environment");
    run(service_fn(|event| function_handler(event, &labeler))).await
}
