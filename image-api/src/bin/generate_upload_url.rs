use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use axum::Extension;
use image_api::{
    media_storage::{MediaStorage, ObjectStore},
    routes, telemetry,
    types::Environment,
};
use lambda_http::{run, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let environment = Environment::from_env();
    telemetry::init(&environment);

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let media_storage: Arc<dyn ObjectStore> =
        Arc::new(MediaStorage::new(s3_client, environment.s3_bucket()));

    tracing::info!("Starting generate-upload-url in {:?} environment", environment);

    run(routes::upload_url_lambda().layer(Extension(media_storage))).await
}
