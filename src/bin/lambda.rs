//! AWS Lambda entry point for the closings watcher.
//!
//! Deploy with `cargo lambda build --release --features lambda`.
//!
//! ## Environment Variables
//!
//! - `BUCKET_NAME` / `JSON_FILE_KEY`: where the snapshot is published
//! - `STATE_TABLE` / `STATE_KEY`: DynamoDB table and item id for storm state
//! - `SNS_TOPIC_ARN`: alert topic (blank disables alerts)
//! - `SITE_URL`: status page linked from alerts
//! - `FETCH_TIMEOUT_SECS`, `RESET_HOURS`: timing overrides
//! - `CONFIG_S3_KEY` / `CONFIG_S3_BUCKET`: optional TOML config object
//! - `RUST_LOG`: Log level (e.g., `info`, `debug`)

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, service_fn};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use closings::config::LambdaConfigLoader;
use closings::lambda::{build_runner, handler};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Closings watcher starting...");

    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let config = Arc::new(LambdaConfigLoader::new(&sdk_config).load().await);
    let runner = Arc::new(build_runner(config, &sdk_config)?);

    lambda_runtime::run(service_fn(move |event| {
        let runner = Arc::clone(&runner);
        async move { handler(&runner, event).await }
    }))
    .await
}
