// src/lambda/mod.rs

//! AWS Lambda handler for the watcher.
//!
//! Every invocation returns an API-Gateway style 200 response whose body is
//! the snapshot payload. Failures inside the run surface as an empty entries
//! list, never as an invocation error.

use std::collections::BTreeMap;
use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::error::Result;
use crate::models::{Config, SnapshotPayload};
use crate::notify::sns::SnsNotifier;
use crate::pipeline::Runner;
use crate::storage::dynamo::DynamoStateStore;
use crate::storage::s3::S3Publisher;
use crate::utils::HttpFetcher;

/// Lambda invocation payload.
#[derive(Debug, Default, Deserialize)]
pub struct WatchRequest {
    /// Send a synthetic alert instead of running
    #[serde(default, rename = "forceTest")]
    pub force_test: bool,
}

impl WatchRequest {
    /// Read the request from an arbitrary event. Scheduler events and
    /// anything that is not a matching object read as a normal run.
    pub fn from_event(event: &Value) -> Self {
        serde_json::from_value(event.clone()).unwrap_or_default()
    }
}

/// Lambda response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: BTreeMap<&'static str, &'static str>,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(payload: &SnapshotPayload) -> Self {
        let body = serde_json::to_string(payload).unwrap_or_else(|e| {
            error!("Failed to serialize payload: {}", e);
            r#"{"lastUpdated":"","entries":[]}"#.to_string()
        });

        Self {
            status_code: 200,
            headers: BTreeMap::from([
                ("Content-Type", "application/json"),
                ("Access-Control-Allow-Origin", "*"),
                ("Access-Control-Allow-Headers", "Content-Type,Accept"),
                ("Access-Control-Allow-Methods", "GET,OPTIONS"),
                ("Cache-Control", "no-store, must-revalidate"),
                ("Pragma", "no-cache"),
                ("Expires", "0"),
            ]),
            body,
        }
    }
}

/// Build the runner with AWS-backed capabilities.
pub fn build_runner(config: Arc<Config>, sdk_config: &aws_config::SdkConfig) -> Result<Runner> {
    let fetcher = HttpFetcher::from_config(&config.fetch)?;
    let publisher = S3Publisher::from_config(sdk_config, &config.publish);
    let notifier = SnsNotifier::from_config(sdk_config, &config.alert);
    let state_store = DynamoStateStore::from_config(sdk_config, &config.state);

    Ok(Runner::new(
        config,
        Arc::new(fetcher),
        Arc::new(publisher),
        Arc::new(notifier),
        Arc::new(state_store),
    ))
}

/// Main Lambda handler function.
#[instrument(skip(runner, event))]
pub async fn handler(
    runner: &Runner,
    event: LambdaEvent<Value>,
) -> std::result::Result<HttpResponse, LambdaError> {
    let (payload, _context) = event.into_parts();
    let request = WatchRequest::from_event(&payload);

    if request.force_test {
        info!("Test trigger: sending synthetic alert");
        let body = runner.send_test_alert().await;
        return Ok(HttpResponse::ok(&body));
    }

    let outcome = runner.run().await;
    info!(
        "Run finished: {} entries, action {:?}, alert delivered: {}",
        outcome.payload.entries.len(),
        outcome.action,
        outcome.alert_delivered
    );
    Ok(HttpResponse::ok(&outcome.payload))
}
