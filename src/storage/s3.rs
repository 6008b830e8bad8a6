//! AWS S3 snapshot publisher.
//!
//! The snapshot is a single object overwritten on every run and read directly
//! by the public status page.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{PublishConfig, SnapshotPayload};
use crate::storage::SnapshotPublisher;

/// Publishes the snapshot to `s3://{bucket}/{key}`.
#[derive(Clone)]
pub struct S3Publisher {
    client: Client,
    bucket: String,
    key: String,
}

impl S3Publisher {
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn from_config(sdk_config: &aws_config::SdkConfig, config: &PublishConfig) -> Self {
        Self::new(Client::new(sdk_config), &config.bucket, &config.key)
    }
}

#[async_trait]
impl SnapshotPublisher for S3Publisher {
    async fn publish(&self, payload: &SnapshotPayload) -> Result<()> {
        let json = serde_json::to_string_pretty(payload)?;
        let bytes = ByteStream::from(json.into_bytes());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(bytes)
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::publish(e.into_service_error()))?;

        info!(
            "Wrote {} entries to s3://{}/{}",
            payload.entries.len(),
            self.bucket,
            self.key
        );
        Ok(())
    }
}

/// Read an object, returning None when the key does not exist.
pub async fn read_object_optional(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<Option<Vec<u8>>> {
    let result = client.get_object().bucket(bucket).key(key).send().await;

    match result {
        Ok(output) => {
            let bytes = output
                .body
                .collect()
                .await
                .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))?;
            Ok(Some(bytes.into_bytes().to_vec()))
        }
        Err(err) => {
            let service_err = err.into_service_error();
            if service_err.is_no_such_key() {
                info!("No object at s3://{}/{}", bucket, key);
                Ok(None)
            } else {
                Err(AppError::Io(std::io::Error::other(service_err.to_string())))
            }
        }
    }
}
