//! AWS SNS alert delivery.

use async_trait::async_trait;
use aws_sdk_sns::Client;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::AlertConfig;
use crate::notify::{AlertMessage, Notifier};

/// Publishes alerts to an SNS topic (typically with e-mail subscribers).
#[derive(Clone)]
pub struct SnsNotifier {
    client: Client,
    topic_arn: Option<String>,
}

impl SnsNotifier {
    pub fn new(client: Client, topic_arn: Option<String>) -> Self {
        Self { client, topic_arn }
    }

    pub fn from_config(sdk_config: &aws_config::SdkConfig, config: &AlertConfig) -> Self {
        Self::new(Client::new(sdk_config), config.topic_arn.clone())
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn notify(&self, message: &AlertMessage) -> Result<()> {
        let Some(topic_arn) = self.topic_arn.as_deref() else {
            warn!("SNS topic not configured; skipping notification");
            return Err(AppError::notify("no SNS topic configured"));
        };

        let output = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .subject(&message.subject)
            .message(&message.body)
            .send()
            .await
            .map_err(|e| AppError::notify(e.into_service_error()))?;

        info!(
            "Published alert to {} (message id {:?})",
            topic_arn,
            output.message_id()
        );
        Ok(())
    }
}
