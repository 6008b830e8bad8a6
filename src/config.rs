// src/config.rs

//! Configuration loading for the Lambda environment.
//!
//! The allow-list and sources can be updated without a redeploy by pointing
//! `CONFIG_S3_KEY` at a TOML object. Environment variables are applied on top.

use aws_sdk_s3::Client;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::storage::s3::read_object_optional;

/// Config loader for Lambda environment.
pub struct LambdaConfigLoader {
    client: Client,
}

impl LambdaConfigLoader {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Load the effective configuration. Falls back to defaults when the S3
    /// object is missing or invalid.
    pub async fn load(&self) -> Config {
        let mut config = match self.load_from_s3().await {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                warn!("Failed to load config from S3: {}. Using defaults.", e);
                Config::default()
            }
        };

        config.apply_overrides(|name| std::env::var(name).ok());

        if let Err(e) = config.validate() {
            warn!("Configuration is not valid, continuing anyway: {}", e);
        }
        config
    }

    async fn load_from_s3(&self) -> Result<Option<Config>> {
        let Ok(key) = std::env::var("CONFIG_S3_KEY") else {
            return Ok(None);
        };
        let bucket = std::env::var("CONFIG_S3_BUCKET")
            .or_else(|_| std::env::var("BUCKET_NAME"))
            .unwrap_or_else(|_| Config::default().publish.bucket);

        info!("Loading config file from S3: {}/{}", bucket, key);
        let bytes = read_object_optional(&self.client, &bucket, &key)
            .await?
            .ok_or_else(|| AppError::config(format!("Config file not found in S3: {key}")))?;

        let text = String::from_utf8(bytes).map_err(|e| {
            AppError::config(format!("Config file {} is not valid UTF-8: {}", key, e))
        })?;
        Ok(Some(Config::from_toml(&text)?))
    }
}
