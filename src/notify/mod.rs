//! Alert delivery.

#[cfg(feature = "aws")]
pub mod sns;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::AlertConfig;

/// Subject and plain-text body of one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    /// The storm alert: entry count, snapshot time and a link to the site.
    pub fn storm(config: &AlertConfig, entry_count: usize, last_updated: &str) -> Self {
        Self {
            subject: config.subject.clone(),
            body: format!(
                "School closings found: {entry_count}\n\
                 Last updated: {last_updated}\n\
                 View the site: {}\n",
                config.site_url
            ),
        }
    }
}

/// Send-and-forget delivery channel.
///
/// `Ok` means delivery was confirmed by the channel; only then may the storm
/// be marked as notified.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &AlertMessage) -> Result<()>;
}

/// Writes alerts to the log instead of delivering them. Used for local runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, message: &AlertMessage) -> Result<()> {
        log::info!("ALERT: {}", message.subject);
        for line in message.body.lines() {
            log::info!("    {line}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storm_message() {
        let config = AlertConfig {
            site_url: "https://example.com/closings/".to_string(),
            ..AlertConfig::default()
        };
        let message = AlertMessage::storm(&config, 3, "01/06/2025 07:00:00 AM EST");

        assert_eq!(message.subject, "School Closings Alert");
        assert_eq!(
            message.body,
            "School closings found: 3\n\
             Last updated: 01/06/2025 07:00:00 AM EST\n\
             View the site: https://example.com/closings/\n"
        );
    }

    #[tokio::test]
    async fn test_console_notifier_confirms() {
        let message = AlertMessage::storm(&AlertConfig::default(), 1, "now");
        assert!(ConsoleNotifier.notify(&message).await.is_ok());
    }
}
