//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{SourceConfig, SourceLayout};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Upstream pages, in snapshot order
    #[serde(default = "defaults::sources")]
    pub sources: Vec<SourceConfig>,

    /// Institution-name fragments that put an entry in scope
    #[serde(default)]
    pub allow_list: AllowListConfig,

    /// Alert deduplication settings
    #[serde(default)]
    pub storm: StormConfig,

    /// Zone used when rendering report timestamps
    #[serde(default)]
    pub report: ReportConfig,

    /// Alert message and delivery target
    #[serde(default)]
    pub alert: AlertConfig,

    /// Snapshot publishing target
    #[serde(default)]
    pub publish: PublishConfig,

    /// Storm state persistence target
    #[serde(default)]
    pub state: StateConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply overrides from a variable lookup (the process environment in Lambda).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bucket) = lookup("BUCKET_NAME") {
            self.publish.bucket = bucket;
        }
        if let Some(key) = lookup("JSON_FILE_KEY") {
            self.publish.key = key;
        }
        if let Some(table) = lookup("STATE_TABLE") {
            self.state.table = table;
        }
        if let Some(key) = lookup("STATE_KEY") {
            self.state.key = key;
        }
        if let Some(arn) = lookup("SNS_TOPIC_ARN") {
            let arn = arn.trim().to_string();
            self.alert.topic_arn = (!arn.is_empty()).then_some(arn);
        }
        if let Some(site) = lookup("SITE_URL") {
            self.alert.site_url = site;
        }
        if let Some(secs) = lookup("FETCH_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.fetch.timeout_secs = secs;
        }
        if let Some(hours) = lookup("RESET_HOURS").and_then(|v| v.parse().ok()) {
            self.storm.reset_hours = hours;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.storm.reset_hours == 0 {
            return Err(AppError::validation("storm.reset_hours must be > 0"));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(AppError::validation("Source with empty name"));
            }
            url::Url::parse(&source.url)?;
        }
        if self
            .allow_list
            .fragments
            .iter()
            .all(|f| f.trim().is_empty())
        {
            return Err(AppError::validation("allow_list.fragments is empty"));
        }
        if self.report.time_zone.parse::<Tz>().is_err() {
            return Err(AppError::validation(format!(
                "report.time_zone is not a known zone: {}",
                self.report.time_zone
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            sources: defaults::sources(),
            allow_list: AllowListConfig::default(),
            storm: StormConfig::default(),
            report: ReportConfig::default(),
            alert: AlertConfig::default(),
            publish: PublishConfig::default(),
            state: StateConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-source request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowListConfig {
    /// Case-insensitive substrings matched against entry names
    #[serde(default = "defaults::fragments")]
    pub fragments: Vec<String>,
}

impl Default for AllowListConfig {
    fn default() -> Self {
        Self {
            fragments: defaults::fragments(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StormConfig {
    /// Hours without closings after which a new storm may alert again
    #[serde(default = "defaults::reset_hours")]
    pub reset_hours: u32,
}

impl StormConfig {
    pub fn reset_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.reset_hours))
    }
}

impl Default for StormConfig {
    fn default() -> Self {
        Self {
            reset_hours: defaults::reset_hours(),
        }
    }
}

/// Report zone: an IANA time zone plus the label appended to rendered times.
///
/// The label is fixed text and does not follow daylight saving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// IANA zone name, e.g. `America/New_York`
    #[serde(default = "defaults::time_zone")]
    pub time_zone: String,

    #[serde(default = "defaults::zone_label")]
    pub zone_label: String,
}

impl ReportConfig {
    /// The configured zone, or UTC when the name is unknown.
    pub fn tz(&self) -> Tz {
        self.time_zone.parse().unwrap_or(Tz::UTC)
    }

    /// Current time in the report zone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.tz()).fixed_offset()
    }

    /// Render a timestamp as `MM/DD/YYYY hh:mm:ss AM/PM LABEL`.
    pub fn format(&self, at: &DateTime<FixedOffset>) -> String {
        let local = at.with_timezone(&self.tz());
        format!(
            "{} {}",
            local.format("%m/%d/%Y %I:%M:%S %p"),
            self.zone_label
        )
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            time_zone: defaults::time_zone(),
            zone_label: defaults::zone_label(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "defaults::subject")]
    pub subject: String,

    /// Public status page linked from the alert body
    #[serde(default = "defaults::site_url")]
    pub site_url: String,

    /// SNS topic receiving alerts. A blank `SNS_TOPIC_ARN` clears it, after
    /// which every delivery fails.
    #[serde(default = "defaults::topic_arn")]
    pub topic_arn: Option<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            subject: defaults::subject(),
            site_url: defaults::site_url(),
            topic_arn: defaults::topic_arn(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default = "defaults::bucket")]
    pub bucket: String,

    #[serde(default = "defaults::snapshot_key")]
    pub key: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            bucket: defaults::bucket(),
            key: defaults::snapshot_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default = "defaults::state_table")]
    pub table: String,

    /// Partition key value of the single state record
    #[serde(default = "defaults::state_key")]
    pub key: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            table: defaults::state_table(),
            key: defaults::state_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use super::{SourceConfig, SourceLayout};

    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0".into()
    }
    pub fn timeout() -> u64 {
        8
    }

    pub fn sources() -> Vec<SourceConfig> {
        vec![
            SourceConfig {
                name: "NBC Connecticut".into(),
                url: "https://www.nbcconnecticut.com/weather/school-closings/".into(),
                layout: SourceLayout::HeadingParagraph,
            },
            SourceConfig {
                name: "WFSB".into(),
                url: "https://webpubcontent.gray.tv/wfsb/xml/WFSBclosings.html?app_data=referer_override%3D".into(),
                layout: SourceLayout::StatusTable,
            },
        ]
    }

    pub fn fragments() -> Vec<String> {
        [
            "gengras",
            "oak hill",
            "solterra",
            "partnership",
            "edadvance",
            "aces",
            "aspire",
            "naugatuck public",
            "naugatuck schools",
            "southington public",
            "southington schools",
            "hope academy",
            "bridges of aces",
            "bristol public",
            "bristol schools",
            "winsted public",
            "winsted schools",
            "terryville",
            "terryville schools",
            "plymouth",
            "plymouth schools",
            "canton public",
            "canton schools",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    pub fn reset_hours() -> u32 {
        4
    }

    // Report zone defaults
    pub fn time_zone() -> String {
        "America/New_York".into()
    }
    pub fn zone_label() -> String {
        "EST".into()
    }

    pub fn subject() -> String {
        "School Closings Alert".into()
    }
    pub fn site_url() -> String {
        "https://frankgjr.github.io/school-closings-app/".into()
    }
    pub fn topic_arn() -> Option<String> {
        Some("arn:aws:sns:us-east-1:058264293996:SchoolClosingsAlerts".into())
    }

    pub fn bucket() -> String {
        "cardinal-driving-school-closings".into()
    }
    pub fn snapshot_key() -> String {
        "school_closings.json".into()
    }

    pub fn state_table() -> String {
        "SchoolClosingsState".into()
    }
    pub fn state_key() -> String {
        "state".into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
