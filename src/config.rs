use anyhow::{bail, Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::feedback::{FeedbackSettings, Thresholds};
use crate::github::client::DEFAULT_API_URL;
use crate::repository::Repository;

/// Upper bound for the feedback thresholds, ten years
const MAX_FEEDBACK_DAYS: i64 = 3650;

/// Main configuration structure for the issue bot
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// GitHub API location and credentials
    #[serde(default)]
    pub github: GitHubConfig,

    /// Which repositories are polled and how often
    #[serde(default)]
    pub monitoring: MonitoringConfig,

    /// Triage label settings
    #[serde(default)]
    pub triage: TriageConfig,

    /// Waiting-for-feedback settings
    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    /// Base URL of the REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub credentials: Credentials,
}

/// Static credential used for basic authentication
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Credentials {
    /// Login of the bot account, also exempt from counting as feedback
    #[serde(default)]
    pub username: String,

    /// Password or personal access token
    #[serde(default)]
    pub password: String,
}

/// Monitoring configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MonitoringConfig {
    /// Disabled monitoring turns every tick into a no-op
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Time between ticks
    #[serde(default = "default_interval")]
    pub interval: String, // "5m"

    /// Repositories polled on every tick, in order
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

/// Triage configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TriageConfig {
    /// Label applied to issues awaiting triage, keyed by slug, repository or organization
    #[serde(default)]
    pub label: HashMap<String, String>,
}

/// Feedback configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FeedbackConfig {
    /// Treat the bot's own comments as non-feedback
    #[serde(default = "default_true")]
    pub include_bot_user: bool,

    #[serde(default = "default_reminder_after_days")]
    pub reminder_after_days: i64,

    #[serde(default = "default_close_after_days")]
    pub close_after_days: i64,

    /// Labels and comments, keyed by slug, repository or organization
    #[serde(default)]
    pub repositories: HashMap<String, FeedbackSettings>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String, // "info"

    /// Log format
    #[serde(default = "default_log_format")]
    pub format: String, // "compact" or "json"
}

// Default value functions
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_true() -> bool {
    true
}
fn default_interval() -> String {
    "5m".to_string()
}
fn default_reminder_after_days() -> i64 {
    7
}
fn default_close_after_days() -> i64 {
    14
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            credentials: Credentials::default(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval: default_interval(),
            repositories: Vec::new(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            include_bot_user: default_true(),
            reminder_after_days: default_reminder_after_days(),
            close_after_days: default_close_after_days(),
            repositories: HashMap::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl FeedbackConfig {
    pub fn thresholds(&self) -> Result<Thresholds> {
        Thresholds::days(self.reminder_after_days, self.close_after_days)
            .context("Invalid feedback thresholds")
    }
}

impl Config {
    /// Load configuration from the default location or create a default config
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            let config = Self::default();

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
            }

            config.save(&config_path)?;

            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.expand_variables()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("issuebot").join("config.yml"))
    }

    /// Expand environment variables in the API URL and credentials
    pub fn expand_variables(&mut self) -> Result<()> {
        self.github.api_url = shellexpand::env(&self.github.api_url)
            .context("Failed to expand github.api_url")?
            .into_owned();

        self.github.credentials.username = shellexpand::env(&self.github.credentials.username)
            .context("Failed to expand github.credentials.username")?
            .into_owned();

        self.github.credentials.password = shellexpand::env(&self.github.credentials.password)
            .context("Failed to expand github.credentials.password")?
            .into_owned();

        Ok(())
    }

    /// Reject configurations the bot cannot run with
    pub fn validate(&self) -> Result<()> {
        let credentials = &self.github.credentials;
        if credentials.username.trim().is_empty() || credentials.password.trim().is_empty() {
            bail!("GitHub credentials are missing. Set github.credentials.username and github.credentials.password");
        }

        if self.monitoring.enabled && self.monitoring.repositories.is_empty() {
            bail!("Monitoring is enabled but no repositories are configured");
        }

        let feedback = &self.feedback;
        if feedback.reminder_after_days < 1 {
            bail!(
                "feedback.reminder_after_days ({}) must be at least 1",
                feedback.reminder_after_days
            );
        }
        if feedback.close_after_days > MAX_FEEDBACK_DAYS {
            bail!(
                "feedback.close_after_days ({}) must not exceed {}",
                feedback.close_after_days,
                MAX_FEEDBACK_DAYS
            );
        }
        if self.feedback.reminder_after_days >= self.feedback.close_after_days {
            bail!(
                "feedback.reminder_after_days ({}) must be less than feedback.close_after_days ({})",
                self.feedback.reminder_after_days,
                self.feedback.close_after_days
            );
        }

        self.interval()?;
        self.feedback.thresholds()?;
        Ok(())
    }

    /// Time between monitoring ticks
    pub fn interval(&self) -> Result<Duration> {
        let secs = parse_duration(&self.monitoring.interval)
            .with_context(|| format!("Invalid monitoring interval '{}'", self.monitoring.interval))?;
        if secs == 0 {
            bail!("Monitoring interval must be greater than zero");
        }
        Ok(Duration::from_secs(secs))
    }

    /// Copy with the password masked, for display
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.github.credentials.password.is_empty() {
            config.github.credentials.password = "********".to_string();
        }
        config
    }
}

/// Parse duration strings like "30s", "5m", "1h" or "2d" into seconds
pub fn parse_duration(duration_str: &str) -> Result<u64> {
    let duration_str = duration_str.trim().to_lowercase();

    let scaled = |value: &str, unit: u64, name: &str| -> Result<u64> {
        let value = value
            .parse::<u64>()
            .with_context(|| format!("Invalid {} value", name))?;
        value
            .checked_mul(unit)
            .with_context(|| format!("Duration of {} {} is too large", value, name))
    };

    if let Some(value) = duration_str.strip_suffix('s') {
        scaled(value, 1, "seconds")
    } else if let Some(value) = duration_str.strip_suffix('m') {
        scaled(value, 60, "minutes")
    } else if let Some(value) = duration_str.strip_suffix('h') {
        scaled(value, 3600, "hours")
    } else if let Some(value) = duration_str.strip_suffix('d') {
        scaled(value, 86400, "days")
    } else {
        // Raw seconds
        duration_str
            .parse::<u64>()
            .context("Invalid duration format. Use format like '30s', '5m', '1h'")
    }
}
