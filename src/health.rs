//! Preflight checks for the issue bot
//!
//! Verifies the configuration, the GitHub credential and access to every
//! monitored repository before the bot is left running unattended.

use octocrab::Octocrab;

use crate::Config;

/// Remaining quota below which the rate limit check warns
const LOW_RATE_LIMIT: usize = 100;

/// Result of system health checks
#[derive(Debug, Clone)]
pub struct HealthCheck {
    /// Configuration validity
    pub config: CheckResult,
    /// GitHub authentication status
    pub github_auth: CheckResult,
    /// Remaining API quota (warning only)
    pub rate_limit: CheckResult,
    /// Access to the monitored repositories
    pub repositories: CheckResult,
}

/// Result of an individual health check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
    pub is_warning: bool,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: None,
            is_warning: false,
        }
    }

    fn ok_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: Some(details.into()),
            is_warning: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: None,
            is_warning: false,
        }
    }

    fn error_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: Some(details.into()),
            is_warning: false,
        }
    }

    fn warning_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: Some(details.into()),
            is_warning: true,
        }
    }

    fn skipped() -> Self {
        Self::error("Skipped because GitHub authentication failed")
    }
}

impl HealthCheck {
    /// Run all health checks
    pub async fn run(config: &Config) -> Self {
        let config_check = Self::check_config(config);
        let client = match Self::client(config) {
            Ok(client) => client,
            Err(e) => {
                return Self {
                    config: config_check,
                    github_auth: CheckResult::error_with_details("Failed to create GitHub client", e.to_string()),
                    rate_limit: CheckResult::skipped(),
                    repositories: CheckResult::skipped(),
                }
            }
        };

        let github_auth = Self::check_github_auth(&client).await;
        if !github_auth.passed {
            return Self {
                config: config_check,
                github_auth,
                rate_limit: CheckResult::skipped(),
                repositories: CheckResult::skipped(),
            };
        }

        Self {
            config: config_check,
            github_auth,
            rate_limit: Self::check_rate_limit(&client).await,
            repositories: Self::check_repositories(&client, config).await,
        }
    }

    /// Check if all required checks passed (excludes warnings)
    pub fn all_passed(&self) -> bool {
        self.all_checks().iter().all(|(_, check)| check.passed)
    }

    /// Get list of failed checks (errors only, not warnings)
    pub fn errors(&self) -> Vec<&CheckResult> {
        [&self.config, &self.github_auth, &self.rate_limit, &self.repositories]
            .into_iter()
            .filter(|r| !r.passed && !r.is_warning)
            .collect()
    }

    /// Get list of warnings
    pub fn warnings(&self) -> Vec<&CheckResult> {
        [&self.config, &self.github_auth, &self.rate_limit, &self.repositories]
            .into_iter()
            .filter(|r| r.is_warning)
            .collect()
    }

    fn client(config: &Config) -> octocrab::Result<Octocrab> {
        let credentials = &config.github.credentials;
        Octocrab::builder()
            .basic_auth(credentials.username.clone(), credentials.password.clone())
            .base_uri(config.github.api_url.as_str())?
            .build()
    }

    fn check_config(config: &Config) -> CheckResult {
        match config.validate() {
            Ok(()) => CheckResult::ok_with_details(
                "Configuration is valid",
                format!("{} repositories monitored", config.monitoring.repositories.len()),
            ),
            Err(e) => CheckResult::error_with_details("Configuration is invalid", format!("{:#}", e)),
        }
    }

    /// Check GitHub authentication
    async fn check_github_auth(client: &Octocrab) -> CheckResult {
        match client.current().user().await {
            Ok(user) => CheckResult::ok_with_details(
                "GitHub authentication successful",
                format!("Username: {}", user.login),
            ),
            Err(e) => CheckResult::error_with_details(
                "GitHub authentication failed",
                format!("{}\nCheck github.credentials in the configuration file", e),
            ),
        }
    }

    /// Check remaining quota (warning only)
    async fn check_rate_limit(client: &Octocrab) -> CheckResult {
        match client.ratelimit().get().await {
            Ok(rate_limit) => {
                let core = rate_limit.resources.core;
                let details = format!("{}/{} requests remaining", core.remaining, core.limit);
                if core.remaining < LOW_RATE_LIMIT {
                    CheckResult::warning_with_details("Rate limit is nearly exhausted", details)
                } else {
                    CheckResult::ok_with_details("Rate limit available", details)
                }
            }
            Err(e) => CheckResult::warning_with_details("Could not read rate limit", e.to_string()),
        }
    }

    /// Check every monitored repository can be read
    async fn check_repositories(client: &Octocrab, config: &Config) -> CheckResult {
        if config.monitoring.repositories.is_empty() {
            return CheckResult::ok("No repositories configured");
        }

        let mut unreachable = Vec::new();
        for repository in &config.monitoring.repositories {
            if let Err(e) = client
                .repos(repository.organization.as_str(), repository.name.as_str())
                .get()
                .await
            {
                unreachable.push(format!("{}: {}", repository.slug(), e));
            }
        }

        if unreachable.is_empty() {
            CheckResult::ok_with_details(
                "All repositories reachable",
                format!("{} repositories", config.monitoring.repositories.len()),
            )
        } else {
            CheckResult::error_with_details("Some repositories are unreachable", unreachable.join("\n"))
        }
    }

    /// Get all checks as a slice for iteration
    pub fn all_checks(&self) -> [(&'static str, &CheckResult); 4] {
        [
            ("Configuration", &self.config),
            ("GitHub Authentication", &self.github_auth),
            ("Rate Limit", &self.rate_limit),
            ("Repositories", &self.repositories),
        ]
    }
}
