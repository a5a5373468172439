//! issuebot - Polling GitHub issue bot
//!
//! issuebot periodically polls the GitHub REST API for a set of repositories and
//! keeps their issues tidy without any local state: every decision is worked out
//! again from the issues' current labels, events and comments on each tick.
//!
//! ## Core Features
//!
//! - **Triage**: Labels issues that nobody has looked at yet and clears the label on closure
//! - **Feedback**: Reminds reporters who were asked for information and closes issues left unanswered
//! - **Failure Isolation**: A failing listener or repository never stops the rest of a tick
//! - **Configuration Management**: YAML-based configuration with XDG compliance
//!
//! ## Modules
//!
//! - [`github`]: GitHub API integration, pagination and rate limit tracking
//! - [`dispatch`]: Fan-out of issues to listeners
//! - [`monitor`]: The scheduled pass over all repositories
//! - [`triage`] and [`feedback`]: The rule engines
//! - [`config`]: Configuration management and parsing

pub mod bot;
pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod feedback;
pub mod github;
pub mod health;
pub mod monitor;
pub mod repository;
pub mod triage;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use daemon::Daemon;
pub use dispatch::{IssueListener, IssueOperation, ListenerDispatcher};
pub use github::{Gateway, GitHubClient, GitHubError};
pub use health::HealthCheck;
pub use monitor::{MonitorSummary, RepositoryMonitor};
pub use repository::Repository;
