//! The scheduled pass over every monitored repository.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::dispatch::{IssueOperation, ListenerDispatcher};
use crate::github::{Gateway, RateLimit};
use crate::repository::{find_for, Repository};

/// Work performed for each repository on every tick
#[async_trait]
pub trait RepositoryListener: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(&self, repository: &Repository) -> Result<()>;
}

/// Feeds every open issue of a repository to the issue listeners
pub struct OpenIssuesHandler {
    gateway: Arc<dyn Gateway>,
    dispatcher: ListenerDispatcher,
}

impl OpenIssuesHandler {
    pub fn new(gateway: Arc<dyn Gateway>, dispatcher: ListenerDispatcher) -> Self {
        Self { gateway, dispatcher }
    }
}

#[async_trait]
impl RepositoryListener for OpenIssuesHandler {
    fn name(&self) -> &str {
        "open-issues"
    }

    async fn handle(&self, repository: &Repository) -> Result<()> {
        let first = self
            .gateway
            .get_open_issues(&repository.organization, &repository.name)
            .await
            .with_context(|| format!("Failed to fetch open issues of {}", repository))?;
        let summary = self
            .dispatcher
            .dispatch(repository, first, IssueOperation::Opened)
            .await
            .with_context(|| format!("Failed to page through open issues of {}", repository))?;
        debug!(
            "Processed {} open issues of {} ({} listener failures)",
            summary.issues, repository, summary.failed
        );
        Ok(())
    }
}

/// Announces closed issues that still carry the repository's triage label
pub struct ClosedIssuesHandler {
    gateway: Arc<dyn Gateway>,
    dispatcher: ListenerDispatcher,
    labels: HashMap<String, String>,
}

impl ClosedIssuesHandler {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        dispatcher: ListenerDispatcher,
        labels: HashMap<String, String>,
    ) -> Self {
        Self {
            gateway,
            dispatcher,
            labels,
        }
    }
}

#[async_trait]
impl RepositoryListener for ClosedIssuesHandler {
    fn name(&self) -> &str {
        "closed-issues"
    }

    async fn handle(&self, repository: &Repository) -> Result<()> {
        let Some(label) = find_for(&self.labels, repository) else {
            debug!("No triage label configured for {}, skipping closed issues", repository);
            return Ok(());
        };
        let first = self
            .gateway
            .get_closed_issues_with_label(&repository.organization, &repository.name, label)
            .await
            .with_context(|| format!("Failed to fetch closed issues of {}", repository))?;
        let summary = self
            .dispatcher
            .dispatch(repository, first, IssueOperation::Closed)
            .await
            .with_context(|| format!("Failed to page through closed issues of {}", repository))?;
        debug!(
            "Processed {} closed issues of {} labelled '{}'",
            summary.issues, repository, label
        );
        Ok(())
    }
}

/// Whether ticks do any work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Disabled,
    Enabled,
}

impl From<bool> for MonitorState {
    fn from(enabled: bool) -> Self {
        if enabled {
            MonitorState::Enabled
        } else {
            MonitorState::Disabled
        }
    }
}

/// Outcome of a single tick
#[derive(Debug, Clone, Default)]
pub struct MonitorSummary {
    pub repositories: usize,
    pub handlers_run: usize,
    pub handler_failures: usize,
    pub rate_limit: Option<RateLimit>,
    pub duration: Duration,
}

impl MonitorSummary {
    pub fn is_clean(&self) -> bool {
        self.handler_failures == 0
    }
}

/// Runs every repository handler against every configured repository
pub struct RepositoryMonitor {
    state: MonitorState,
    repositories: Vec<Repository>,
    handlers: Vec<Arc<dyn RepositoryListener>>,
    gateway: Arc<dyn Gateway>,
}

impl RepositoryMonitor {
    pub fn new(
        state: MonitorState,
        repositories: Vec<Repository>,
        handlers: Vec<Arc<dyn RepositoryListener>>,
        gateway: Arc<dyn Gateway>,
    ) -> Self {
        Self {
            state,
            repositories,
            handlers,
            gateway,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// One full pass over all repositories and handlers
    ///
    /// Failures are logged and counted; they never abort the pass.
    pub async fn monitor(&self) -> MonitorSummary {
        let mut summary = MonitorSummary::default();
        if self.state == MonitorState::Disabled {
            debug!("Monitoring is disabled, skipping tick");
            return summary;
        }

        let started = Instant::now();
        info!("Monitoring {} repositories", self.repositories.len());
        for repository in &self.repositories {
            summary.repositories += 1;
            for handler in &self.handlers {
                summary.handlers_run += 1;
                if let Err(e) = handler.handle(repository).await {
                    summary.handler_failures += 1;
                    warn!(
                        "Handler '{}' failed for {}: {:#}",
                        handler.name(),
                        repository.slug(),
                        e
                    );
                }
            }
        }
        summary.duration = started.elapsed();
        summary.rate_limit = self.gateway.rate_limit();

        match &summary.rate_limit {
            Some(rate_limit) => info!("Monitoring completed. {}", rate_limit),
            None => info!("Monitoring completed. Rate limit unknown"),
        }
        summary
    }
}
