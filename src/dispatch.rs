//! Fan-out of issues to registered listeners.
//!
//! Each listener sees every issue regardless of how its siblings fare: a
//! failing listener is logged and skipped for that issue only.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::github::{GitHubError, Issue, Page};
use crate::repository::Repository;

/// Receives notifications about issues of a monitored repository
#[async_trait]
pub trait IssueListener: Send + Sync {
    /// Name used to identify this listener in logs
    fn name(&self) -> &str;

    async fn on_open_issue(&self, _repository: &Repository, _issue: &Issue) -> Result<()> {
        Ok(())
    }

    async fn on_issue_closure(&self, _repository: &Repository, _issue: &Issue) -> Result<()> {
        Ok(())
    }
}

/// Which listener callback an issue is delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOperation {
    Opened,
    Closed,
}

impl IssueOperation {
    async fn apply(
        self,
        listener: &dyn IssueListener,
        repository: &Repository,
        issue: &Issue,
    ) -> Result<()> {
        match self {
            IssueOperation::Opened => listener.on_open_issue(repository, issue).await,
            IssueOperation::Closed => listener.on_issue_closure(repository, issue).await,
        }
    }
}

/// Counts of listener invocations made by one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub issues: usize,
    pub attempted: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed
    }

    fn merge(&mut self, other: DispatchSummary) {
        self.issues += other.issues;
        self.attempted += other.attempted;
        self.failed += other.failed;
    }
}

/// Broadcasts issues to an ordered set of listeners
#[derive(Clone, Default)]
pub struct ListenerDispatcher {
    listeners: Vec<Arc<dyn IssueListener>>,
}

impl ListenerDispatcher {
    pub fn new(listeners: Vec<Arc<dyn IssueListener>>) -> Self {
        Self { listeners }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver every issue of every page to each listener, in registration order
    ///
    /// Listener failures are contained; a failure fetching the next page ends
    /// the dispatch and is returned to the caller.
    pub async fn dispatch(
        &self,
        repository: &Repository,
        first: Option<Page<Issue>>,
        operation: IssueOperation,
    ) -> Result<DispatchSummary, GitHubError> {
        let mut summary = DispatchSummary::default();
        let mut page = first;
        while let Some(current) = page {
            for issue in current.content() {
                summary.merge(self.notify(repository, issue, operation).await);
            }
            page = current.next().await?;
        }
        Ok(summary)
    }

    /// Deliver a single issue to each listener
    pub async fn notify(
        &self,
        repository: &Repository,
        issue: &Issue,
        operation: IssueOperation,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary {
            issues: 1,
            ..DispatchSummary::default()
        };
        for listener in &self.listeners {
            summary.attempted += 1;
            if let Err(e) = operation.apply(listener.as_ref(), repository, issue).await {
                summary.failed += 1;
                warn!(
                    "Listener '{}' failed when handling issue '{}': {:#}",
                    listener.name(),
                    issue,
                    e
                );
            }
        }
        summary
    }
}
