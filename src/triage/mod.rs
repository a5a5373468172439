//! Triage: marks newly opened issues that nobody has looked at yet and clears
//! the mark once they are closed.

pub mod filter;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::dispatch::IssueListener;
use crate::github::{Gateway, Issue};
use crate::repository::{find_for, Repository};

pub use filter::{default_filters, Labelled, MilestoneApplied, OpenedByCollaborator, TriageFilter};

/// Reacts to the outcome of triage evaluation
#[async_trait]
pub trait TriageListener: Send + Sync {
    async fn requires_triage(&self, repository: &Repository, issue: &Issue) -> Result<()>;

    async fn does_not_require_triage(&self, repository: &Repository, issue: &Issue) -> Result<()>;
}

/// Applies and removes a per-repository triage label
pub struct LabelApplyingTriageListener {
    gateway: Arc<dyn Gateway>,
    labels: HashMap<String, String>,
}

impl LabelApplyingTriageListener {
    /// `labels` is keyed by slug, repository name or organization name
    pub fn new(gateway: Arc<dyn Gateway>, labels: HashMap<String, String>) -> Self {
        Self { gateway, labels }
    }

    fn label_for(&self, repository: &Repository) -> Option<&str> {
        let label = find_for(&self.labels, repository).map(String::as_str);
        if label.is_none() {
            debug!("No triage label configured for {}", repository);
        }
        label
    }
}

#[async_trait]
impl TriageListener for LabelApplyingTriageListener {
    async fn requires_triage(&self, repository: &Repository, issue: &Issue) -> Result<()> {
        let Some(label) = self.label_for(repository) else {
            return Ok(());
        };
        info!("Labelling {} as requiring triage", issue);
        self.gateway
            .add_label(issue, label)
            .await
            .with_context(|| format!("Failed to apply triage label '{}' to {}", label, issue))?;
        Ok(())
    }

    async fn does_not_require_triage(&self, repository: &Repository, issue: &Issue) -> Result<()> {
        let Some(label) = self.label_for(repository) else {
            return Ok(());
        };
        self.gateway
            .remove_label(issue, label)
            .await
            .with_context(|| format!("Failed to remove triage label '{}' from {}", label, issue))?;
        Ok(())
    }
}

/// Runs the filter chain over open issues and forwards closures
pub struct TriageIssueListener {
    filters: Vec<Box<dyn TriageFilter>>,
    listener: Arc<dyn TriageListener>,
}

impl TriageIssueListener {
    pub fn new(filters: Vec<Box<dyn TriageFilter>>, listener: Arc<dyn TriageListener>) -> Self {
        Self { filters, listener }
    }

    /// An issue needs triage when no filter recognises it as already triaged
    pub fn requires_triage(&self, repository: &Repository, issue: &Issue) -> bool {
        !self.filters.iter().any(|f| f.triaged(repository, issue))
    }
}

#[async_trait]
impl IssueListener for TriageIssueListener {
    fn name(&self) -> &str {
        "triage"
    }

    async fn on_open_issue(&self, repository: &Repository, issue: &Issue) -> Result<()> {
        if self.requires_triage(repository, issue) {
            self.listener.requires_triage(repository, issue).await?;
        }
        Ok(())
    }

    async fn on_issue_closure(&self, repository: &Repository, issue: &Issue) -> Result<()> {
        self.listener.does_not_require_triage(repository, issue).await
    }
}
