use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::{FeedbackListener, FeedbackSettings, Thresholds, Transition};
use crate::dispatch::{IssueOperation, ListenerDispatcher};
use crate::github::{ClosureReason, Gateway, Issue};
use crate::repository::{find_for, Repository};

/// Labels, reminds and closes issues according to their feedback state
///
/// Issues closed for lack of feedback are announced to `closure_listeners` so
/// that labels owned by other listeners can be cleaned up.
pub struct StandardFeedbackListener {
    gateway: Arc<dyn Gateway>,
    settings: HashMap<String, FeedbackSettings>,
    thresholds: Thresholds,
    closure_listeners: ListenerDispatcher,
}

impl StandardFeedbackListener {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        settings: HashMap<String, FeedbackSettings>,
        thresholds: Thresholds,
        closure_listeners: ListenerDispatcher,
    ) -> Self {
        Self {
            gateway,
            settings,
            thresholds,
            closure_listeners,
        }
    }

    fn settings_for(&self, repository: &Repository) -> Option<&FeedbackSettings> {
        let settings = find_for(&self.settings, repository);
        if settings.is_none() {
            debug!("No feedback settings configured for {}", repository);
        }
        settings
    }

    async fn close(&self, repository: &Repository, issue: &Issue, settings: &FeedbackSettings) -> Result<()> {
        info!("Closing {} as feedback was not provided", issue);
        self.gateway
            .add_comment(issue, &settings.close_comment)
            .await
            .with_context(|| format!("Failed to comment on {}", issue))?;
        self.gateway
            .close(issue, Some(ClosureReason::NotPlanned))
            .await
            .with_context(|| format!("Failed to close {}", issue))?;
        self.gateway
            .remove_label(issue, &settings.required_label)
            .await
            .with_context(|| format!("Failed to remove label '{}' from {}", settings.required_label, issue))?;
        self.gateway
            .remove_label(issue, &settings.reminder_label)
            .await
            .with_context(|| format!("Failed to remove label '{}' from {}", settings.reminder_label, issue))?;
        self.closure_listeners
            .notify(repository, issue, IssueOperation::Closed)
            .await;
        Ok(())
    }

    async fn remind(&self, issue: &Issue, settings: &FeedbackSettings) -> Result<()> {
        info!("Reminding {} that feedback is required", issue);
        self.gateway
            .add_comment(issue, &settings.reminder_comment)
            .await
            .with_context(|| format!("Failed to comment on {}", issue))?;
        self.gateway
            .add_label(issue, &settings.reminder_label)
            .await
            .with_context(|| format!("Failed to add label '{}' to {}", settings.reminder_label, issue))?;
        Ok(())
    }
}

#[async_trait]
impl FeedbackListener for StandardFeedbackListener {
    async fn feedback_provided(&self, repository: &Repository, issue: &Issue) -> Result<()> {
        let Some(settings) = self.settings_for(repository) else {
            return Ok(());
        };
        info!("Feedback has been provided on {}", issue);
        self.gateway
            .add_label(issue, &settings.provided_label)
            .await
            .with_context(|| format!("Failed to add label '{}' to {}", settings.provided_label, issue))?;
        self.gateway
            .remove_label(issue, &settings.required_label)
            .await
            .with_context(|| format!("Failed to remove label '{}' from {}", settings.required_label, issue))?;
        if issue.has_label(&settings.reminder_label) {
            self.gateway
                .remove_label(issue, &settings.reminder_label)
                .await
                .with_context(|| format!("Failed to remove label '{}' from {}", settings.reminder_label, issue))?;
        }
        Ok(())
    }

    async fn feedback_required(
        &self,
        repository: &Repository,
        issue: &Issue,
        waiting_since: DateTime<Utc>,
    ) -> Result<()> {
        let Some(settings) = self.settings_for(repository) else {
            return Ok(());
        };
        let reminded = issue.has_label(&settings.reminder_label);
        match self.thresholds.transition(waiting_since, Utc::now(), reminded) {
            Transition::Close => self.close(repository, issue, settings).await,
            Transition::Remind => self.remind(issue, settings).await,
            Transition::Wait => Ok(()),
        }
    }
}
