//! Feedback: follows issues labelled as waiting for reporter feedback, reminding
//! and eventually closing them when nobody answers.
//!
//! Nothing is stored between ticks. Whether an issue is waiting, and since when,
//! is worked out afresh from its event and comment history every time.

mod standard;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::dispatch::IssueListener;
use crate::github::{Comment, Event, Gateway, Issue, Page};
use crate::repository::{find_for, Repository};

pub use standard::StandardFeedbackListener;

/// Labels and comment texts used for one repository
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FeedbackSettings {
    /// Label marking an issue as waiting for feedback
    pub required_label: String,

    /// Label applied once the reporter has answered
    pub provided_label: String,

    /// Label applied alongside the reminder comment
    pub reminder_label: String,

    pub reminder_comment: String,

    pub close_comment: String,
}

/// What should happen to an issue that is still waiting for feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Close,
    Remind,
    Wait,
}

/// How long an issue may wait before it is reminded and then closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub reminder_after: Duration,
    pub close_after: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            reminder_after: Duration::days(7),
            close_after: Duration::days(14),
        }
    }
}

impl Thresholds {
    /// Thresholds from whole days, failing when either is out of range
    pub fn days(reminder_after: i64, close_after: i64) -> Result<Self> {
        let to_duration = |days: i64| {
            Duration::try_days(days).with_context(|| format!("{} days is out of range", days))
        };
        Ok(Self {
            reminder_after: to_duration(reminder_after)?,
            close_after: to_duration(close_after)?,
        })
    }

    /// Decide the transition for an issue waiting since `waiting_since`
    pub fn transition(
        &self,
        waiting_since: DateTime<Utc>,
        now: DateTime<Utc>,
        reminded: bool,
    ) -> Transition {
        let elapsed = now - waiting_since;
        if elapsed >= self.close_after {
            Transition::Close
        } else if elapsed >= self.reminder_after && !reminded {
            Transition::Remind
        } else {
            Transition::Wait
        }
    }
}

/// Receives the outcome of feedback evaluation for a waiting issue
#[async_trait]
pub trait FeedbackListener: Send + Sync {
    async fn feedback_provided(&self, repository: &Repository, issue: &Issue) -> Result<()>;

    async fn feedback_required(
        &self,
        repository: &Repository,
        issue: &Issue,
        waiting_since: DateTime<Utc>,
    ) -> Result<()>;
}

/// Time of the most recent application of `label` in `events`
pub fn waiting_since(events: &[Event], label: &str) -> Option<DateTime<Utc>> {
    events
        .iter()
        .filter(|event| event.labeled_with(label))
        .map(|event| event.created_at)
        .max()
}

/// Whether any non-exempt author commented after `since`
pub fn commented_since(comments: &[Comment], since: DateTime<Utc>, exempt: &BTreeSet<String>) -> bool {
    comments
        .iter()
        .any(|comment| !exempt.contains(&comment.author.login) && comment.created_at > since)
}

/// Issue listener that resolves the feedback state of open issues
pub struct FeedbackIssueListener {
    gateway: Arc<dyn Gateway>,
    settings: HashMap<String, FeedbackSettings>,
    bot_user: Option<String>,
    listener: Arc<dyn FeedbackListener>,
}

impl FeedbackIssueListener {
    /// `bot_user` is exempt from counting as feedback when present
    pub fn new(
        gateway: Arc<dyn Gateway>,
        settings: HashMap<String, FeedbackSettings>,
        bot_user: Option<String>,
        listener: Arc<dyn FeedbackListener>,
    ) -> Self {
        Self {
            gateway,
            settings,
            bot_user,
            listener,
        }
    }

    fn exempt_authors(&self, repository: &Repository) -> BTreeSet<String> {
        let mut exempt = repository.collaborators.clone();
        if let Some(bot) = &self.bot_user {
            exempt.insert(bot.clone());
        }
        exempt
    }

    async fn resolve_waiting_since(&self, issue: &Issue, label: &str) -> Result<Option<DateTime<Utc>>> {
        let mut latest = None;
        let mut page = self
            .gateway
            .get_events(issue)
            .await
            .with_context(|| format!("Failed to fetch events of {}", issue))?;
        while let Some(current) = page {
            latest = latest.max(waiting_since(current.content(), label));
            page = current.next().await?;
        }
        Ok(latest)
    }

    async fn has_feedback(
        &self,
        repository: &Repository,
        issue: &Issue,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        let exempt = self.exempt_authors(repository);
        let mut page: Option<Page<Comment>> = self
            .gateway
            .get_comments(issue)
            .await
            .with_context(|| format!("Failed to fetch comments of {}", issue))?;
        while let Some(current) = page {
            if commented_since(current.content(), since, &exempt) {
                return Ok(true);
            }
            page = current.next().await?;
        }
        Ok(false)
    }
}

#[async_trait]
impl IssueListener for FeedbackIssueListener {
    fn name(&self) -> &str {
        "feedback"
    }

    async fn on_open_issue(&self, repository: &Repository, issue: &Issue) -> Result<()> {
        if issue.is_pull_request() {
            return Ok(());
        }
        let Some(settings) = find_for(&self.settings, repository) else {
            debug!("No feedback settings configured for {}", repository);
            return Ok(());
        };
        if !issue.has_label(&settings.required_label) {
            return Ok(());
        }
        let Some(since) = self
            .resolve_waiting_since(issue, &settings.required_label)
            .await?
        else {
            debug!(
                "{} is labelled '{}' but has no matching label event",
                issue, settings.required_label
            );
            return Ok(());
        };
        if self.has_feedback(repository, issue, since).await? {
            self.listener.feedback_provided(repository, issue).await
        } else {
            self.listener.feedback_required(repository, issue, since).await
        }
    }
}
