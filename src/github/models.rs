//! Value types returned by the GitHub gateway.
//!
//! Every type here is an immutable snapshot of remote state. Operations that
//! change an issue return a fresh [`Issue`] rather than editing one in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// GitHub user (minimal representation)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub login: String,
}

impl User {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.login)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Label {
    pub name: String,
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Milestone {
    pub title: String,
}

/// Pull request indicator (presence means the issue is actually a PR)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PullRequestRef {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

/// Reason recorded by GitHub when an issue is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureReason {
    NotPlanned,
}

impl ClosureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClosureReason::NotPlanned => "not_planned",
        }
    }
}

/// GitHub issue
///
/// The `*_url` fields are opaque resource handles used by the gateway; the
/// labels URL still carries GitHub's `{/name}` template suffix.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Issue {
    pub url: String,
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub comments_url: String,
    pub events_url: String,
    pub labels_url: String,
    pub user: User,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub milestone: Option<Milestone>,
    pub pull_request: Option<PullRequestRef>,
    #[serde(default)]
    pub state: IssueState,
}

impl Issue {
    /// Returns true if this is actually a pull request, not an issue
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label.name == name)
    }

    /// A copy of this issue carrying `labels` instead of its current ones
    pub fn with_labels(&self, labels: Vec<Label>) -> Issue {
        Issue {
            labels,
            ..self.clone()
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Comment {
    #[serde(rename = "user")]
    pub author: User,
    pub created_at: DateTime<Utc>,
}

/// Entry in an issue's event history
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Event {
    #[serde(rename = "event")]
    pub kind: EventType,
    pub created_at: DateTime<Utc>,
    pub label: Option<Label>,
}

impl Event {
    /// Whether this event applied the label called `name`
    pub fn labeled_with(&self, name: &str) -> bool {
        self.kind == EventType::Labeled
            && self.label.as_ref().is_some_and(|label| label.name == name)
    }
}

/// Issue event types published by the GitHub events API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    AddedToProject,
    Assigned,
    Closed,
    CommentDeleted,
    ConvertedNoteToIssue,
    Demilestoned,
    HeadRefDeleted,
    HeadRefRestored,
    Labeled,
    Locked,
    MarkedAsDuplicate,
    Mentioned,
    Merged,
    Milestoned,
    MovedColumnsInProject,
    Referenced,
    RemovedFromProject,
    Renamed,
    Reopened,
    ReviewDismissed,
    ReviewRequested,
    ReviewRequestRemoved,
    Subscribed,
    Unassigned,
    Unlabeled,
    Unlocked,
    UnmarkedAsDuplicate,
    Unsubscribed,
    Unknown,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::AddedToProject => "added_to_project",
            EventType::Assigned => "assigned",
            EventType::Closed => "closed",
            EventType::CommentDeleted => "comment_deleted",
            EventType::ConvertedNoteToIssue => "converted_note_to_issue",
            EventType::Demilestoned => "demilestoned",
            EventType::HeadRefDeleted => "head_ref_deleted",
            EventType::HeadRefRestored => "head_ref_restored",
            EventType::Labeled => "labeled",
            EventType::Locked => "locked",
            EventType::MarkedAsDuplicate => "marked_as_duplicate",
            EventType::Mentioned => "mentioned",
            EventType::Merged => "merged",
            EventType::Milestoned => "milestoned",
            EventType::MovedColumnsInProject => "moved_columns_in_project",
            EventType::Referenced => "referenced",
            EventType::RemovedFromProject => "removed_from_project",
            EventType::Renamed => "renamed",
            EventType::Reopened => "reopened",
            EventType::ReviewDismissed => "review_dismissed",
            EventType::ReviewRequested => "review_requested",
            EventType::ReviewRequestRemoved => "review_request_removed",
            EventType::Subscribed => "subscribed",
            EventType::Unassigned => "unassigned",
            EventType::Unlabeled => "unlabeled",
            EventType::Unlocked => "unlocked",
            EventType::UnmarkedAsDuplicate => "unmarked_as_duplicate",
            EventType::Unsubscribed => "unsubscribed",
            EventType::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "added_to_project" => Some(EventType::AddedToProject),
            "assigned" => Some(EventType::Assigned),
            "closed" => Some(EventType::Closed),
            "comment_deleted" => Some(EventType::CommentDeleted),
            "converted_note_to_issue" => Some(EventType::ConvertedNoteToIssue),
            "demilestoned" => Some(EventType::Demilestoned),
            "head_ref_deleted" => Some(EventType::HeadRefDeleted),
            "head_ref_restored" => Some(EventType::HeadRefRestored),
            "labeled" => Some(EventType::Labeled),
            "locked" => Some(EventType::Locked),
            "marked_as_duplicate" => Some(EventType::MarkedAsDuplicate),
            "mentioned" => Some(EventType::Mentioned),
            "merged" => Some(EventType::Merged),
            "milestoned" => Some(EventType::Milestoned),
            "moved_columns_in_project" => Some(EventType::MovedColumnsInProject),
            "referenced" => Some(EventType::Referenced),
            "removed_from_project" => Some(EventType::RemovedFromProject),
            "renamed" => Some(EventType::Renamed),
            "reopened" => Some(EventType::Reopened),
            "review_dismissed" => Some(EventType::ReviewDismissed),
            "review_requested" => Some(EventType::ReviewRequested),
            "review_request_removed" => Some(EventType::ReviewRequestRemoved),
            "subscribed" => Some(EventType::Subscribed),
            "unassigned" => Some(EventType::Unassigned),
            "unlabeled" => Some(EventType::Unlabeled),
            "unlocked" => Some(EventType::Unlocked),
            "unmarked_as_duplicate" => Some(EventType::UnmarkedAsDuplicate),
            "unsubscribed" => Some(EventType::Unsubscribed),
            _ => None,
        }
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        EventType::parse(&value).unwrap_or_else(|| {
            tracing::debug!("Received unknown event type '{}'", value);
            EventType::Unknown
        })
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.as_str().to_string()
    }
}

/// Snapshot of the remaining API quota
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} remaining, resets at {}",
            self.remaining, self.limit, self.reset_at
        )
    }
}
