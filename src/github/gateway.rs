use async_trait::async_trait;

use crate::github::error::Result;
use crate::github::models::{ClosureReason, Comment, Event, Issue, RateLimit};
use crate::github::page::Page;

/// Operations the bot performs against GitHub
///
/// Collection getters return `None` when the resource is absent, which callers
/// treat exactly like an empty collection. Mutating operations never touch the
/// issue they are given; they return a fresh snapshot instead.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Open issues of `organization/repository`
    async fn get_open_issues(&self, organization: &str, repository: &str)
        -> Result<Option<Page<Issue>>>;

    /// Closed issues of `organization/repository` that still carry `label`
    async fn get_closed_issues_with_label(
        &self,
        organization: &str,
        repository: &str,
        label: &str,
    ) -> Result<Option<Page<Issue>>>;

    async fn get_comments(&self, issue: &Issue) -> Result<Option<Page<Comment>>>;

    async fn get_events(&self, issue: &Issue) -> Result<Option<Page<Event>>>;

    /// Apply `label`; applying a label the issue already has is harmless
    async fn add_label(&self, issue: &Issue, label: &str) -> Result<Issue>;

    /// Remove `label`; removing an absent label is harmless
    async fn remove_label(&self, issue: &Issue, label: &str) -> Result<Issue>;

    async fn add_comment(&self, issue: &Issue, body: &str) -> Result<Comment>;

    async fn close(&self, issue: &Issue, reason: Option<ClosureReason>) -> Result<Issue>;

    /// Quota snapshot from the most recent call, if known
    fn rate_limit(&self) -> Option<RateLimit>;
}
