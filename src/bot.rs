//! Assembles the monitor, its handlers and the issue listeners from configuration.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::dispatch::{IssueListener, ListenerDispatcher};
use crate::feedback::{FeedbackIssueListener, StandardFeedbackListener};
use crate::github::{Gateway, GitHubClient};
use crate::monitor::{ClosedIssuesHandler, OpenIssuesHandler, RepositoryListener, RepositoryMonitor};
use crate::triage::{default_filters, LabelApplyingTriageListener, TriageIssueListener};

/// Build a monitor that talks to the GitHub API described by `config`
pub fn build_monitor(config: &Config) -> Result<RepositoryMonitor> {
    let credentials = &config.github.credentials;
    let client = GitHubClient::with_base_url(
        &config.github.api_url,
        &credentials.username,
        &credentials.password,
    )
    .context("Failed to create GitHub client")?;
    build_monitor_with(config, Arc::new(client))
}

/// Build a monitor on top of an existing gateway
pub fn build_monitor_with(config: &Config, gateway: Arc<dyn Gateway>) -> Result<RepositoryMonitor> {
    let triage: Arc<dyn IssueListener> = Arc::new(TriageIssueListener::new(
        default_filters(),
        Arc::new(LabelApplyingTriageListener::new(
            gateway.clone(),
            config.triage.label.clone(),
        )),
    ));

    // Closing for lack of feedback notifies triage only, never feedback itself
    let closure_listeners = ListenerDispatcher::new(vec![triage.clone()]);
    let standard = Arc::new(StandardFeedbackListener::new(
        gateway.clone(),
        config.feedback.repositories.clone(),
        config.feedback.thresholds()?,
        closure_listeners,
    ));
    let bot_user = config
        .feedback
        .include_bot_user
        .then(|| config.github.credentials.username.clone());
    let feedback: Arc<dyn IssueListener> = Arc::new(FeedbackIssueListener::new(
        gateway.clone(),
        config.feedback.repositories.clone(),
        bot_user,
        standard,
    ));

    let issue_listeners = ListenerDispatcher::new(vec![triage, feedback]);
    let handlers: Vec<Arc<dyn RepositoryListener>> = vec![
        Arc::new(OpenIssuesHandler::new(gateway.clone(), issue_listeners.clone())),
        Arc::new(ClosedIssuesHandler::new(
            gateway.clone(),
            issue_listeners.clone(),
            config.triage.label.clone(),
        )),
    ];
    debug!(
        "Wired {} repository handlers and {} issue listeners",
        handlers.len(),
        issue_listeners.len()
    );

    Ok(RepositoryMonitor::new(
        config.monitoring.enabled.into(),
        config.monitoring.repositories.clone(),
        handlers,
        gateway,
    ))
}
