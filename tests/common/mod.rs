//! Common test utilities and helpers for issuebot tests
#![allow(dead_code)]

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

use issuebot::config::Credentials;
use issuebot::feedback::FeedbackSettings;
use issuebot::{Config, Repository};

pub const TRIAGE_LABEL: &str = "waiting-for-triage";
pub const REQUIRED_LABEL: &str = "waiting-for-feedback";
pub const PROVIDED_LABEL: &str = "feedback-provided";
pub const REMINDER_LABEL: &str = "feedback-reminder";
pub const REMINDER_COMMENT: &str = "Please provide the requested information.";
pub const CLOSE_COMMENT: &str = "Closing due to lack of requested feedback.";

/// Temporary directory holding a config file
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    pub fn create_test_config(&self, content: &str) -> PathBuf {
        let config_path = self.temp_dir.path().join("config.yml");
        std::fs::write(&config_path, content).expect("Failed to write test config");
        config_path
    }
}

/// Configuration pointing at `api_url` with triage and feedback enabled for `test/test`
pub fn bot_config(api_url: &str, repositories: Vec<Repository>) -> Config {
    let mut config = Config::default();
    config.github.api_url = api_url.to_string();
    config.github.credentials = Credentials {
        username: "issuebot".to_string(),
        password: "secret".to_string(),
    };
    config.monitoring.repositories = repositories;
    config
        .triage
        .label
        .insert("test/test".to_string(), TRIAGE_LABEL.to_string());
    config.feedback.repositories.insert(
        "test/test".to_string(),
        FeedbackSettings {
            required_label: REQUIRED_LABEL.to_string(),
            provided_label: PROVIDED_LABEL.to_string(),
            reminder_label: REMINDER_LABEL.to_string(),
            reminder_comment: REMINDER_COMMENT.to_string(),
            close_comment: CLOSE_COMMENT.to_string(),
        },
    );
    config
}

pub fn test_repository() -> Repository {
    Repository::new("test", "test").with_collaborators(["amy"])
}

pub fn issue_path(number: u64) -> String {
    format!("/repos/test/test/issues/{}", number)
}

/// Mock GitHub issue as returned by the REST API
pub fn issue_json(base: &str, number: u64, author: &str, labels: &[&str]) -> Value {
    let issue_url = format!("{}{}", base, issue_path(number));
    json!({
        "url": issue_url,
        "number": number,
        "title": format!("Issue {}", number),
        "comments_url": format!("{}/comments", issue_url),
        "events_url": format!("{}/events", issue_url),
        "labels_url": format!("{}/labels{{/name}}", issue_url),
        "user": {"login": author},
        "labels": labels_json(labels),
        "milestone": null,
        "state": "open"
    })
}

pub fn labels_json(labels: &[&str]) -> Value {
    Value::Array(labels.iter().map(|name| json!({ "name": name })).collect())
}

pub fn labeled_event_json(label: &str, days_ago: i64) -> Value {
    json!({
        "event": "labeled",
        "created_at": (Utc::now() - Duration::days(days_ago)).to_rfc3339(),
        "label": {"name": label}
    })
}

pub fn comment_json(author: &str, days_ago: i64) -> Value {
    json!({
        "user": {"login": author},
        "created_at": (Utc::now() - Duration::days(days_ago)).to_rfc3339(),
        "body": "..."
    })
}
