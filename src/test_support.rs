//! Builders shared by unit tests.

use chrono::{DateTime, Duration, Utc};

use crate::github::{Comment, Event, EventType, Issue, IssueState, Label, Milestone, PullRequestRef, User};

/// An open issue opened by `reporter` with no labels or milestone
pub fn issue(url: &str) -> Issue {
    Issue {
        url: url.to_string(),
        number: 1,
        title: "Something is broken".to_string(),
        comments_url: format!("{}/comments", url),
        events_url: format!("{}/events", url),
        labels_url: format!("{}/labels{{/name}}", url),
        user: User::new("reporter"),
        labels: Vec::new(),
        milestone: None,
        pull_request: None,
        state: IssueState::Open,
    }
}

pub fn opened_by(login: &str) -> Issue {
    Issue {
        user: User::new(login),
        ..issue("https://api.github.com/repos/test/test/issues/1")
    }
}

pub fn labelled(names: &[&str]) -> Issue {
    issue("https://api.github.com/repos/test/test/issues/1")
        .with_labels(names.iter().map(|name| Label::new(*name)).collect())
}

pub fn with_milestone(issue: Issue, title: &str) -> Issue {
    Issue {
        milestone: Some(Milestone {
            title: title.to_string(),
        }),
        ..issue
    }
}

pub fn as_pull_request(issue: Issue) -> Issue {
    Issue {
        pull_request: Some(PullRequestRef {
            url: Some("https://api.github.com/repos/test/test/pulls/1".to_string()),
        }),
        ..issue
    }
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

pub fn labeled_event(label: &str, at: DateTime<Utc>) -> Event {
    Event {
        kind: EventType::Labeled,
        created_at: at,
        label: Some(Label::new(label)),
    }
}

pub fn event(kind: EventType, at: DateTime<Utc>) -> Event {
    Event {
        kind,
        created_at: at,
        label: None,
    }
}

pub fn comment(author: &str, at: DateTime<Utc>) -> Comment {
    Comment {
        author: User::new(author),
        created_at: at,
    }
}
