//! End-to-end ticks against a mock GitHub API
//!
//! Each test wires the real monitor, listeners and REST client exactly as the
//! binary does and checks the HTTP calls the bot makes.

mod common;

use common::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use issuebot::bot::build_monitor;
use issuebot::Repository;

fn ok_json(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

async fn mount_no_closed_issues(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/test/test/issues"))
        .and(query_param("state", "closed"))
        .respond_with(ok_json(json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_tick_triages_and_closes_across_pages() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_no_closed_issues(&server).await;

    // First page of open issues links to a second one
    Mock::given(method("GET"))
        .and(path("/repos/test/test/issues"))
        .respond_with(
            ok_json(json!([issue_json(&base, 1, "bob", &[])])).insert_header(
                "link",
                format!(r#"<{}/repositories/1/issues?page=2>; rel="next""#, base).as_str(),
            ),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repositories/1/issues"))
        .and(query_param("page", "2"))
        .respond_with(ok_json(json!([issue_json(
            &base,
            2,
            "bob",
            &[REQUIRED_LABEL]
        )])))
        .expect(1)
        .mount(&server)
        .await;

    // Issue 1 is untriaged
    Mock::given(method("POST"))
        .and(path(format!("{}/labels", issue_path(1))))
        .and(body_json(json!([TRIAGE_LABEL])))
        .respond_with(ok_json(labels_json(&[TRIAGE_LABEL])))
        .expect(1)
        .mount(&server)
        .await;

    // Issue 2 has waited fifteen days without an answer
    Mock::given(method("GET"))
        .and(path(format!("{}/events", issue_path(2))))
        .respond_with(ok_json(json!([labeled_event_json(REQUIRED_LABEL, 15)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/comments", issue_path(2))))
        .respond_with(ok_json(json!([comment_json("amy", 3)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/comments", issue_path(2))))
        .and(body_json(json!({ "body": CLOSE_COMMENT })))
        .respond_with(ok_json(comment_json("issuebot", 0)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(issue_path(2)))
        .and(body_json(json!({ "state": "closed", "state_reason": "not_planned" })))
        .respond_with(ok_json(issue_json(&base, 2, "bob", &[REQUIRED_LABEL])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/labels/{}", issue_path(2), REQUIRED_LABEL)))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/labels/{}", issue_path(2), REMINDER_LABEL)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Label does not exist"})))
        .expect(1)
        .mount(&server)
        .await;
    // Closure is announced to triage, which clears its own label
    Mock::given(method("DELETE"))
        .and(path(format!("{}/labels/{}", issue_path(2), TRIAGE_LABEL)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Label does not exist"})))
        .expect(1)
        .mount(&server)
        .await;

    let monitor = build_monitor(&bot_config(&base, vec![test_repository()])).unwrap();
    let summary = monitor.monitor().await;

    assert_eq!(summary.repositories, 1);
    assert_eq!(summary.handlers_run, 2);
    assert!(summary.is_clean());
}

#[tokio::test]
async fn test_tick_reminds_and_recognises_feedback() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_no_closed_issues(&server).await;
    Mock::given(method("GET"))
        .and(path("/repos/test/test/issues"))
        .respond_with(ok_json(json!([
            issue_json(&base, 3, "bob", &[REQUIRED_LABEL]),
            issue_json(&base, 4, "bob", &[REQUIRED_LABEL, REMINDER_LABEL]),
        ])))
        .mount(&server)
        .await;

    // Issue 3: eight days, no feedback, not yet reminded
    Mock::given(method("GET"))
        .and(path(format!("{}/events", issue_path(3))))
        .respond_with(ok_json(json!([labeled_event_json(REQUIRED_LABEL, 8)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/comments", issue_path(3))))
        .respond_with(ok_json(json!([comment_json("issuebot", 1)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/comments", issue_path(3))))
        .and(body_json(json!({ "body": REMINDER_COMMENT })))
        .respond_with(ok_json(comment_json("issuebot", 0)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/labels", issue_path(3))))
        .and(body_json(json!([REMINDER_LABEL])))
        .respond_with(ok_json(labels_json(&[REQUIRED_LABEL, REMINDER_LABEL])))
        .expect(1)
        .mount(&server)
        .await;

    // Issue 4: the reporter answered after being reminded
    Mock::given(method("GET"))
        .and(path(format!("{}/events", issue_path(4))))
        .respond_with(ok_json(json!([labeled_event_json(REQUIRED_LABEL, 20)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/comments", issue_path(4))))
        .respond_with(ok_json(json!([comment_json("bob", 2)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/labels", issue_path(4))))
        .and(body_json(json!([PROVIDED_LABEL])))
        .respond_with(ok_json(labels_json(&[REQUIRED_LABEL, REMINDER_LABEL, PROVIDED_LABEL])))
        .expect(1)
        .mount(&server)
        .await;
    for label in [REQUIRED_LABEL, REMINDER_LABEL] {
        Mock::given(method("DELETE"))
            .and(path(format!("{}/labels/{}", issue_path(4), label)))
            .respond_with(ok_json(labels_json(&[PROVIDED_LABEL])))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let monitor = build_monitor(&bot_config(&base, vec![test_repository()])).unwrap();
    let summary = monitor.monitor().await;

    assert!(summary.is_clean());
}

#[tokio::test]
async fn test_failing_repository_does_not_stop_the_tick() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/broken/repo/issues"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Server Error"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_no_closed_issues(&server).await;
    Mock::given(method("GET"))
        .and(path("/repos/test/test/issues"))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let repositories = vec![Repository::new("broken", "repo"), test_repository()];
    let monitor = build_monitor(&bot_config(&base, repositories)).unwrap();
    let summary = monitor.monitor().await;

    assert_eq!(summary.repositories, 2);
    assert_eq!(summary.handlers_run, 4);
    assert_eq!(summary.handler_failures, 1);
}

#[tokio::test]
async fn test_exhausted_rate_limit_is_reported_and_recorded() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"message": "API rate limit exceeded"}))
                .insert_header("x-ratelimit-limit", "5000")
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "1700000000"),
        )
        .mount(&server)
        .await;

    let monitor = build_monitor(&bot_config(&base, vec![test_repository()])).unwrap();
    let summary = monitor.monitor().await;

    assert_eq!(summary.handler_failures, 2);
    let rate_limit = summary.rate_limit.expect("rate limit should be recorded");
    assert_eq!(rate_limit.remaining, 0);
    assert_eq!(rate_limit.limit, 5000);
}

#[tokio::test]
async fn test_closed_issue_loses_triage_label() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/test/test/issues"))
        .and(query_param("state", "closed"))
        .and(query_param("labels", TRIAGE_LABEL))
        .respond_with(ok_json(json!([issue_json(&base, 5, "bob", &[TRIAGE_LABEL])])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/test/test/issues"))
        .respond_with(ok_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/labels/{}", issue_path(5), TRIAGE_LABEL)))
        .respond_with(ok_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let monitor = build_monitor(&bot_config(&base, vec![test_repository()])).unwrap();
    let summary = monitor.monitor().await;

    assert!(summary.is_clean());
}

#[tokio::test]
async fn test_disabled_monitoring_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ok_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = bot_config(&server.uri(), vec![test_repository()]);
    config.monitoring.enabled = false;
    let summary = build_monitor(&config).unwrap().monitor().await;

    assert_eq!(summary.repositories, 0);
}
