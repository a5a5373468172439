use async_trait::async_trait;
use futures::FutureExt;
use reqwest::header::{ACCEPT, LINK};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::github::error::{GitHubError, Result};
use crate::github::gateway::Gateway;
use crate::github::link::next_link;
use crate::github::models::{ClosureReason, Comment, Event, Issue, Label, RateLimit};
use crate::github::page::{Page, PageFuture};
use crate::github::rate_limit::RateLimitTracker;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const LABEL_NAME_TEMPLATE: &str = "{/name}";

/// GitHub REST API client authenticating with a single static credential
///
/// Cloning is cheap; clones share the HTTP connection pool and the rate limit
/// snapshot.
#[derive(Clone)]
pub struct GitHubClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: String,
    rate_limit: RateLimitTracker,
}

impl GitHubClient {
    /// Create a new GitHub client with a custom base URL (for GitHub Enterprise or testing)
    pub fn with_base_url(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("issuebot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: parse_url(base_url.trim_end_matches('/'))?,
                username: username.to_string(),
                password: password.to_string(),
                rate_limit: RateLimitTracker::new(),
            }),
        })
    }

    /// Build a repo-scoped URL
    fn repo_url(&self, organization: &str, repository: &str, path: &str) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| invalid_url(self.inner.base_url.as_str(), "cannot be a base"))?
            .pop_if_empty()
            .extend(["repos", organization, repository, path]);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner
            .http
            .request(method, url)
            .basic_auth(&self.inner.username, Some(&self.inner.password))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Send a request, recording the rate limit reported by the response
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        self.inner.rate_limit.record(response.headers());
        Ok(response)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.execute(request).await?;
        self.check_response(response).await
    }

    /// Check response status and return error if not successful
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // An exhausted quota is reported as 403 (or 429) with nothing remaining
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(rate_limit) = self.inner.rate_limit.current() {
                if rate_limit.remaining == 0 {
                    return Err(GitHubError::RateLimitExceeded {
                        reset_at: rate_limit.reset_at,
                    });
                }
            }
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("message")?.as_str().map(str::to_string))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    format!("HTTP {}", status.as_u16())
                } else {
                    body
                }
            });

        Err(GitHubError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetch the page at `url` and wire up a continuation for its `next` link
    fn fetch_page<T>(&self, url: String) -> PageFuture<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        async move {
            if url.trim().is_empty() {
                return Ok(None);
            }
            let url = parse_url(&url)?;
            debug!("Fetching {}", url);

            let response = client.send(client.request(Method::GET, url)).await?;
            let next = next_link(response.headers().get(LINK).and_then(|v| v.to_str().ok()));
            let items: Vec<T> = read_json(response).await?;

            let page = match next {
                Some(next_url) => {
                    let client = client.clone();
                    Page::new(items, move || client.fetch_page(next_url))
                }
                None => Page::last(items),
            };
            Ok(Some(page))
        }
        .boxed()
    }
}

#[async_trait]
impl Gateway for GitHubClient {
    async fn get_open_issues(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<Option<Page<Issue>>> {
        let url = self.repo_url(organization, repository, "issues")?;
        self.fetch_page(url.to_string()).await
    }

    async fn get_closed_issues_with_label(
        &self,
        organization: &str,
        repository: &str,
        label: &str,
    ) -> Result<Option<Page<Issue>>> {
        let mut url = self.repo_url(organization, repository, "issues")?;
        url.query_pairs_mut()
            .append_pair("state", "closed")
            .append_pair("labels", label);
        self.fetch_page(url.to_string()).await
    }

    async fn get_comments(&self, issue: &Issue) -> Result<Option<Page<Comment>>> {
        self.fetch_page(issue.comments_url.clone()).await
    }

    async fn get_events(&self, issue: &Issue) -> Result<Option<Page<Event>>> {
        self.fetch_page(issue.events_url.clone()).await
    }

    async fn add_label(&self, issue: &Issue, label: &str) -> Result<Issue> {
        let url = labels_url(&issue.labels_url, None)?;
        info!("Adding label {} to {}", label, url);

        let response = self
            .send(self.request(Method::POST, url).json(&[label]))
            .await?;
        let labels: Vec<Label> = read_json(response).await?;
        Ok(issue.with_labels(labels))
    }

    async fn remove_label(&self, issue: &Issue, label: &str) -> Result<Issue> {
        let url = labels_url(&issue.labels_url, Some(label))?;
        info!("Removing label {} from {}", label, url);

        let response = self.execute(self.request(Method::DELETE, url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Label {} was not present on {}", label, issue);
            let remaining = issue
                .labels
                .iter()
                .filter(|existing| existing.name != label)
                .cloned()
                .collect();
            return Ok(issue.with_labels(remaining));
        }

        let response = self.check_response(response).await?;
        let labels: Vec<Label> = read_json(response).await?;
        Ok(issue.with_labels(labels))
    }

    async fn add_comment(&self, issue: &Issue, body: &str) -> Result<Comment> {
        let url = parse_url(&issue.comments_url)?;
        info!("Commenting on {}", issue);

        let response = self
            .send(
                self.request(Method::POST, url)
                    .json(&serde_json::json!({ "body": body })),
            )
            .await?;
        read_json(response).await
    }

    async fn close(&self, issue: &Issue, reason: Option<ClosureReason>) -> Result<Issue> {
        let url = parse_url(&issue.url)?;
        info!("Closing {}", issue);

        let mut body = serde_json::json!({ "state": "closed" });
        if let Some(reason) = reason {
            body["state_reason"] = serde_json::Value::from(reason.as_str());
        }

        let response = self
            .send(self.request(Method::PATCH, url).json(&body))
            .await?;
        read_json(response).await
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        self.inner.rate_limit.current()
    }
}

/// Expand an issue's `labels_url` template, optionally addressing one label
fn labels_url(template: &str, name: Option<&str>) -> Result<Url> {
    let mut url = parse_url(&template.replace(LABEL_NAME_TEMPLATE, ""))?;
    if let Some(name) = name {
        url.path_segments_mut()
            .map_err(|_| invalid_url(template, "cannot be a base"))?
            .push(name);
    }
    Ok(url)
}

/// Decode a JSON body, logging the raw payload when it does not match `T`
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| {
        let target = std::any::type_name::<T>();
        error!("Failed to create {} from {}", target, body);
        GitHubError::Parse { target, source }
    })
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| invalid_url(url, &e.to_string()))
}

fn invalid_url(url: &str, reason: &str) -> GitHubError {
    GitHubError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
