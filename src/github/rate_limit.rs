use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::sync::RwLock;
use tracing::warn;

use crate::github::models::RateLimit;

const HEADER_LIMIT: &str = "x-ratelimit-limit";
const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_RESET: &str = "x-ratelimit-reset";

/// Most recent rate limit snapshot reported by GitHub
///
/// Every response overwrites the snapshot. Nothing is accumulated, so a plain
/// replace under the lock is all the synchronization needed.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    snapshot: RwLock<Option<RateLimit>>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with whatever `headers` report
    ///
    /// Responses without usable headers reset the snapshot to unknown.
    pub fn record(&self, headers: &HeaderMap) -> Option<RateLimit> {
        let rate_limit = parse_headers(headers);
        if rate_limit.is_none() {
            warn!("Rate limit unavailable from response with headers {:?}", headers);
        }
        self.replace(rate_limit);
        rate_limit
    }

    pub fn replace(&self, rate_limit: Option<RateLimit>) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = rate_limit,
            Err(poisoned) => *poisoned.into_inner() = rate_limit,
        }
    }

    pub fn current(&self) -> Option<RateLimit> {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Read the `X-RateLimit-*` headers of a response
pub fn parse_headers(headers: &HeaderMap) -> Option<RateLimit> {
    let number = |name: &str| -> Option<i64> {
        headers
            .get(name)?
            .to_str()
            .ok()?
            .trim()
            .parse::<i64>()
            .ok()
    };

    let limit = u32::try_from(number(HEADER_LIMIT)?).ok()?;
    let remaining = u32::try_from(number(HEADER_REMAINING)?).ok()?;
    let reset_at = DateTime::<Utc>::from_timestamp(number(HEADER_RESET)?, 0)?;

    Some(RateLimit {
        limit,
        remaining,
        reset_at,
    })
}
