//! GitHub integration: the [`Gateway`] contract, its REST implementation and
//! the value types both sides exchange.

pub mod client;
pub mod error;
pub mod gateway;
pub mod link;
pub mod models;
pub mod page;
pub mod rate_limit;

pub use client::GitHubClient;
pub use error::{GitHubError, Result};
pub use gateway::Gateway;
pub use models::*;
pub use page::{Page, PageFuture};
pub use rate_limit::RateLimitTracker;

#[cfg(test)]
pub use gateway::MockGateway;
