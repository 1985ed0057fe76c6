use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use super::errors::Result;
use super::types::{ApiCommit, ApiRepository, CommitQuery, HostingApi, RepoListQuery};

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default pacing for Azure DevOps requests (requests per second).
pub const DEVOPS_DEFAULT_RPS: u32 = 10;

/// A standalone request pacer using the governor crate.
///
/// ```ignore
/// let limiter = ApiRateLimiter::new(10);
/// limiter.wait().await;
/// api.list_commits(&query).await?;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Create a limiter allowing `requests_per_second` (0 is treated as 1).
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            inner: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
        }
    }

    /// Wait until another request is allowed.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

/// Wraps a [`HostingApi`] so every call waits for the limiter first.
///
/// Pacing only delays requests; ordering and error semantics are unchanged.
#[derive(Clone)]
pub struct RateLimitedApi<A> {
    inner: A,
    limiter: ApiRateLimiter,
}

impl<A> RateLimitedApi<A> {
    pub fn new(inner: A, requests_per_second: u32) -> Self {
        Self::with_limiter(inner, ApiRateLimiter::new(requests_per_second))
    }

    pub fn with_limiter(inner: A, limiter: ApiRateLimiter) -> Self {
        Self { inner, limiter }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: HostingApi> HostingApi for RateLimitedApi<A> {
    async fn list_repositories(&self, query: &RepoListQuery<'_>) -> Result<Vec<ApiRepository>> {
        self.limiter.wait().await;
        self.inner.list_repositories(query).await
    }

    async fn list_commits(&self, query: &CommitQuery<'_>) -> Result<Vec<ApiCommit>> {
        self.limiter.wait().await;
        self.inner.list_commits(query).await
    }
}
