//! Hosting-service seam used by the search engine.
//!
//! The engine only needs two operations from a hosting service: listing the
//! repositories of a project and fetching one page of a repository's commit
//! history. [`HostingApi`] captures exactly that, so the engine can be driven
//! by the Azure DevOps client in production and by in-memory fakes in tests.
//!
//! # Example
//!
//! ```ignore
//! use commitscan::platform::{HostingApi, RepoListQuery};
//!
//! async fn names<A: HostingApi>(api: &A, query: &RepoListQuery<'_>) -> Vec<String> {
//!     match api.list_repositories(query).await {
//!         Ok(repos) => repos.into_iter().map(|r| r.name).collect(),
//!         Err(_) => Vec::new(),
//!     }
//! }
//! ```

mod errors;
mod rate_limit;
mod types;

pub use errors::{HostingError, Result};
pub use rate_limit::{ApiRateLimiter, DEVOPS_DEFAULT_RPS, RateLimitedApi};
pub use types::{
    ApiCommit, ApiRepository, BRANCH_REF_PREFIX, ChangeCounts, CommitQuery, Credential,
    HostingApi, RepoListQuery,
};
