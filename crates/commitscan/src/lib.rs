//! Commitscan - find every commit an author made across Azure DevOps projects.
//!
//! The library walks the projects of an organization, the repositories of each
//! project and the paginated history of each repository's default branch,
//! collecting the commits of one author. Failures are isolated per project,
//! repository and page, so a run always produces a (possibly partial) result.
//!
//! # Features
//!
//! - `devops` (default) - Azure DevOps REST client ([`devops::DevOpsClient`])
//!   and the reqwest-backed HTTP transport.
//!
//! # Example
//!
//! ```ignore
//! use commitscan::devops::DevOpsClient;
//! use commitscan::platform::Credential;
//! use commitscan::search::{SearchOptions, SearchRequest, run_search};
//! use commitscan::views;
//!
//! let client = DevOpsClient::new(commitscan::devops::DEVOPS_HOST)?;
//! let request = SearchRequest::new("contoso", ["shop", "billing"], "jane@contoso.com",
//!     Credential::new(token));
//! let outcome = run_search(&client, &request, &SearchOptions::default(), None).await?;
//!
//! for bucket in views::monthly_histogram(views::all_commits(&outcome.snapshot)) {
//!     println!("{}: {}", bucket.label(), bucket.commits);
//! }
//! ```

pub mod http;
pub mod model;
pub mod platform;
pub mod search;
pub mod views;

#[cfg(feature = "devops")]
pub mod devops;

pub use model::{Commit, Counter, FileChange, RepoResult, SearchProgress, Snapshot};
pub use platform::{ApiRateLimiter, Credential, HostingApi, HostingError, RateLimitedApi};
pub use search::{
    DateRange, SearchError, SearchEvent, SearchOptions, SearchOutcome, SearchRequest,
    SearchUpdate, ValidationError, run_search, start_search,
};
