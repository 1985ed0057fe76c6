use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::Result;

/// Prefix of branch refs as reported by the hosting service.
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Personal access token used to authenticate against the hosting service.
///
/// `Debug` never prints the token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building authentication headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// A repository as listed by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRepository {
    pub name: String,
    /// Raw default branch ref, e.g. `refs/heads/main`.
    pub default_branch: Option<String>,
}

impl ApiRepository {
    /// Branch name with the `refs/heads/` prefix removed.
    ///
    /// Refs without the prefix are returned as-is; missing or empty refs
    /// yield `None`.
    #[must_use]
    pub fn branch_name(&self) -> Option<String> {
        let raw = self.default_branch.as_deref()?.trim();
        let name = raw.strip_prefix(BRANCH_REF_PREFIX).unwrap_or(raw);
        (!name.is_empty()).then(|| name.to_string())
    }
}

/// Per-commit file change counters; the service may omit any of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeCounts {
    pub add: Option<u64>,
    pub edit: Option<u64>,
    pub delete: Option<u64>,
}

/// A commit entry from one page of history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCommit {
    pub commit_id: String,
    pub comment: String,
    pub author_date: DateTime<Utc>,
    pub change_counts: ChangeCounts,
}

/// Parameters for listing the repositories of one project.
#[derive(Debug, Clone, Copy)]
pub struct RepoListQuery<'a> {
    pub organization: &'a str,
    pub project: &'a str,
    pub credential: &'a Credential,
}

/// Parameters for one page of a repository's commit history.
#[derive(Debug, Clone, Copy)]
pub struct CommitQuery<'a> {
    pub organization: &'a str,
    pub project: &'a str,
    pub repository: &'a str,
    pub author: &'a str,
    /// Branch name, without the `refs/heads/` prefix.
    pub branch: &'a str,
    pub skip: usize,
    pub top: usize,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub credential: &'a Credential,
}

/// The two operations the search engine needs from a hosting service.
///
/// Implementations should convert their own failures to
/// [`HostingError`](super::HostingError) and must not retry on their own; the engine treats
/// every returned error as final for its granularity.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// List the repositories of a project, in the service's order.
    async fn list_repositories(&self, query: &RepoListQuery<'_>) -> Result<Vec<ApiRepository>>;

    /// Fetch one page of commits matching the query.
    async fn list_commits(&self, query: &CommitQuery<'_>) -> Result<Vec<ApiCommit>>;
}

#[async_trait]
impl<T: HostingApi + ?Sized> HostingApi for std::sync::Arc<T> {
    async fn list_repositories(&self, query: &RepoListQuery<'_>) -> Result<Vec<ApiRepository>> {
        (**self).list_repositories(query).await
    }

    async fn list_commits(&self, query: &CommitQuery<'_>) -> Result<Vec<ApiCommit>> {
        (**self).list_commits(query).await
    }
}
