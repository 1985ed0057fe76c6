//! Core data model shared by the search engine and the derived views.
//!
//! A search produces one [`RepoResult`] per discovered repository. Results are
//! held behind `Arc` so that publishing a [`Snapshot`] is a shallow copy: the
//! engine mutates its own copy with `Arc::make_mut`, which clones a repository
//! only when a consumer still holds an older snapshot of it.

use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Name given to the placeholder result of a project whose repository list
/// could not be retrieved.
pub const UNKNOWN_REPO_NAME: &str = "Unknown";

/// Default branch recorded on the placeholder result of a failed project.
pub const UNKNOWN_BRANCH: &str = "unknown";

/// Error recorded on a repository that reports no default branch.
pub const NO_DEFAULT_BRANCH: &str = "No default branch found";

/// Number of files added, edited and deleted by a commit (or a set of commits).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileChange {
    pub add: u64,
    pub edit: u64,
    pub delete: u64,
}

impl FileChange {
    #[must_use]
    pub const fn new(add: u64, edit: u64, delete: u64) -> Self {
        Self { add, edit, delete }
    }
}

impl std::ops::Add for FileChange {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            add: self.add + rhs.add,
            edit: self.edit + rhs.edit,
            delete: self.delete + rhs.delete,
        }
    }
}

impl std::ops::AddAssign for FileChange {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for FileChange {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, change| acc + change)
    }
}

/// A single commit authored by the searched user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub id: String,
    pub message: String,
    /// Author date, in UTC.
    pub date: DateTime<Utc>,
    pub file_change: FileChange,
}

/// Everything found for one repository.
///
/// Commits and errors are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoResult {
    pub name: String,
    pub org: String,
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    pub commits: Vec<Commit>,
    pub errors: Vec<String>,
}

impl RepoResult {
    /// A freshly discovered repository with nothing fetched yet.
    pub fn new(
        name: impl Into<String>,
        org: impl Into<String>,
        project: impl Into<String>,
        default_branch: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            org: org.into(),
            project: project.into(),
            default_branch,
            commits: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Placeholder standing in for a project whose repositories could not be listed.
    pub fn unknown(org: impl Into<String>, project: impl Into<String>, error: String) -> Self {
        Self {
            name: UNKNOWN_REPO_NAME.to_string(),
            org: org.into(),
            project: project.into(),
            default_branch: Some(UNKNOWN_BRANCH.to_string()),
            commits: Vec::new(),
            errors: vec![error],
        }
    }

    #[inline]
    #[must_use]
    pub fn has_commits(&self) -> bool {
        !self.commits.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `project/name`, unique within one organization except for placeholders.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.project, self.name)
    }

    /// Browser link to the repository on the hosting service.
    #[must_use]
    pub fn web_url(&self, host: &str) -> String {
        self.link(host, &[])
    }

    /// Browser link to one commit of this repository.
    #[must_use]
    pub fn commit_url(&self, host: &str, commit_id: &str) -> String {
        self.link(host, &["commit", commit_id])
    }

    /// `{host}/{org}/{project}/_git/{name}/{rest..}` with every segment
    /// percent-encoded.
    fn link(&self, host: &str, rest: &[&str]) -> String {
        let host = host.trim_end_matches('/');
        let Ok(mut url) = Url::parse(host) else {
            return self.raw_link(host, rest);
        };
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments
                    .pop_if_empty()
                    .push(&self.org)
                    .push(&self.project)
                    .push("_git")
                    .push(&self.name)
                    .extend(rest);
            }
            Err(()) => return self.raw_link(host, rest),
        }
        url.into()
    }

    // Hosts that are not base URLs get the segments appended verbatim.
    fn raw_link(&self, host: &str, rest: &[&str]) -> String {
        let mut link = format!("{}/{}/{}/_git/{}", host, self.org, self.project, self.name);
        for segment in rest {
            link.push('/');
            link.push_str(segment);
        }
        link
    }
}

/// Work done versus work planned for one level of the traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub current: usize,
    pub total: usize,
}

impl Counter {
    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.current == self.total
    }
}

/// Progress of a search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProgress {
    pub projects: Counter,
    pub repos: Counter,
}

impl SearchProgress {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.projects.is_done() && self.repos.is_done()
    }
}

/// An immutable view of the results produced so far.
///
/// Dereferences to the ordered list of repository results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    version: u64,
    repos: Arc<[Arc<RepoResult>]>,
}

impl Snapshot {
    pub(crate) fn new(version: u64, repos: &[Arc<RepoResult>]) -> Self {
        Self {
            version,
            repos: repos.into(),
        }
    }

    /// Increases by one for every snapshot published during a run.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn repos(&self) -> &[Arc<RepoResult>] {
        &self.repos
    }
}

impl Deref for Snapshot {
    type Target = [Arc<RepoResult>];

    fn deref(&self) -> &Self::Target {
        &self.repos
    }
}
