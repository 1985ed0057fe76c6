//! Progress reporting for search runs.
//!
//! Every change to the results or the counters is published as a
//! [`SearchUpdate`]: the event that caused it, a snapshot of the results and
//! the counters at that point.

use crate::model::{Counter, SearchProgress, Snapshot};

use super::types::RepoOutcome;

/// What happened just before an update was published.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SearchEvent {
    /// The run passed validation and is about to list the first project.
    Started {
        /// Number of projects to search.
        projects: usize,
    },

    /// Repositories of a project were listed.
    ReposListed {
        project: String,
        /// Number of repositories found.
        count: usize,
    },

    /// Listing a project's repositories failed; a placeholder was recorded.
    ProjectFailed { project: String, error: String },

    /// A repository was added to the results.
    RepoDiscovered { project: String, repo: String },

    /// A repository has no default branch, so no history was requested.
    MissingDefaultBranch { project: String, repo: String },

    /// A page of commits was appended.
    PageFetched {
        project: String,
        repo: String,
        /// Offset of the page.
        skip: usize,
        /// Commits on the page.
        count: usize,
    },

    /// A page request failed; no further pages are requested for the repository.
    PageFailed {
        project: String,
        repo: String,
        skip: usize,
        error: String,
    },

    /// A repository is done, for better or worse.
    RepoFinished {
        project: String,
        repo: String,
        outcome: RepoOutcome,
    },

    /// A project and all of its repositories are done.
    ProjectFinished { project: String },

    /// Cancellation was observed; no further requests will be made.
    Cancelled,

    /// Every project was processed.
    Completed {
        /// Repository results recorded, placeholders included.
        repos: usize,
        /// Commits collected across all repositories.
        commits: usize,
    },
}

/// A published view of a run in progress.
#[derive(Debug, Clone)]
pub struct SearchUpdate {
    pub event: SearchEvent,
    pub snapshot: Snapshot,
    pub progress: SearchProgress,
}

/// Callback receiving every update of a run.
pub type UpdateCallback = Box<dyn Fn(SearchUpdate) + Send + Sync>;

/// Deliver an update if a callback is provided.
#[inline]
pub fn emit(on_update: Option<&UpdateCallback>, update: SearchUpdate) {
    if let Some(cb) = on_update {
        cb(update);
    }
}

/// Progress counters of a run.
///
/// Totals only grow, currents never pass their totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressTracker {
    progress: SearchProgress,
}

impl ProgressTracker {
    pub fn new(projects: usize) -> Self {
        Self {
            progress: SearchProgress {
                projects: Counter {
                    current: 0,
                    total: projects,
                },
                repos: Counter::default(),
            },
        }
    }

    /// Account for the repositories of a freshly listed project.
    pub fn add_repos(&mut self, count: usize) {
        self.progress.repos.total += count;
    }

    pub fn finish_repo(&mut self) {
        debug_assert!(self.progress.repos.current < self.progress.repos.total);
        self.progress.repos.current += 1;
    }

    pub fn finish_project(&mut self) {
        debug_assert!(self.progress.projects.current < self.progress.projects.total);
        self.progress.projects.current += 1;
    }

    #[inline]
    #[must_use]
    pub fn progress(&self) -> SearchProgress {
        self.progress
    }
}
