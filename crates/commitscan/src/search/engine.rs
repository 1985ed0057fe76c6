//! Search orchestration.
//!
//! A run walks its projects in order, the repositories of each project in the
//! order the service lists them, and the commit pages of each repository in
//! offset order. One request is in flight at a time. Failures are contained at
//! the granularity they occur at:
//!
//! - a project whose repositories cannot be listed becomes a single
//!   placeholder result named `Unknown` carrying the error;
//! - a repository without a default branch is recorded with an error and no
//!   history is requested;
//! - a failed page ends that repository's walk, keeping earlier pages.
//!
//! After every change a [`SearchUpdate`] is published carrying a fresh
//! [`Snapshot`]. Results live behind `Arc` and are modified with
//! `Arc::make_mut`, so a snapshot is a shallow copy and a repository is only
//! cloned while a consumer still holds an older snapshot of it.
//!
//! # Example
//!
//! ```ignore
//! use commitscan::search::{SearchOptions, SearchRequest, run_search};
//!
//! let request = SearchRequest::new("contoso", ["shop"], "jane@contoso.com", credential);
//! let outcome = run_search(&client, &request, &SearchOptions::default(), None).await?;
//! println!("{} repositories", outcome.snapshot.len());
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use super::fetch::CommitPager;
use super::progress::{ProgressTracker, SearchEvent, SearchUpdate, UpdateCallback, emit};
use super::types::{
    PageOutcome, ProjectOutcome, RepoOutcome, SearchError, SearchOptions, SearchOutcome,
    SearchRequest,
};
use crate::model::{NO_DEFAULT_BRANCH, RepoResult, Snapshot};
use crate::platform::{ApiRepository, CommitQuery, HostingApi, RepoListQuery};

/// Run a search to completion (or cancellation).
///
/// Returns a validation error, without touching `api`, when a required field
/// is missing. Otherwise the run always produces an outcome: hosting failures
/// end up in the affected results' error lists.
#[tracing::instrument(
    skip_all,
    fields(organization = %request.organization, project_count = request.projects.len())
)]
pub async fn run_search<A: HostingApi + ?Sized>(
    api: &A,
    request: &SearchRequest,
    options: &SearchOptions,
    on_update: Option<&UpdateCallback>,
) -> Result<SearchOutcome, SearchError> {
    request.validate()?;

    let mut run = SearchRun::new(request, options, on_update);
    run.execute(api).await;
    Ok(run.finish())
}

/// Validate a request and run it on a background task.
///
/// Updates arrive on the returned channel in publication order; the channel
/// closes once the run has published its final update. Dropping the receiver
/// does not stop the run; use [`SearchOptions::cancel`] for that.
pub fn start_search<A>(
    api: Arc<A>,
    request: SearchRequest,
    options: SearchOptions,
) -> Result<mpsc::UnboundedReceiver<SearchUpdate>, SearchError>
where
    A: HostingApi + ?Sized + 'static,
{
    request.validate()?;
    let handle = tokio::runtime::Handle::try_current().map_err(|_| SearchError::NoRuntime)?;

    let (tx, rx) = mpsc::unbounded_channel();
    handle.spawn(async move {
        let callback: UpdateCallback = Box::new(move |update| {
            if tx.send(update).is_err() {
                tracing::trace!("Search update receiver dropped");
            }
        });

        if let Err(e) = run_search(api.as_ref(), &request, &options, Some(&callback)).await {
            tracing::error!(error = %e, "Background search failed to start");
        }
    });

    Ok(rx)
}

/// State of one run.
struct SearchRun<'r> {
    request: &'r SearchRequest,
    options: &'r SearchOptions,
    on_update: Option<&'r UpdateCallback>,
    results: Vec<Arc<RepoResult>>,
    tracker: ProgressTracker,
    version: u64,
    cancelled: bool,
}

impl<'r> SearchRun<'r> {
    fn new(
        request: &'r SearchRequest,
        options: &'r SearchOptions,
        on_update: Option<&'r UpdateCallback>,
    ) -> Self {
        Self {
            request,
            options,
            on_update,
            results: Vec::new(),
            tracker: ProgressTracker::new(request.projects.len()),
            version: 0,
            cancelled: false,
        }
    }

    async fn execute<A: HostingApi + ?Sized>(&mut self, api: &A) {
        let request = self.request;
        self.publish(SearchEvent::Started {
            projects: request.projects.len(),
        });

        for project in &request.projects {
            if self.check_cancelled() {
                break;
            }
            self.process_project(api, project).await;
        }

        if self.cancelled {
            tracing::info!(repos = self.results.len(), "Search cancelled");
            self.publish(SearchEvent::Cancelled);
        } else {
            let commits: usize = self.results.iter().map(|r| r.commits.len()).sum();
            tracing::info!(repos = self.results.len(), commits, "Search complete");
            self.publish(SearchEvent::Completed {
                repos: self.results.len(),
                commits,
            });
        }
    }

    async fn process_project<A: HostingApi + ?Sized>(&mut self, api: &A, project: &'r str) {
        match self.list_project(api, project).await {
            ProjectOutcome::Listed(repos) => {
                tracing::debug!(project, count = repos.len(), "Listed repositories");
                self.tracker.add_repos(repos.len());
                self.publish(SearchEvent::ReposListed {
                    project: project.to_string(),
                    count: repos.len(),
                });

                for repo in repos {
                    if self.check_cancelled() {
                        return;
                    }
                    self.process_repo(api, project, repo).await;
                }
                if self.cancelled {
                    return;
                }
            }
            ProjectOutcome::Failed(error) => {
                let message = error.to_string();
                tracing::warn!(project, error = %message, "Failed to list repositories");
                self.results.push(Arc::new(RepoResult::unknown(
                    self.request.organization.as_str(),
                    project,
                    message.clone(),
                )));
                self.publish(SearchEvent::ProjectFailed {
                    project: project.to_string(),
                    error: message,
                });
            }
        }

        self.tracker.finish_project();
        tracing::info!(project, "Project searched");
        self.publish(SearchEvent::ProjectFinished {
            project: project.to_string(),
        });
    }

    async fn list_project<A: HostingApi + ?Sized>(
        &self,
        api: &A,
        project: &str,
    ) -> ProjectOutcome {
        let query = RepoListQuery {
            organization: &self.request.organization,
            project,
            credential: &self.request.credential,
        };
        match api.list_repositories(&query).await {
            Ok(repos) => ProjectOutcome::Listed(repos),
            Err(error) => ProjectOutcome::Failed(error),
        }
    }

    async fn process_repo<A: HostingApi + ?Sized>(
        &mut self,
        api: &A,
        project: &'r str,
        repo: ApiRepository,
    ) {
        let branch = repo.branch_name();
        let index = self.results.len();
        self.results.push(Arc::new(RepoResult::new(
            repo.name.as_str(),
            self.request.organization.as_str(),
            project,
            branch.clone(),
        )));
        self.publish(SearchEvent::RepoDiscovered {
            project: project.to_string(),
            repo: repo.name.clone(),
        });

        let outcome = match branch {
            Some(branch) => {
                self.fetch_history(api, project, index, &repo.name, &branch)
                    .await
            }
            None => {
                tracing::warn!(project, repo = %repo.name, "Repository has no default branch");
                self.repo_mut(index).errors.push(NO_DEFAULT_BRANCH.to_string());
                self.publish(SearchEvent::MissingDefaultBranch {
                    project: project.to_string(),
                    repo: repo.name.clone(),
                });
                RepoOutcome::NoDefaultBranch
            }
        };

        self.tracker.finish_repo();
        self.publish(SearchEvent::RepoFinished {
            project: project.to_string(),
            repo: repo.name,
            outcome,
        });
    }

    async fn fetch_history<A: HostingApi + ?Sized>(
        &mut self,
        api: &A,
        project: &str,
        index: usize,
        repo: &str,
        branch: &str,
    ) -> RepoOutcome {
        let request = self.request;
        let query = CommitQuery {
            organization: &request.organization,
            project,
            repository: repo,
            author: &request.author,
            branch,
            skip: 0,
            top: self.options.page_size(),
            from: request.date_range.from_utc(),
            to: request.date_range.to_utc(),
            credential: &request.credential,
        };
        let mut pager = CommitPager::new(query, self.options.page_size());
        let mut pages = 0;

        loop {
            if pager.is_finished() {
                break;
            }
            if self.check_cancelled() {
                return RepoOutcome::Cancelled {
                    commits: self.results[index].commits.len(),
                };
            }
            let Some(outcome) = pager.next_page(api).await else {
                break;
            };

            match outcome {
                PageOutcome::Page { skip, commits, .. } => {
                    let count = commits.len();
                    pages += 1;
                    self.repo_mut(index).commits.extend(commits);
                    tracing::debug!(project, repo, skip, count, "Fetched commit page");
                    self.publish(SearchEvent::PageFetched {
                        project: project.to_string(),
                        repo: repo.to_string(),
                        skip,
                        count,
                    });
                }
                PageOutcome::Failed { skip, error } => {
                    let message = error.to_string();
                    tracing::warn!(project, repo, skip, error = %message, "Failed to fetch commit page");
                    self.repo_mut(index).errors.push(message.clone());
                    self.publish(SearchEvent::PageFailed {
                        project: project.to_string(),
                        repo: repo.to_string(),
                        skip,
                        error: message,
                    });
                    return RepoOutcome::Failed {
                        commits: self.results[index].commits.len(),
                        error,
                    };
                }
            }
        }

        RepoOutcome::Completed {
            commits: self.results[index].commits.len(),
            pages,
        }
    }

    fn repo_mut(&mut self, index: usize) -> &mut RepoResult {
        Arc::make_mut(&mut self.results[index])
    }

    fn check_cancelled(&mut self) -> bool {
        if !self.cancelled && self.options.is_cancelled() {
            tracing::debug!("Cancellation requested");
            self.cancelled = true;
        }
        self.cancelled
    }

    fn publish(&mut self, event: SearchEvent) {
        self.version += 1;
        if self.on_update.is_some() {
            emit(
                self.on_update,
                SearchUpdate {
                    event,
                    snapshot: Snapshot::new(self.version, &self.results),
                    progress: self.tracker.progress(),
                },
            );
        }
    }

    fn finish(self) -> SearchOutcome {
        SearchOutcome {
            snapshot: Snapshot::new(self.version, &self.results),
            progress: self.tracker.progress(),
            cancelled: self.cancelled,
        }
    }
}
