use commitscan::search::{RepoOutcome, SearchEvent, SearchUpdate};

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, update: &SearchUpdate) {
        let progress = update.progress;
        match &update.event {
            SearchEvent::Started { projects } => {
                tracing::info!(projects, "Searching projects");
            }

            SearchEvent::ReposListed { project, count } => {
                tracing::info!(project = %project, count, "Listed repositories");
            }

            SearchEvent::ProjectFailed { project, error } => {
                tracing::warn!(project = %project, error = %error, "Failed to list repositories");
            }

            SearchEvent::RepoDiscovered { project, repo } => {
                tracing::debug!(repo = %format!("{}/{}", project, repo), "Searching repository");
            }

            SearchEvent::MissingDefaultBranch { project, repo } => {
                tracing::info!(repo = %format!("{}/{}", project, repo), "No default branch, skipped");
            }

            SearchEvent::PageFetched {
                project,
                repo,
                skip,
                count,
            } => {
                tracing::debug!(repo = %format!("{}/{}", project, repo), skip, count, "Fetched page");
            }

            SearchEvent::PageFailed {
                project,
                repo,
                skip,
                error,
            } => {
                tracing::warn!(repo = %format!("{}/{}", project, repo), skip, error = %error, "Failed to fetch page");
            }

            SearchEvent::RepoFinished {
                project,
                repo,
                outcome,
            } => {
                let repo = format!("{}/{}", project, repo);
                match outcome {
                    RepoOutcome::Completed { commits, pages } => {
                        tracing::info!(
                            repo = %repo,
                            commits,
                            pages,
                            done = progress.repos.current,
                            total = progress.repos.total,
                            "Repository searched"
                        );
                    }
                    RepoOutcome::Failed { commits, .. } => {
                        tracing::info!(repo = %repo, commits, "Repository searched with errors");
                    }
                    _ => {}
                }
            }

            SearchEvent::ProjectFinished { project } => {
                tracing::debug!(
                    project = %project,
                    done = progress.projects.current,
                    total = progress.projects.total,
                    "Project finished"
                );
            }

            SearchEvent::Cancelled => {
                tracing::warn!(
                    repos = update.snapshot.len(),
                    "Search cancelled, showing partial results"
                );
            }

            SearchEvent::Completed { repos, commits } => {
                tracing::info!(repos, commits, "Search complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
