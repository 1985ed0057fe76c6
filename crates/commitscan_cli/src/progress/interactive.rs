use std::sync::Mutex;

use commitscan::search::{SearchEvent, SearchUpdate};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Consolidated progress state to avoid multiple mutex locks.
#[derive(Default)]
struct ProgressState {
    /// Projects processed out of projects requested.
    projects_bar: Option<ProgressBar>,
    /// Repositories processed out of repositories discovered so far.
    repos_bar: Option<ProgressBar>,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    fn create_bars(&self, state: &mut ProgressState, projects: usize) {
        let projects_bar = self.multi.add(ProgressBar::new(projects as u64));
        projects_bar.set_style(Self::bar_style());
        projects_bar.set_prefix(format!("{:12}", "Projects"));
        projects_bar.set_message("Listing repositories...");

        // Total is unknown until the first project is listed
        let repos_bar = self.multi.add(ProgressBar::new_spinner());
        repos_bar.set_style(Self::counter_style());
        repos_bar.set_prefix(format!("{:12}", "Repos"));
        repos_bar.enable_steady_tick(std::time::Duration::from_millis(100));

        state.projects_bar = Some(projects_bar);
        state.repos_bar = Some(repos_bar);
    }

    pub fn handle(&self, update: &SearchUpdate) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if let SearchEvent::Started { projects } = update.event {
            self.create_bars(&mut state, projects);
        }

        let progress = update.progress;
        if let Some(ref pb) = state.projects_bar {
            pb.set_position(progress.projects.current as u64);
        }
        if let Some(ref pb) = state.repos_bar
            && progress.repos.total > 0
        {
            if pb.length() != Some(progress.repos.total as u64) {
                pb.set_length(progress.repos.total as u64);
                pb.set_style(Self::bar_style());
                pb.disable_steady_tick();
            }
            pb.set_position(progress.repos.current as u64);
        }

        match &update.event {
            SearchEvent::ReposListed { project, count } => {
                if let Some(ref pb) = state.projects_bar {
                    pb.set_message(format!("{} ({} repos)", project, count));
                }
            }

            SearchEvent::RepoDiscovered { project, repo } => {
                if let Some(ref pb) = state.repos_bar {
                    pb.set_message(format!("{}/{}", project, repo));
                }
            }

            SearchEvent::PageFetched { project, repo, .. } => {
                let commits = update.snapshot.last().map_or(0, |r| r.commits.len());
                if let Some(ref pb) = state.repos_bar {
                    pb.set_message(format!("{}/{} - {} commits", project, repo, commits));
                }
            }

            SearchEvent::ProjectFailed { project, error } => {
                drop(state);
                self.multi
                    .println(format!("⚠ {}: {}", project, error))
                    .ok();
            }

            SearchEvent::MissingDefaultBranch { project, repo } => {
                drop(state);
                self.multi
                    .println(format!("· {}/{}: no default branch", project, repo))
                    .ok();
            }

            SearchEvent::PageFailed {
                project,
                repo,
                skip,
                error,
            } => {
                drop(state);
                self.multi
                    .println(format!("⚠ {}/{} (skip {}): {}", project, repo, skip, error))
                    .ok();
            }

            SearchEvent::Completed { repos, commits } => {
                if let Some(ref pb) = state.projects_bar {
                    pb.finish_with_message("✓ done");
                }
                if let Some(ref pb) = state.repos_bar {
                    pb.finish_with_message(format!("✓ {} commits in {} repos", commits, repos));
                }
            }

            SearchEvent::Cancelled => {
                if let Some(ref pb) = state.projects_bar {
                    pb.abandon_with_message("✗ cancelled");
                }
                if let Some(ref pb) = state.repos_bar {
                    pb.abandon_with_message("✗ cancelled");
                }
            }

            _ => {}
        }
    }

    pub fn finish(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        for pb in [&state.projects_bar, &state.repos_bar].into_iter().flatten() {
            if !pb.is_finished() {
                pb.finish();
            }
        }
    }

    fn counter_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {pos:>4} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
