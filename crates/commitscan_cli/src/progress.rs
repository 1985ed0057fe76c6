//! Progress reporting for search runs.
//!
//! This module provides two modes of progress reporting:
//! - Interactive mode (TTY): Animated progress bars using indicatif
//! - Logging mode (non-TTY): Structured logging using tracing
//!
//! Progress bars are organized as:
//! - Projects bar: projects searched out of projects requested
//! - Repos bar: repositories searched out of repositories discovered so far

mod interactive;
mod logging;

use commitscan::search::SearchUpdate;
use console::Term;

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    /// Handle a search update.
    pub fn handle(&self, update: &SearchUpdate) {
        match self {
            Self::Interactive(r) => r.handle(update),
            Self::Logging(r) => r.handle(update),
        }
    }

    /// Finish all progress bars (interactive mode only).
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use commitscan::model::{SearchProgress, Snapshot};
    use commitscan::search::SearchEvent;

    use super::*;

    #[test]
    fn test_logging_reporter_handles_every_stage() {
        let reporter = ProgressReporter::Logging(LoggingReporter::new());
        for event in [
            SearchEvent::Started { projects: 1 },
            SearchEvent::ProjectFailed {
                project: "shop".to_string(),
                error: "401: denied".to_string(),
            },
            SearchEvent::ProjectFinished {
                project: "shop".to_string(),
            },
            SearchEvent::Completed {
                repos: 1,
                commits: 0,
            },
        ] {
            reporter.handle(&SearchUpdate {
                event,
                snapshot: Snapshot::default(),
                progress: SearchProgress::default(),
            });
        }
        reporter.finish();
    }
}
