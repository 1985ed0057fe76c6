//! Commit search over the projects of one organization.
//!
//! [`run_search`] walks projects, their repositories and each repository's
//! paginated commit history for a single author, isolating failures per
//! project, repository and page. [`start_search`] runs the same walk on a
//! background task and streams [`SearchUpdate`]s over a channel.

mod engine;
mod fetch;
mod progress;
mod types;

pub use engine::{run_search, start_search};
pub use fetch::{CommitPager, FetchedHistory, fetch_all_commits};
pub use progress::{ProgressTracker, SearchEvent, SearchUpdate, UpdateCallback, emit};
pub use types::{
    DateRange, PAGE_SIZE, PageOutcome, ProjectOutcome, RepoOutcome, SearchError, SearchOptions,
    SearchOutcome, SearchRequest, ValidationError,
};
