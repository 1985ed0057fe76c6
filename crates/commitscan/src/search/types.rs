//! Search inputs, options, errors and per-granularity outcomes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::model::{Commit, Snapshot, SearchProgress};
use crate::platform::{ApiRepository, Credential, HostingError};

/// Number of commits requested per page.
pub const PAGE_SIZE: usize = 1000;

/// A required search field is missing. Raised before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("organization is required")]
    MissingOrganization,

    #[error("at least one project is required")]
    NoProjects,

    #[error("project names must not be blank")]
    BlankProject,

    #[error("author is required")]
    MissingAuthor,

    #[error("access token is required")]
    MissingCredential,
}

/// Errors that prevent a search from starting.
///
/// Once a run has started it never fails; failures are recorded on the
/// affected repository results instead.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search: {0}")]
    Validation(#[from] ValidationError),

    /// `start_search` was called outside a tokio runtime.
    #[error("no tokio runtime available to run the search")]
    NoRuntime,
}

/// Optional calendar-day bounds on the author date.
///
/// Both bounds are inclusive of their whole day in UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    #[must_use]
    pub const fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Start of the `from` day, 00:00:00.000 UTC.
    #[must_use]
    pub fn from_utc(&self) -> Option<DateTime<Utc>> {
        self.from
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|start| start.and_utc())
    }

    /// End of the `to` day, 23:59:59.999 UTC.
    #[must_use]
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.to
            .and_then(|day| day.and_hms_milli_opt(23, 59, 59, 999))
            .map(|end| end.and_utc())
    }
}

/// Everything needed to run one search. Immutable for the duration of a run.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub organization: String,
    /// Projects, searched in this order.
    pub projects: Vec<String>,
    /// Author filter, matched by the hosting service.
    pub author: String,
    pub date_range: DateRange,
    pub credential: Credential,
}

impl SearchRequest {
    /// Build a request, trimming fields and dropping blank project entries.
    pub fn new<I, P>(
        organization: impl Into<String>,
        projects: I,
        author: impl Into<String>,
        credential: Credential,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        Self {
            organization: organization.into().trim().to_string(),
            projects: projects
                .into_iter()
                .map(|p| p.as_ref().trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            author: author.into().trim().to_string(),
            date_range: DateRange::default(),
            credential,
        }
    }

    #[must_use]
    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    /// Check the required fields, in declaration order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.organization.trim().is_empty() {
            return Err(ValidationError::MissingOrganization);
        }
        if self.projects.iter().all(|p| p.trim().is_empty()) {
            return Err(ValidationError::NoProjects);
        }
        if self.projects.iter().any(|p| p.trim().is_empty()) {
            return Err(ValidationError::BlankProject);
        }
        if self.author.trim().is_empty() {
            return Err(ValidationError::MissingAuthor);
        }
        if self.credential.is_blank() {
            return Err(ValidationError::MissingCredential);
        }
        Ok(())
    }
}

/// Knobs that do not change what a completed search returns.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Commits per page; values below 1 are treated as 1.
    pub page_size: usize,
    /// Cooperative cancellation flag, checked before every request.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            cancel: None,
        }
    }
}

impl SearchOptions {
    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[inline]
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }
}

/// Result of listing one project's repositories.
#[derive(Debug, Clone)]
pub enum ProjectOutcome {
    Listed(Vec<ApiRepository>),
    Failed(HostingError),
}

/// Result of one page request.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Page {
        skip: usize,
        commits: Vec<Commit>,
        /// The page was shorter than requested, so history is exhausted.
        last: bool,
    },
    Failed {
        skip: usize,
        error: HostingError,
    },
}

/// How a repository's processing ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    Completed { commits: usize, pages: usize },
    NoDefaultBranch,
    /// A page request failed; commits from earlier pages were kept.
    Failed { commits: usize, error: HostingError },
    Cancelled { commits: usize },
}

/// Final state of a run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub snapshot: Snapshot,
    pub progress: SearchProgress,
    /// The run stopped early because cancellation was requested.
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SearchRequest {
        SearchRequest::new("contoso", ["shop"], "Jane Doe", Credential::new("pat"))
    }

    #[test]
    fn test_new_trims_and_drops_blank_projects() {
        let request = SearchRequest::new(
            " contoso ",
            ["shop", "", "  ", " billing "],
            " Jane ",
            Credential::new("pat"),
        );
        assert_eq!(request.organization, "contoso");
        assert_eq!(request.projects, vec!["shop", "billing"]);
        assert_eq!(request.author, "Jane");
    }

    #[test]
    fn test_validate_accepts_complete_request() {
        assert_eq!(request().validate(), Ok(()));
    }

    #[test]
    fn test_validate_reports_each_missing_field() {
        let mut r = request();
        r.organization = " ".to_string();
        assert_eq!(r.validate(), Err(ValidationError::MissingOrganization));

        let mut r = request();
        r.projects.clear();
        assert_eq!(r.validate(), Err(ValidationError::NoProjects));

        let mut r = request();
        r.projects = vec!["".to_string()];
        assert_eq!(r.validate(), Err(ValidationError::NoProjects));

        let mut r = request();
        r.projects = vec!["shop".to_string(), " ".to_string()];
        assert_eq!(r.validate(), Err(ValidationError::BlankProject));

        let mut r = request();
        r.author = String::new();
        assert_eq!(r.validate(), Err(ValidationError::MissingAuthor));

        let mut r = request();
        r.credential = Credential::default();
        assert_eq!(r.validate(), Err(ValidationError::MissingCredential));
    }

    #[test]
    fn test_date_range_covers_whole_days() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        );
        assert_eq!(
            range.from_utc().unwrap().to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
        assert_eq!(
            range
                .to_utc()
                .unwrap()
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "2024-01-31T23:59:59.999Z"
        );
    }

    #[test]
    fn test_date_range_unbounded() {
        let range = DateRange::default();
        assert_eq!(range.from_utc(), None);
        assert_eq!(range.to_utc(), None);
    }

    #[test]
    fn test_options_defaults_and_cancellation() {
        let options = SearchOptions::default();
        assert_eq!(options.page_size(), PAGE_SIZE);
        assert!(!options.is_cancelled());

        let flag = Arc::new(AtomicBool::new(false));
        let options = SearchOptions {
            page_size: 0,
            ..SearchOptions::default()
        }
        .with_cancel_flag(Arc::clone(&flag));
        assert_eq!(options.page_size(), 1);
        assert!(!options.is_cancelled());
        flag.store(true, Ordering::Release);
        assert!(options.is_cancelled());
    }

    #[test]
    fn test_validation_error_wraps_into_search_error() {
        let err: SearchError = ValidationError::MissingAuthor.into();
        assert_eq!(err.to_string(), "invalid search: author is required");
    }
}
