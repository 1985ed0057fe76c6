//! Paginated retrieval of one repository's commit history.

use crate::model::{Commit, FileChange};
use crate::platform::{ApiCommit, CommitQuery, HostingApi, HostingError};

use super::types::PageOutcome;

impl From<ApiCommit> for Commit {
    fn from(commit: ApiCommit) -> Self {
        let counts = commit.change_counts;
        Self {
            id: commit.commit_id,
            message: commit.comment,
            date: commit.author_date,
            file_change: FileChange::new(
                counts.add.unwrap_or(0),
                counts.edit.unwrap_or(0),
                counts.delete.unwrap_or(0),
            ),
        }
    }
}

/// Walks a repository's history one page at a time.
///
/// Page `k` is requested with `skip = k * page_size`. The walk ends after the
/// first page shorter than `page_size` (including an empty one) or after the
/// first failed request; a failed page is never retried.
#[derive(Debug, Clone)]
pub struct CommitPager<'a> {
    query: CommitQuery<'a>,
    page_size: usize,
    next_skip: usize,
    finished: bool,
}

impl<'a> CommitPager<'a> {
    /// `skip` and `top` of the template query are ignored.
    pub fn new(query: CommitQuery<'a>, page_size: usize) -> Self {
        Self {
            query,
            page_size: page_size.max(1),
            next_skip: 0,
            finished: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Offset the next request will use.
    #[inline]
    #[must_use]
    pub fn next_skip(&self) -> usize {
        self.next_skip
    }

    /// Request the next page, or `None` once the walk is over.
    pub async fn next_page<A: HostingApi + ?Sized>(&mut self, api: &A) -> Option<PageOutcome> {
        if self.finished {
            return None;
        }

        let skip = self.next_skip;
        let query = CommitQuery {
            skip,
            top: self.page_size,
            ..self.query
        };

        match api.list_commits(&query).await {
            Ok(page) => {
                let last = page.len() < self.page_size;
                self.finished = last;
                self.next_skip += self.page_size;
                Some(PageOutcome::Page {
                    skip,
                    commits: page.into_iter().map(Commit::from).collect(),
                    last,
                })
            }
            Err(error) => {
                self.finished = true;
                Some(PageOutcome::Failed { skip, error })
            }
        }
    }
}

/// Everything a full walk produced.
#[derive(Debug, Clone, Default)]
pub struct FetchedHistory {
    pub commits: Vec<Commit>,
    /// Successful page requests.
    pub pages: usize,
    /// The failure that ended the walk early, if any.
    pub error: Option<HostingError>,
}

/// Walk a repository's whole history without intermediate reporting.
pub async fn fetch_all_commits<A: HostingApi + ?Sized>(
    api: &A,
    query: CommitQuery<'_>,
    page_size: usize,
) -> FetchedHistory {
    let mut pager = CommitPager::new(query, page_size);
    let mut history = FetchedHistory::default();

    while let Some(outcome) = pager.next_page(api).await {
        match outcome {
            PageOutcome::Page { commits, .. } => {
                history.pages += 1;
                history.commits.extend(commits);
            }
            PageOutcome::Failed { error, .. } => history.error = Some(error),
        }
    }

    history
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::platform::{ApiRepository, ChangeCounts, Credential, RepoListQuery, Result};

    /// Serves `total` commits, optionally failing at one offset.
    struct HistoryApi {
        total: usize,
        fail_at: Option<usize>,
        skips: Mutex<Vec<(usize, usize)>>,
    }

    impl HistoryApi {
        fn new(total: usize) -> Self {
            Self {
                total,
                fail_at: None,
                skips: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(usize, usize)> {
            self.skips.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HostingApi for HistoryApi {
        async fn list_repositories(
            &self,
            _query: &RepoListQuery<'_>,
        ) -> Result<Vec<ApiRepository>> {
            Ok(Vec::new())
        }

        async fn list_commits(&self, query: &CommitQuery<'_>) -> Result<Vec<ApiCommit>> {
            self.skips.lock().unwrap().push((query.skip, query.top));
            if self.fail_at == Some(query.skip) {
                return Err(HostingError::http(500, Some("boom".to_string())));
            }
            let end = (query.skip + query.top).min(self.total);
            Ok((query.skip.min(end)..end).map(api_commit).collect())
        }
    }

    fn api_commit(i: usize) -> ApiCommit {
        ApiCommit {
            commit_id: format!("c{i}"),
            comment: String::new(),
            author_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            change_counts: ChangeCounts {
                add: Some(1),
                edit: None,
                delete: None,
            },
        }
    }

    fn query(credential: &Credential) -> CommitQuery<'_> {
        CommitQuery {
            organization: "contoso",
            project: "shop",
            repository: "api",
            author: "jane",
            branch: "main",
            skip: 123,
            top: 7,
            from: None,
            to: None,
            credential,
        }
    }

    #[test]
    fn test_commit_from_api_defaults_missing_counts_to_zero() {
        let commit = Commit::from(api_commit(4));
        assert_eq!(commit.id, "c4");
        assert_eq!(commit.file_change, FileChange::new(1, 0, 0));
    }

    #[tokio::test]
    async fn test_pager_stops_after_short_page() {
        let api = HistoryApi::new(2500);
        let credential = Credential::new("pat");
        let history = fetch_all_commits(&api, query(&credential), 1000).await;

        assert_eq!(history.commits.len(), 2500);
        assert_eq!(history.pages, 3);
        assert!(history.error.is_none());
        assert_eq!(api.requests(), vec![(0, 1000), (1000, 1000), (2000, 1000)]);
    }

    #[tokio::test]
    async fn test_pager_requests_empty_page_after_exact_multiple() {
        let api = HistoryApi::new(1000);
        let credential = Credential::new("pat");
        let history = fetch_all_commits(&api, query(&credential), 1000).await;

        assert_eq!(history.commits.len(), 1000);
        assert_eq!(api.requests(), vec![(0, 1000), (1000, 1000)]);
    }

    #[tokio::test]
    async fn test_pager_stops_at_first_failure_and_keeps_earlier_pages() {
        let api = HistoryApi {
            fail_at: Some(20),
            ..HistoryApi::new(100)
        };
        let credential = Credential::new("pat");
        let history = fetch_all_commits(&api, query(&credential), 10).await;

        assert_eq!(history.commits.len(), 20);
        assert_eq!(history.pages, 2);
        assert_eq!(history.error.map(|e| e.to_string()).as_deref(), Some("500: boom"));
        assert_eq!(api.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_pager_reports_progress_per_page() {
        let api = HistoryApi::new(15);
        let credential = Credential::new("pat");
        let mut pager = CommitPager::new(query(&credential), 10);

        assert_eq!(pager.next_skip(), 0);
        match pager.next_page(&api).await {
            Some(PageOutcome::Page { skip, commits, last }) => {
                assert_eq!(skip, 0);
                assert_eq!(commits.len(), 10);
                assert!(!last);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        match pager.next_page(&api).await {
            Some(PageOutcome::Page { skip, commits, last }) => {
                assert_eq!(skip, 10);
                assert_eq!(commits.len(), 5);
                assert!(last);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(pager.is_finished());
        assert!(pager.next_page(&api).await.is_none());
        assert_eq!(api.requests().len(), 2);
    }
}
