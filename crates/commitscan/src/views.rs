//! Pure views over a search snapshot.
//!
//! None of these functions touch the network or modify their input; they can
//! be recomputed from any [`Snapshot`](crate::model::Snapshot) at any time.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::model::{Commit, FileChange, RepoResult};

/// Default number of entries in a top-repositories view.
pub const DEFAULT_TOP_N: usize = 10;

/// Narrow results to a free-text query.
///
/// A repository whose name contains the query (ignoring case) is kept whole.
/// Any other repository keeps only the commits whose message contains the
/// query (ignoring case) or whose id contains the lower-cased query, and is
/// dropped when none match. An empty query returns the input unchanged.
pub fn filter(repos: &[Arc<RepoResult>], query: &str) -> Vec<Arc<RepoResult>> {
    if query.is_empty() {
        return repos.to_vec();
    }

    let needle = query.to_lowercase();
    repos
        .iter()
        .filter_map(|repo| {
            if repo.name.to_lowercase().contains(&needle) {
                return Some(Arc::clone(repo));
            }

            let matching: Vec<Commit> = repo
                .commits
                .iter()
                .filter(|c| commit_matches(c, &needle))
                .cloned()
                .collect();
            if matching.is_empty() {
                return None;
            }
            if matching.len() == repo.commits.len() {
                return Some(Arc::clone(repo));
            }

            Some(Arc::new(RepoResult {
                commits: matching,
                ..RepoResult::clone(repo)
            }))
        })
        .collect()
}

fn commit_matches(commit: &Commit, needle: &str) -> bool {
    commit.id.contains(needle) || commit.message.to_lowercase().contains(needle)
}

/// Every commit of the given repositories, in result order.
pub fn all_commits(repos: &[Arc<RepoResult>]) -> impl Iterator<Item = &Commit> {
    repos.iter().flat_map(|repo| repo.commits.iter())
}

/// Number of commits in one calendar month (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
    pub commits: usize,
}

impl MonthBucket {
    /// `YYYY-M`, month without zero padding.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}-{}", self.year, self.month)
    }
}

/// Commits per month, in calendar order.
pub fn monthly_histogram<'a>(commits: impl IntoIterator<Item = &'a Commit>) -> Vec<MonthBucket> {
    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for commit in commits {
        *counts
            .entry((commit.date.year(), commit.date.month()))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((year, month), commits)| MonthBucket {
            year,
            month,
            commits,
        })
        .collect()
}

/// The `n` repositories with the most commits.
///
/// Ties keep their input order.
pub fn top_repositories(repos: &[Arc<RepoResult>], n: usize) -> Vec<Arc<RepoResult>> {
    let mut ranked = repos.to_vec();
    ranked.sort_by(|a, b| b.commits.len().cmp(&a.commits.len()));
    ranked.truncate(n);
    ranked
}

/// Added, edited and deleted file counts summed over `commits`.
pub fn file_change_totals<'a>(commits: impl IntoIterator<Item = &'a Commit>) -> FileChange {
    commits.into_iter().map(|c| c.file_change).sum()
}

/// Results grouped by what they contain.
///
/// A repository with both commits and errors is listed in both
/// `with_commits` and `with_errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub with_commits: Vec<Arc<RepoResult>>,
    /// Neither commits nor errors.
    pub without_commits: Vec<Arc<RepoResult>>,
    pub with_errors: Vec<Arc<RepoResult>>,
}

pub fn partition(repos: &[Arc<RepoResult>]) -> Partition {
    let mut parts = Partition::default();
    for repo in repos {
        if repo.has_commits() {
            parts.with_commits.push(Arc::clone(repo));
        } else if !repo.has_errors() {
            parts.without_commits.push(Arc::clone(repo));
        }
        if repo.has_errors() {
            parts.with_errors.push(Arc::clone(repo));
        }
    }
    parts
}

/// Exported summary of the repositories that have commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub file_changes: FileChange,
    pub total_commits: usize,
    pub repos: Vec<RepoResult>,
}

impl CommitReport {
    /// Build the report from (typically already filtered) results; only
    /// repositories with commits are included.
    pub fn new(repos: &[Arc<RepoResult>]) -> Self {
        let repos: Vec<RepoResult> = repos
            .iter()
            .filter(|r| r.has_commits())
            .map(|r| RepoResult::clone(r))
            .collect();
        let commits = || repos.iter().flat_map(|r| r.commits.iter());

        Self {
            file_changes: file_change_totals(commits()),
            total_commits: commits().count(),
            repos,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn commit(id: &str, message: &str, (y, m, d): (i32, u32, u32)) -> Commit {
        Commit {
            id: id.to_string(),
            message: message.to_string(),
            date: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            file_change: FileChange::default(),
        }
    }

    fn repo(name: &str, commits: Vec<Commit>) -> Arc<RepoResult> {
        Arc::new(RepoResult {
            commits,
            ..RepoResult::new(name, "contoso", "shop", Some("main".to_string()))
        })
    }

    fn repo_with_count(name: &str, count: usize) -> Arc<RepoResult> {
        repo(
            name,
            (0..count)
                .map(|i| commit(&format!("{name}{i}"), "", (2024, 1, 1)))
                .collect(),
        )
    }

    fn sample() -> Vec<Arc<RepoResult>> {
        vec![
            repo(
                "Billing-API",
                vec![commit("aa11", "Initial import", (2024, 1, 1))],
            ),
            repo(
                "web",
                vec![
                    commit("bb22", "Fix BILLING rounding", (2024, 1, 2)),
                    commit("cc33", "Update readme", (2024, 1, 3)),
                ],
            ),
            repo("docs", vec![commit("dd44", "Typos", (2024, 1, 4))]),
        ]
    }

    #[test]
    fn test_filter_empty_query_is_identity() {
        let repos = sample();
        assert_eq!(filter(&repos, ""), repos);
    }

    #[test]
    fn test_filter_keeps_matching_repo_names_whole() {
        let filtered = filter(&sample(), "billing");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].name, "Billing-API");
        assert_eq!(filtered[0].commits.len(), 1);
        assert_eq!(filtered[1].name, "web");
        assert_eq!(filtered[1].commits.len(), 1);
        assert_eq!(filtered[1].commits[0].id, "bb22");
    }

    #[test]
    fn test_filter_matches_commit_ids_with_lowercased_query() {
        let filtered = filter(&sample(), "CC3");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].commits[0].id, "cc33");
    }

    #[test]
    fn test_filter_drops_repos_without_matches() {
        assert!(filter(&sample(), "nothing-matches").is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let repos = sample();
        for query in ["", "billing", "readme", "dd", "zzz"] {
            let once = filter(&repos, query);
            assert_eq!(filter(&once, query), once, "query {query:?}");
        }
    }

    #[test]
    fn test_filter_does_not_modify_input() {
        let repos = sample();
        let _ = filter(&repos, "readme");
        assert_eq!(repos[1].commits.len(), 2);
    }

    #[test]
    fn test_monthly_histogram_sorted_by_calendar() {
        let commits = [
            commit("3", "", (2024, 2, 1)),
            commit("1", "", (2024, 1, 15)),
            commit("2", "", (2024, 1, 20)),
            commit("0", "", (2023, 12, 31)),
        ];
        let buckets = monthly_histogram(&commits);
        let labels: Vec<(String, usize)> =
            buckets.iter().map(|b| (b.label(), b.commits)).collect();
        assert_eq!(
            labels,
            vec![
                ("2023-12".to_string(), 1),
                ("2024-1".to_string(), 2),
                ("2024-2".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_monthly_histogram_of_nothing_is_empty() {
        assert!(monthly_histogram(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_top_repositories_stable_and_truncated() {
        let mut repos = vec![
            repo_with_count("five-a", 5),
            repo_with_count("five-b", 5),
            repo_with_count("ten", 10),
            repo_with_count("one", 1),
        ];
        repos.extend((0..14).map(|i| repo_with_count(&format!("r{i}"), i % 3)));

        let top = top_repositories(&repos, DEFAULT_TOP_N);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].name, "ten");
        assert_eq!(top[1].name, "five-a");
        assert_eq!(top[2].name, "five-b");
        assert!(Arc::ptr_eq(&top[0], &repos[2]));
    }

    #[test]
    fn test_top_repositories_with_fewer_than_n() {
        let repos = vec![repo_with_count("a", 1)];
        assert_eq!(top_repositories(&repos, 10).len(), 1);
        assert!(top_repositories(&repos, 0).is_empty());
    }

    #[test]
    fn test_file_change_totals() {
        let mut a = commit("a", "", (2024, 1, 1));
        a.file_change = FileChange::new(1, 0, 0);
        let mut b = commit("b", "", (2024, 1, 1));
        b.file_change = FileChange::new(0, 2, 1);
        assert_eq!(file_change_totals(&[a, b]), FileChange::new(1, 2, 1));
    }

    #[test]
    fn test_partition_overlaps_commits_and_errors() {
        let mut both = RepoResult::clone(&repo_with_count("both", 2));
        both.errors.push("500: boom".to_string());
        let mut failed = RepoResult::new("failed", "contoso", "shop", None);
        failed.errors.push("No default branch found".to_string());
        let repos = vec![
            repo_with_count("commits", 1),
            Arc::new(both),
            repo_with_count("empty", 0),
            Arc::new(failed),
        ];

        let parts = partition(&repos);
        let names = |v: &[Arc<RepoResult>]| v.iter().map(|r| r.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&parts.with_commits), vec!["commits", "both"]);
        assert_eq!(names(&parts.without_commits), vec!["empty"]);
        assert_eq!(names(&parts.with_errors), vec!["both", "failed"]);
    }

    #[test]
    fn test_commit_report_skips_repos_without_commits() {
        let mut first = commit("a", "", (2024, 1, 1));
        first.file_change = FileChange::new(2, 1, 0);
        let repos = vec![repo("api", vec![first]), repo_with_count("empty", 0)];

        let report = CommitReport::new(&repos);
        assert_eq!(report.total_commits, 1);
        assert_eq!(report.repos.len(), 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalCommits"], 1);
        assert_eq!(json["fileChanges"]["add"], 2);
        assert_eq!(json["repos"][0]["name"], "api");
    }

    #[test]
    fn test_all_commits_flattens_in_order() {
        let repos = sample();
        let ids: Vec<&str> = all_commits(&repos).map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["aa11", "bb22", "cc33", "dd44"]);
    }
}
