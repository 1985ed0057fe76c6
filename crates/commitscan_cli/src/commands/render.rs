//! Table and JSON rendering of search results.

use std::sync::Arc;

use clap::ValueEnum;
use commitscan::model::{Commit, RepoResult};
use commitscan::views::{self, CommitReport, MonthBucket};
use tabled::Tabled;

/// Width of the longest bar in the commits-per-month table.
const BAR_WIDTH: usize = 40;

/// Longest commit message shown in the commits table.
const MESSAGE_WIDTH: usize = 60;

/// Output format for search results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as formatted tables (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

#[derive(Debug, Clone, Tabled)]
pub(crate) struct CommitRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Repository")]
    pub repository: String,
    #[tabled(rename = "Commit")]
    pub commit: String,
    #[tabled(rename = "Message")]
    pub message: String,
    #[tabled(rename = "Files")]
    pub files: String,
    #[tabled(rename = "Link")]
    pub link: String,
}

impl CommitRow {
    fn new(repo: &RepoResult, commit: &Commit, host: &str) -> Self {
        let change = commit.file_change;
        Self {
            date: commit.date.format("%Y-%m-%d %H:%M").to_string(),
            repository: repo.full_name(),
            commit: commit.id.chars().take(8).collect(),
            message: first_line(&commit.message, MESSAGE_WIDTH),
            files: format!("+{} ~{} -{}", change.add, change.edit, change.delete),
            link: repo.commit_url(host, &commit.id),
        }
    }
}

#[derive(Debug, Clone, Tabled)]
pub(crate) struct MonthRow {
    #[tabled(rename = "Month")]
    pub month: String,
    #[tabled(rename = "Commits")]
    pub commits: usize,
    #[tabled(rename = "")]
    pub bar: String,
}

#[derive(Debug, Clone, Tabled)]
pub(crate) struct TopRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    #[tabled(rename = "Repository")]
    pub repository: String,
    #[tabled(rename = "Commits")]
    pub commits: usize,
}

#[derive(Debug, Clone, Tabled)]
pub(crate) struct RepoRow {
    #[tabled(rename = "Repository")]
    pub repository: String,
    #[tabled(rename = "Branch")]
    pub branch: String,
    #[tabled(rename = "Link")]
    pub link: String,
}

#[derive(Debug, Clone, Tabled)]
pub(crate) struct ErrorRow {
    #[tabled(rename = "Repository")]
    pub repository: String,
    #[tabled(rename = "Error")]
    pub error: String,
}

/// First line of `message`, cut to `width` characters.
pub(crate) fn first_line(message: &str, width: usize) -> String {
    let line = message.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= width {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// A bar proportional to `value / max`, at least one cell for non-zero values.
pub(crate) fn bar(value: usize, max: usize, width: usize) -> String {
    if value == 0 || max == 0 {
        return String::new();
    }
    let cells = (value * width).div_ceil(max).clamp(1, width);
    "█".repeat(cells)
}

pub(crate) fn summary_line(report: &CommitReport) -> String {
    let changes = report.file_changes;
    format!(
        "{} repos with {} commits (files: +{}, ~{}, -{})",
        report.repos.len(),
        report.total_commits,
        changes.add,
        changes.edit,
        changes.delete
    )
}

/// Commit rows of every repository, newest first.
pub(crate) fn commit_rows(repos: &[Arc<RepoResult>], host: &str) -> Vec<CommitRow> {
    let mut commits: Vec<(&RepoResult, &Commit)> = repos
        .iter()
        .flat_map(|repo| repo.commits.iter().map(move |c| (repo.as_ref(), c)))
        .collect();
    commits.sort_by(|a, b| b.1.date.cmp(&a.1.date));
    commits
        .into_iter()
        .map(|(repo, commit)| CommitRow::new(repo, commit, host))
        .collect()
}

pub(crate) fn month_rows(buckets: &[MonthBucket]) -> Vec<MonthRow> {
    let max = buckets.iter().map(|b| b.commits).max().unwrap_or(0);
    buckets
        .iter()
        .map(|b| MonthRow {
            month: b.label(),
            commits: b.commits,
            bar: bar(b.commits, max, BAR_WIDTH),
        })
        .collect()
}

pub(crate) fn top_rows(repos: &[Arc<RepoResult>], n: usize) -> Vec<TopRow> {
    views::top_repositories(repos, n)
        .iter()
        .filter(|r| r.has_commits())
        .enumerate()
        .map(|(i, r)| TopRow {
            rank: i + 1,
            repository: r.full_name(),
            commits: r.commits.len(),
        })
        .collect()
}

fn repo_rows(repos: &[Arc<RepoResult>], host: &str) -> Vec<RepoRow> {
    repos
        .iter()
        .map(|r| RepoRow {
            repository: r.full_name(),
            branch: r.default_branch.clone().unwrap_or_default(),
            link: r.web_url(host),
        })
        .collect()
}

fn error_rows(repos: &[Arc<RepoResult>]) -> Vec<ErrorRow> {
    repos
        .iter()
        .flat_map(|r| {
            r.errors.iter().map(|e| ErrorRow {
                repository: r.full_name(),
                error: e.clone(),
            })
        })
        .collect()
}

fn table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}

/// Render every table for a finished (or cancelled) search.
///
/// Commits, months and the top list reflect `filter`; the lists of
/// repositories without commits and with errors always cover the whole run.
pub(crate) fn render_tables(
    snapshot: &[Arc<RepoResult>],
    filter: &str,
    top: usize,
    host: &str,
) -> String {
    let filtered = views::filter(snapshot, filter);
    let report = CommitReport::new(&filtered);
    let parts = views::partition(snapshot);
    let mut out = String::new();

    out.push_str(&summary_line(&report));
    out.push_str("\n\n");

    let commits = commit_rows(&filtered, host);
    if !commits.is_empty() {
        out.push_str(&format!("Commits\n{}\n\n", table(commits)));

        let buckets = views::monthly_histogram(views::all_commits(&filtered));
        out.push_str(&format!(
            "Commits per month\n{}\n\n",
            table(month_rows(&buckets))
        ));

        out.push_str(&format!(
            "Top {} repositories\n{}\n\n",
            top,
            table(top_rows(&filtered, top))
        ));
    }

    if !parts.without_commits.is_empty() {
        out.push_str(&format!(
            "Repositories without commits ({})\n{}\n\n",
            parts.without_commits.len(),
            table(repo_rows(&parts.without_commits, host))
        ));
    }

    if !parts.with_errors.is_empty() {
        out.push_str(&format!(
            "Repositories with errors ({})\n{}\n\n",
            parts.with_errors.len(),
            table(error_rows(&parts.with_errors))
        ));
    }

    out
}

/// The JSON export of the (filtered) results.
pub(crate) fn render_json(
    snapshot: &[Arc<RepoResult>],
    filter: &str,
) -> Result<String, serde_json::Error> {
    let report = CommitReport::new(&views::filter(snapshot, filter));
    serde_json::to_string_pretty(&report)
}
