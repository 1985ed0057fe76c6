//! Azure DevOps REST response shapes.
//!
//! Only the fields the search needs are declared, which keeps deserialization
//! resilient to API additions.
//!
//! API docs: https://learn.microsoft.com/rest/api/azure/devops/git/

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::platform::{ApiCommit, ApiRepository, ChangeCounts};

/// The `{ "count": n, "value": [...] }` envelope used by list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub value: Vec<T>,
}

/// A git repository.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevOpsRepository {
    pub name: String,
    /// Full ref, e.g. `refs/heads/main`. Absent for empty repositories.
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Author or committer of a commit.
#[derive(Debug, Clone, Deserialize)]
pub struct DevOpsGitUser {
    pub date: DateTime<Utc>,
}

/// File change counters keyed by change type.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DevOpsChangeCounts {
    #[serde(rename = "Add")]
    pub add: Option<u64>,
    #[serde(rename = "Edit")]
    pub edit: Option<u64>,
    #[serde(rename = "Delete")]
    pub delete: Option<u64>,
}

/// A commit reference as returned by the commits search.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevOpsCommit {
    pub commit_id: String,
    #[serde(default)]
    pub comment: String,
    pub author: DevOpsGitUser,
    #[serde(default)]
    pub change_counts: Option<DevOpsChangeCounts>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct DevOpsErrorBody {
    pub message: Option<String>,
}

impl From<DevOpsRepository> for ApiRepository {
    fn from(repo: DevOpsRepository) -> Self {
        Self {
            name: repo.name,
            default_branch: repo.default_branch,
        }
    }
}

impl From<DevOpsCommit> for ApiCommit {
    fn from(commit: DevOpsCommit) -> Self {
        let counts = commit.change_counts.unwrap_or_default();
        Self {
            commit_id: commit.commit_id,
            comment: commit.comment,
            author_date: commit.author.date,
            change_counts: ChangeCounts {
                add: counts.add,
                edit: counts.edit,
                delete: counts.delete,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_without_default_branch() {
        let json = r#"{ "id": "1", "name": "empty-repo", "size": 0 }"#;
        let repo: DevOpsRepository = serde_json::from_str(json).unwrap();
        let repo: ApiRepository = repo.into();
        assert_eq!(repo.name, "empty-repo");
        assert_eq!(repo.default_branch, None);
    }

    #[test]
    fn test_commit_with_partial_change_counts() {
        let json = r#"{
            "commitId": "a1b2c3",
            "comment": "Fix build",
            "author": { "name": "Jane", "email": "jane@contoso.com", "date": "2024-01-15T08:30:00Z" },
            "changeCounts": { "Edit": 3 }
        }"#;
        let commit: DevOpsCommit = serde_json::from_str(json).unwrap();
        let commit: ApiCommit = commit.into();
        assert_eq!(commit.commit_id, "a1b2c3");
        assert_eq!(commit.change_counts.add, None);
        assert_eq!(commit.change_counts.edit, Some(3));
        assert_eq!(commit.author_date.to_rfc3339(), "2024-01-15T08:30:00+00:00");
    }

    #[test]
    fn test_commit_without_change_counts() {
        let json = r#"{
            "commitId": "ffff",
            "author": { "date": "2024-02-01T00:00:00Z" }
        }"#;
        let commit: ApiCommit = serde_json::from_str::<DevOpsCommit>(json).unwrap().into();
        assert_eq!(commit.comment, "");
        assert_eq!(commit.change_counts, ChangeCounts::default());
    }

    #[test]
    fn test_list_envelope() {
        let json = r#"{ "count": 1, "value": [ { "name": "api", "defaultBranch": "refs/heads/main" } ] }"#;
        let list: ListResponse<DevOpsRepository> = serde_json::from_str(json).unwrap();
        assert_eq!(list.value.len(), 1);
        assert_eq!(list.value[0].default_branch.as_deref(), Some("refs/heads/main"));
    }
}
