//! Azure DevOps REST client.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use url::Url;

use super::error::DevOpsError;
use super::types::{DevOpsCommit, DevOpsErrorBody, DevOpsRepository, ListResponse};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpTransport};
use crate::platform::{
    self, ApiCommit, ApiRepository, CommitQuery, Credential, HostingApi, RepoListQuery,
};

/// Default Azure DevOps Services host.
pub const DEVOPS_HOST: &str = "https://dev.azure.com";

/// REST API version sent with every request.
pub const API_VERSION: &str = "7.0";

/// Request timeout for the reqwest transport.
const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

const SIGN_IN_PAGE: &str = "received a sign-in page instead of JSON; check the access token";

/// Azure DevOps API client.
///
/// Works against Azure DevOps Services and, by passing the collection URL as
/// host, against on-premise Azure DevOps Server.
#[derive(Clone)]
pub struct DevOpsClient {
    transport: Arc<dyn HttpTransport>,
    base: Url,
    host: String,
}

impl DevOpsClient {
    /// Create a client for `host` using a reqwest transport.
    ///
    /// ```ignore
    /// let client = DevOpsClient::new(DEVOPS_HOST)?;
    /// let client = DevOpsClient::new("https://tfs.contoso.com/tfs/DefaultCollection")?;
    /// ```
    pub fn new(host: &str) -> Result<Self, DevOpsError> {
        let transport = ReqwestTransport::with_timeout(REQUEST_TIMEOUT)?;
        Self::new_with_transport(host, Arc::new(transport))
    }

    pub fn new_with_transport(
        host: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, DevOpsError> {
        let host = host.trim_end_matches('/').to_string();
        let base = Url::parse(&host)
            .map_err(|e| DevOpsError::Config(format!("invalid host '{host}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(DevOpsError::Config(format!(
                "host '{host}' cannot be used as a base URL"
            )));
        }
        Ok(Self {
            transport,
            base,
            host,
        })
    }

    /// Get the host URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// `{host}/{org}/{project}/_apis/git/repositories/...`
    fn git_url(&self, organization: &str, project: &str, rest: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(organization)
                .push(project)
                .extend(["_apis", "git", "repositories"])
                .extend(rest);
        }
        url
    }

    pub(crate) fn repositories_url(&self, query: &RepoListQuery<'_>) -> String {
        let mut url = self.git_url(query.organization, query.project, &[]);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        url.into()
    }

    pub(crate) fn commits_url(&self, query: &CommitQuery<'_>) -> String {
        let mut url = self.git_url(
            query.organization,
            query.project,
            &[query.repository, "commits"],
        );
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("searchCriteria.author", query.author)
                .append_pair("searchCriteria.$top", &query.top.to_string())
                .append_pair("searchCriteria.$skip", &query.skip.to_string())
                .append_pair("searchCriteria.itemVersion.version", query.branch);
            if let Some(from) = query.from {
                pairs.append_pair("searchCriteria.fromDate", &iso_instant(from));
            }
            if let Some(to) = query.to {
                pairs.append_pair("searchCriteria.toDate", &iso_instant(to));
            }
            pairs.append_pair("api-version", API_VERSION);
        }
        url.into()
    }

    /// Make an authenticated GET request and decode the JSON body.
    async fn get<T: DeserializeOwned>(
        &self,
        url: String,
        credential: &Credential,
    ) -> Result<T, DevOpsError> {
        tracing::trace!(url = %url, "GET");

        let request = HttpRequest::get(url)
            .header("Accept", "application/json")
            .header("Authorization", basic_auth(credential));

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let message = serde_json::from_slice::<DevOpsErrorBody>(&response.body)
                .ok()
                .and_then(|body| body.message);
            return Err(DevOpsError::Api {
                status: response.status,
                message,
            });
        }

        // A rejected token is answered with 203 and an HTML sign-in page.
        if response.status == 203
            || response
                .content_type()
                .is_some_and(|ct| !ct.contains("json"))
        {
            return Err(DevOpsError::Api {
                status: response.status,
                message: Some(SIGN_IN_PAGE.to_string()),
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }

    /// List the git repositories of a project.
    pub async fn repositories(
        &self,
        query: &RepoListQuery<'_>,
    ) -> Result<Vec<DevOpsRepository>, DevOpsError> {
        let list: ListResponse<DevOpsRepository> = self
            .get(self.repositories_url(query), query.credential)
            .await?;
        Ok(list.value)
    }

    /// Fetch one page of commits of a repository.
    pub async fn commits(&self, query: &CommitQuery<'_>) -> Result<Vec<DevOpsCommit>, DevOpsError> {
        let list: ListResponse<DevOpsCommit> =
            self.get(self.commits_url(query), query.credential).await?;
        Ok(list.value)
    }
}

#[async_trait]
impl HostingApi for DevOpsClient {
    async fn list_repositories(
        &self,
        query: &RepoListQuery<'_>,
    ) -> platform::Result<Vec<ApiRepository>> {
        let repos = self.repositories(query).await?;
        Ok(repos.into_iter().map(ApiRepository::from).collect())
    }

    async fn list_commits(&self, query: &CommitQuery<'_>) -> platform::Result<Vec<ApiCommit>> {
        let commits = self.commits(query).await?;
        Ok(commits.into_iter().map(ApiCommit::from).collect())
    }
}

/// `Basic base64(":<token>")`, the PAT scheme Azure DevOps expects.
fn basic_auth(credential: &Credential) -> String {
    format!("Basic {}", BASE64.encode(format!(":{}", credential.expose())))
}

/// ISO-8601 instant with millisecond precision and a `Z` suffix.
fn iso_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
