//! Transport seam for the REST client.
//!
//! The Azure DevOps client only issues authenticated GETs, so the boundary is
//! a single `send` taking a URL plus headers. Tests swap in [`MockTransport`].

use async_trait::async_trait;
use thiserror::Error;

/// Header name/value pairs; lookups ignore ASCII case.
pub type HttpHeaders = Vec<(String, String)>;

/// An HTTP GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HttpHeaders,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `Content-Type` header, if the server sent one.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        header_get(&self.headers, "content-type")
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("no mock response registered for GET {url}")]
    NoMockResponse { url: String },
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// First value of header `name`, ignoring ASCII case.
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(feature = "devops")]
pub mod reqwest_transport {
    use std::time::Duration as StdDuration;

    use super::*;

    const USER_AGENT: &str = concat!("commitscan/", env!("CARGO_PKG_VERSION"));

    /// Transport backed by a shared reqwest client.
    #[derive(Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        /// Build a client whose requests give up after `timeout`.
        pub fn with_timeout(timeout: StdDuration) -> Result<Self, HttpError> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| HttpError::Transport(e.to_string()))?;
            Ok(Self { client })
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let mut builder = self.client.get(&request.url);
            for (k, v) in &request.headers {
                builder = builder.header(k.as_str(), v.as_str());
            }

            let resp = builder
                .send()
                .await
                .map_err(|e| HttpError::Transport(e.to_string()))?;

            let status = resp.status().as_u16();
            let headers: HttpHeaders = resp
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    let value = value.to_str().ok()?;
                    Some((name.as_str().to_string(), value.to_string()))
                })
                .collect();

            let body = resp
                .bytes()
                .await
                .map_err(|e| HttpError::Transport(e.to_string()))?
                .to_vec();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

#[cfg(test)]
pub(crate) use mock::MockTransport;

#[cfg(test)]
mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Canned responses keyed by URL, served first-in first-out.
    #[derive(Clone, Default)]
    pub(crate) struct MockTransport {
        inner: Arc<Mutex<Inner>>,
    }

    #[derive(Default)]
    struct Inner {
        routes: HashMap<String, VecDeque<HttpResponse>>,
        requests: Vec<HttpRequest>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn push_response(&self, url: impl Into<String>, response: HttpResponse) {
            let mut inner = self.inner.lock().expect("mock lock");
            inner
                .routes
                .entry(url.into())
                .or_default()
                .push_back(response);
        }

        pub(crate) fn requests(&self) -> Vec<HttpRequest> {
            self.inner.lock().expect("mock lock").requests.clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let mut inner = self.inner.lock().expect("mock lock");
            let url = request.url.clone();
            inner.requests.push(request);

            inner
                .routes
                .get_mut(&url)
                .and_then(VecDeque::pop_front)
                .ok_or(HttpError::NoMockResponse { url })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_appends_headers_in_order() {
        let req = HttpRequest::get("https://dev.azure.com/contoso")
            .header("Accept", "application/json")
            .header("Authorization", "Basic OnBhdA==");
        assert_eq!(req.url, "https://dev.azure.com/contoso");
        assert_eq!(header_get(&req.headers, "ACCEPT"), Some("application/json"));
        assert_eq!(req.headers[1].0, "Authorization");
    }

    #[test]
    fn content_type_is_case_insensitive() {
        let resp = HttpResponse {
            status: 203,
            headers: vec![("content-TYPE".to_string(), "text/html".to_string())],
            body: Vec::new(),
        };
        assert!(resp.is_success());
        assert_eq!(resp.content_type(), Some("text/html"));
    }

    #[tokio::test]
    async fn mock_transport_serves_queued_responses_then_errors() {
        let transport = MockTransport::new();
        let url = "https://dev.azure.com/contoso/shop/_apis/git/repositories";
        for status in [500, 200] {
            transport.push_response(
                url,
                HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: Vec::new(),
                },
            );
        }

        let req = HttpRequest::get(url);
        assert_eq!(transport.send(req.clone()).await.unwrap().status, 500);
        assert_eq!(transport.send(req.clone()).await.unwrap().status, 200);
        let err = transport.send(req).await.unwrap_err();
        assert!(matches!(err, HttpError::NoMockResponse { .. }));
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    #[cfg(feature = "devops")]
    async fn reqwest_transport_reports_invalid_url_as_transport_error() {
        let transport = reqwest_transport::ReqwestTransport::with_timeout(
            std::time::Duration::from_secs(1),
        )
        .unwrap();
        let err = transport
            .send(HttpRequest::get("not a url"))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Transport(_)));
    }
}
