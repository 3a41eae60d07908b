//! Blocking REST client for the workspace APIs.
//!
//! [`ApiClient`] owns the HTTP connection pool and the bearer token. Each API
//! family is exposed as a borrowed facade (`client.dbfs()`, `client.jobs()`,
//! ...) holding typed request and response records for its endpoints.
//!
//! Non-2xx responses are logged with their body and returned as
//! [`DbxError::Http`]; nothing is retried here.

pub mod clusters;
pub mod dbfs;
pub mod jobs;
pub mod libraries;
pub mod workspace;

use crate::config::WorkspaceConfig;
use crate::error::{DbxError, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use clusters::Clusters;
pub use dbfs::Dbfs;
pub use jobs::Jobs;
pub use libraries::Libraries;
pub use workspace::Workspace;

/// How a non-2xx response is logged before it is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnFailure {
    Log,
    /// The caller tolerates the failure; logged at debug only.
    Quiet,
}

/// Body of endpoints that answer `{}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Empty {}

pub struct ApiClient {
    http: Client,
    host: String,
    token: String,
}

impl ApiClient {
    pub fn new(config: &WorkspaceConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            host: config.host.clone(),
            token: config.token.clone(),
        })
    }

    /// Workspace base URL without a trailing slash.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn dbfs(&self) -> Dbfs<'_> {
        Dbfs::new(self)
    }

    pub fn workspace(&self) -> Workspace<'_> {
        Workspace::new(self)
    }

    pub fn jobs(&self) -> Jobs<'_> {
        Jobs::new(self)
    }

    pub fn libraries(&self) -> Libraries<'_> {
        Libraries::new(self)
    }

    pub fn clusters(&self) -> Clusters<'_> {
        Clusters::new(self)
    }

    pub(crate) fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let req = self.http.get(self.url(endpoint)).query(query);
        self.send("GET", endpoint, req, OnFailure::Log)
    }

    pub(crate) fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post_with(endpoint, body, OnFailure::Log)
    }

    pub(crate) fn post_with<B, T>(&self, endpoint: &str, body: &B, on_failure: OnFailure) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.http.post(self.url(endpoint)).json(body);
        self.send("POST", endpoint, req, on_failure)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.host, endpoint)
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        endpoint: &str,
        req: RequestBuilder,
        on_failure: OnFailure,
    ) -> Result<T> {
        tracing::debug!(method, endpoint, "request");
        let resp = req.bearer_auth(&self.token).send()?;
        let status = resp.status();
        let body = resp.text()?;

        if !status.is_success() {
            match on_failure {
                OnFailure::Log => tracing::error!(
                    method,
                    endpoint,
                    status = status.as_u16(),
                    body = %body,
                    "request failed"
                ),
                OnFailure::Quiet => tracing::debug!(
                    method,
                    endpoint,
                    status = status.as_u16(),
                    body = %body,
                    "non-2xx response tolerated by caller"
                ),
            }
            return Err(DbxError::Http {
                method: method.to_string(),
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        // Some endpoints answer with an empty body instead of `{}`.
        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }
}
