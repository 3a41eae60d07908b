use super::{ApiClient, Empty};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A library reference as the Libraries and Jobs APIs spell it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Library {
    Whl(String),
    Requirements(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallStatus {
    Pending,
    Resolving,
    Installing,
    Installed,
    Failed,
    Skipped,
    UninstallOnRestart,
    #[serde(other)]
    Unknown,
}

impl InstallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallStatus::Pending => "PENDING",
            InstallStatus::Resolving => "RESOLVING",
            InstallStatus::Installing => "INSTALLING",
            InstallStatus::Installed => "INSTALLED",
            InstallStatus::Failed => "FAILED",
            InstallStatus::Skipped => "SKIPPED",
            InstallStatus::UninstallOnRestart => "UNINSTALL_ON_RESTART",
            InstallStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status entry from `cluster-status`. The library is kept as raw JSON since
/// clusters report kinds (maven, cran, jar) this tool never installs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LibraryFullStatus {
    pub library: serde_json::Value,
    pub status: InstallStatus,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl LibraryFullStatus {
    pub fn refers_to(&self, library: &Library) -> bool {
        serde_json::to_value(library).is_ok_and(|v| v == self.library)
    }
}

#[derive(Debug, Deserialize)]
struct ClusterStatusResponse {
    #[serde(default)]
    library_statuses: Vec<LibraryFullStatus>,
}

#[derive(Debug, Serialize)]
struct InstallRequest<'a> {
    cluster_id: &'a str,
    libraries: &'a [Library],
}

/// Libraries API 2.0.
pub struct Libraries<'a> {
    client: &'a ApiClient,
}

impl<'a> Libraries<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn install(&self, cluster_id: &str, libraries: &[Library]) -> Result<()> {
        let _: Empty = self.client.post(
            "/api/2.0/libraries/install",
            &InstallRequest {
                cluster_id,
                libraries,
            },
        )?;
        Ok(())
    }

    pub fn cluster_status(&self, cluster_id: &str) -> Result<Vec<LibraryFullStatus>> {
        let resp: ClusterStatusResponse = self.client.get(
            "/api/2.0/libraries/cluster-status",
            &[("cluster_id", cluster_id)],
        )?;
        Ok(resp.library_statuses)
    }
}
