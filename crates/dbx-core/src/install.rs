//! Library installation on a cluster, with a bounded status poll.
//!
//! ```text
//! Submitted ──► Polling(1..=max_attempts) ──► Installed
//!                      │                  ├──► Failed (FAILED | SKIPPED)
//!                      └──────────────────┴──► TimedOut
//! ```
//!
//! Every poll is preceded by one `interval` wait. There is no cancellation:
//! a pending library consumes the whole budget.

use serde::Serialize;

use crate::api::libraries::{InstallStatus, Library, LibraryFullStatus};
use crate::api::ApiClient;
use crate::config::InstallPolicy;
use crate::error::{DbxError, Result};
use crate::paths::DbfsPath;

/// Terminal state of one poll run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Installed { attempts: u32 },
    Failed {
        status: InstallStatus,
        messages: Vec<String>,
    },
    TimedOut { attempts: u32 },
}

/// Poll `probe` until it reports a terminal status or the budget runs out.
/// A `None` from the probe means the library is not listed yet.
pub fn poll_install<F>(policy: &InstallPolicy, mut probe: F) -> Result<PollOutcome>
where
    F: FnMut() -> Result<Option<LibraryFullStatus>>,
{
    for attempt in 1..=policy.max_attempts {
        if !policy.interval.is_zero() {
            std::thread::sleep(policy.interval);
        }
        let Some(entry) = probe()? else {
            tracing::info!(attempt, "library not listed on cluster yet");
            continue;
        };
        match entry.status {
            InstallStatus::Installed => return Ok(PollOutcome::Installed { attempts: attempt }),
            InstallStatus::Failed | InstallStatus::Skipped => {
                return Ok(PollOutcome::Failed {
                    status: entry.status,
                    messages: entry.messages,
                })
            }
            status => tracing::info!(attempt, %status, "waiting for library install"),
        }
    }
    Ok(PollOutcome::TimedOut {
        attempts: policy.max_attempts,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub cluster_id: String,
    pub library: String,
    pub attempts: u32,
}

pub struct Installer<'a> {
    client: &'a ApiClient,
    policy: InstallPolicy,
}

impl<'a> Installer<'a> {
    pub fn new(client: &'a ApiClient, policy: InstallPolicy) -> Self {
        Self { client, policy }
    }

    /// Check the wheel is readable, request installation, and wait for it.
    pub fn install_and_verify(&self, cluster_id: &str, artifact: &DbfsPath) -> Result<InstallReport> {
        let info = self.client.dbfs().get_status(artifact)?;
        tracing::info!(artifact = %artifact, bytes = info.file_size, "artifact readable");

        let library = Library::Whl(artifact.to_string());
        self.client
            .libraries()
            .install(cluster_id, std::slice::from_ref(&library))?;
        tracing::info!(cluster_id, library = %artifact, "install submitted");

        let libraries = self.client.libraries();
        let outcome = poll_install(&self.policy, || {
            let statuses = libraries.cluster_status(cluster_id)?;
            Ok(statuses.into_iter().find(|s| s.refers_to(&library)))
        })?;

        match outcome {
            PollOutcome::Installed { attempts } => {
                tracing::info!(cluster_id, attempts, "library installed");
                Ok(InstallReport {
                    cluster_id: cluster_id.to_string(),
                    library: artifact.to_string(),
                    attempts,
                })
            }
            PollOutcome::Failed { status, messages } => Err(DbxError::Installation {
                cluster_id: cluster_id.to_string(),
                library: artifact.to_string(),
                status: status.to_string(),
                messages,
            }),
            PollOutcome::TimedOut { attempts } => Err(DbxError::InstallTimedOut {
                cluster_id: cluster_id.to_string(),
                library: artifact.to_string(),
                attempts,
            }),
        }
    }
}
