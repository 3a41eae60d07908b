//! End-to-end bundle deployment.
//!
//! Order: job definition → connectivity → cluster check → build → upload →
//! install/verify → requirements → tree → job registration. Each step aborts
//! the deployment on error except install verification, whose failures are
//! logged and recorded in the report. Nothing is rolled back.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::api::ApiClient;
use crate::builder::ArtifactBuilder;
use crate::config::InstallPolicy;
use crate::deploy::{TreeDeployer, TreeSummary};
use crate::error::Result;
use crate::install::Installer;
use crate::job::{JobDefinition, JobRegistrar, JobRegistration};
use crate::paths;
use crate::upload::Uploader;

#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Key under `resources.jobs`; required when the file defines several jobs.
    pub job_key: Option<String>,
    pub install: bool,
    pub with_requirements: bool,
    pub install_policy: InstallPolicy,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            job_key: None,
            install: true,
            with_requirements: false,
            install_policy: InstallPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InstallStep {
    Installed { attempts: u32 },
    Skipped,
    Unverified { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub bundle: String,
    pub wheel: PathBuf,
    pub artifact: String,
    pub install: InstallStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    pub tree: TreeSummary,
    pub job: JobRegistration,
}

/// Fails when the workspace cannot be reached with the configured token.
pub fn check_connection(client: &ApiClient) -> Result<()> {
    client.workspace().list("/")?;
    tracing::info!(host = client.host(), "connected to workspace");
    Ok(())
}

pub struct BundleDeployer<'a> {
    client: &'a ApiClient,
    builder: ArtifactBuilder,
    options: DeployOptions,
}

impl<'a> BundleDeployer<'a> {
    pub fn new(client: &'a ApiClient, builder: ArtifactBuilder, options: DeployOptions) -> Self {
        Self {
            client,
            builder,
            options,
        }
    }

    pub fn deploy(&self, bundle_dir: &Path) -> Result<DeploymentReport> {
        let bundle = paths::bundle_name(bundle_dir);
        tracing::info!(bundle = %bundle, dir = %bundle_dir.display(), "starting deployment");

        let definition = JobDefinition::load(bundle_dir, self.options.job_key.as_deref())?;
        check_connection(self.client)?;
        self.check_cluster(&definition.existing_cluster_id);

        let wheel = self.builder.build(bundle_dir)?;
        let uploader = Uploader::new(self.client);
        let artifact = uploader.upload_artifact(&wheel)?;

        let install = if self.options.install {
            let installer = Installer::new(self.client, self.options.install_policy);
            match installer.install_and_verify(&definition.existing_cluster_id, &artifact) {
                Ok(report) => InstallStep::Installed {
                    attempts: report.attempts,
                },
                Err(e) if e.is_installation() => {
                    tracing::warn!(error = %e, "library install not verified, continuing");
                    InstallStep::Unverified {
                        reason: e.to_string(),
                    }
                }
                Err(e) => return Err(e),
            }
        } else {
            InstallStep::Skipped
        };

        let requirements = if self.options.with_requirements {
            let local = bundle_dir.join(paths::REQUIREMENTS_FILE);
            if local.is_file() {
                let remote = paths::requirements_destination(&bundle);
                uploader.upload_to(&local, &remote)?;
                Some(remote)
            } else {
                tracing::warn!(path = %local.display(), "no requirements file, skipping");
                None
            }
        } else {
            None
        };

        let workspace_path = paths::bundle_workspace_path(&bundle);
        let tree = TreeDeployer::new(self.client).deploy(bundle_dir, &workspace_path)?;

        let job = JobRegistrar::new(self.client).register(
            &definition,
            &artifact,
            requirements.as_ref(),
        )?;

        Ok(DeploymentReport {
            bundle,
            wheel,
            artifact: artifact.to_string(),
            install,
            requirements: requirements.map(|r| r.to_string()),
            tree,
            job,
        })
    }

    /// Log the target cluster's state. A stopped cluster is not an error
    /// here; installation verification reports the consequences.
    fn check_cluster(&self, cluster_id: &str) {
        match self.client.clusters().get(cluster_id) {
            Ok(cluster) if cluster.is_running() => {
                tracing::info!(cluster_id, name = %cluster.cluster_name, "cluster running");
            }
            Ok(cluster) => {
                tracing::warn!(cluster_id, state = %cluster.state, "cluster is not running");
            }
            Err(e) => {
                tracing::warn!(cluster_id, error = %e, "could not read cluster state");
            }
        }
    }
}
