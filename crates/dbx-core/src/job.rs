use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::jobs::{CronSchedule, EmailNotifications, JobSettings, JobTask, PythonWheelTask};
use crate::api::libraries::Library;
use crate::api::ApiClient;
use crate::error::{DbxError, Result};
use crate::paths::{self, DbfsPath};

/// Jobs this tool manages never overlap with themselves.
pub const MAX_CONCURRENT_RUNS: u32 = 1;

// ---------------------------------------------------------------------------
// Job definition (databricks.yml)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    #[serde(default)]
    pub task_key: Option<String>,
    pub package_name: String,
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

fn default_entry_point() -> String {
    "main".to_string()
}

/// Used when a job omits its `task` block: the survey processing wheel.
impl Default for TaskDefinition {
    fn default() -> Self {
        Self {
            task_key: Some("process_surveys".to_string()),
            package_name: "survey_processing".to_string(),
            entry_point: default_entry_point(),
            parameters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    pub name: String,
    pub existing_cluster_id: String,
    #[serde(default)]
    pub task: TaskDefinition,
    #[serde(default)]
    pub email_notifications: EmailNotifications,
    #[serde(default)]
    pub schedule: Option<CronSchedule>,
}

#[derive(Debug, Default, Deserialize)]
struct BundleFile {
    #[serde(default)]
    resources: Resources,
}

#[derive(Debug, Default, Deserialize)]
struct Resources {
    /// Raw entries; only the selected job has to match [`JobDefinition`].
    #[serde(default)]
    jobs: BTreeMap<String, serde_yaml::Value>,
}

impl JobDefinition {
    /// Load `<bundle_dir>/databricks.yml` and pick `resources.jobs.<key>`.
    /// Without a key the file must define exactly one job.
    pub fn load(bundle_dir: &Path, key: Option<&str>) -> Result<Self> {
        let path = definition_path(bundle_dir);
        let data = std::fs::read_to_string(&path).map_err(|e| DbxError::JobDefinition {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&data, key, &path)
    }

    pub fn parse(data: &str, key: Option<&str>, path: &Path) -> Result<Self> {
        let invalid = |reason: String| DbxError::JobDefinition {
            path: path.to_path_buf(),
            reason,
        };

        let file: BundleFile =
            serde_yaml::from_str(data).map_err(|e| invalid(e.to_string()))?;
        let mut jobs = file.resources.jobs;
        let (key, raw) = match key {
            Some(key) => {
                let raw = jobs
                    .remove(key)
                    .ok_or_else(|| invalid(format!("no job '{key}' under resources.jobs")))?;
                (key.to_string(), raw)
            }
            None => {
                if jobs.len() != 1 {
                    let keys: Vec<&str> = jobs.keys().map(String::as_str).collect();
                    return Err(invalid(format!(
                        "expected exactly one job under resources.jobs, found [{}]; pick one with --job",
                        keys.join(", ")
                    )));
                }
                jobs.pop_first().ok_or_else(|| invalid("no jobs".into()))?
            }
        };
        let definition: JobDefinition = serde_yaml::from_value(raw)
            .map_err(|e| invalid(format!("resources.jobs.{key}: {e}")))?;

        for (field, value) in [
            ("name", &definition.name),
            ("existing_cluster_id", &definition.existing_cluster_id),
            ("task.package_name", &definition.task.package_name),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(format!("{field} must not be empty")));
            }
        }
        Ok(definition)
    }

    /// Settings for a single-task job running `artifact` on the definition's cluster.
    pub fn settings(&self, artifact: &DbfsPath, requirements: Option<&DbfsPath>) -> JobSettings {
        let mut libraries = vec![Library::Whl(artifact.to_string())];
        if let Some(req) = requirements {
            libraries.push(Library::Requirements(req.to_string()));
        }
        JobSettings {
            name: self.name.clone(),
            tasks: vec![JobTask {
                task_key: self
                    .task
                    .task_key
                    .clone()
                    .unwrap_or_else(|| self.task.package_name.clone()),
                python_wheel_task: PythonWheelTask {
                    package_name: self.task.package_name.clone(),
                    entry_point: self.task.entry_point.clone(),
                    parameters: self.task.parameters.clone(),
                },
                existing_cluster_id: self.existing_cluster_id.clone(),
                libraries,
            }],
            email_notifications: self.email_notifications.clone(),
            schedule: self.schedule.clone(),
            max_concurrent_runs: MAX_CONCURRENT_RUNS,
        }
    }
}

// ---------------------------------------------------------------------------
// Registrar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRegistration {
    pub job_id: i64,
    pub name: String,
    pub action: RegistrationAction,
}

/// Creates or updates jobs, matching existing ones by exact name.
///
/// Renaming a job in `databricks.yml` therefore creates a second job instead
/// of renaming the first, and with duplicate names only the first listed job
/// is updated.
pub struct JobRegistrar<'a> {
    client: &'a ApiClient,
}

impl<'a> JobRegistrar<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn register(
        &self,
        definition: &JobDefinition,
        artifact: &DbfsPath,
        requirements: Option<&DbfsPath>,
    ) -> Result<JobRegistration> {
        let settings = definition.settings(artifact, requirements);
        tracing::debug!(
            settings = %serde_json::to_string_pretty(&settings)?,
            "job settings"
        );
        self.apply(&settings)
    }

    pub fn apply(&self, settings: &JobSettings) -> Result<JobRegistration> {
        let jobs = self.client.jobs();
        match jobs.find_by_name(&settings.name)? {
            Some(existing) => {
                tracing::info!(name = %settings.name, job_id = existing.job_id, "updating existing job");
                jobs.update(existing.job_id, settings)?;
                Ok(JobRegistration {
                    job_id: existing.job_id,
                    name: settings.name.clone(),
                    action: RegistrationAction::Updated,
                })
            }
            None => {
                tracing::info!(name = %settings.name, "creating job");
                let job_id = jobs.create(settings)?;
                tracing::info!(name = %settings.name, job_id, "job created");
                Ok(JobRegistration {
                    job_id,
                    name: settings.name.clone(),
                    action: RegistrationAction::Created,
                })
            }
        }
    }
}

/// Path of the definition file inside a bundle.
pub fn definition_path(bundle_dir: &Path) -> PathBuf {
    bundle_dir.join(paths::JOB_DEFINITION_FILE)
}
