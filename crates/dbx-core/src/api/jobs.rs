use super::libraries::Library;
use super::{ApiClient, Empty};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const PAGE_SIZE: &str = "100";

// ---------------------------------------------------------------------------
// Job settings payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSettings {
    pub name: String,
    pub tasks: Vec<JobTask>,
    #[serde(default, skip_serializing_if = "EmailNotifications::is_empty")]
    pub email_notifications: EmailNotifications,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<CronSchedule>,
    pub max_concurrent_runs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTask {
    pub task_key: String,
    pub python_wheel_task: PythonWheelTask,
    pub existing_cluster_id: String,
    #[serde(default)]
    pub libraries: Vec<Library>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonWheelTask {
    pub package_name: String,
    pub entry_point: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailNotifications {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_start: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_success: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_failure: Vec<String>,
}

impl EmailNotifications {
    pub fn is_empty(&self) -> bool {
        self.on_start.is_empty() && self.on_success.is_empty() && self.on_failure.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronSchedule {
    pub quartz_cron_expression: String,
    pub timezone_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_status: Option<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// One entry of `jobs/list`. Only the fields used for name lookup are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobSummary {
    pub job_id: i64,
    #[serde(default)]
    pub settings: JobSummarySettings,
}

impl JobSummary {
    pub fn name(&self) -> &str {
        &self.settings.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobSummarySettings {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    jobs: Vec<JobSummary>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    job_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunNowResponse {
    pub run_id: i64,
    #[serde(default)]
    pub number_in_job: Option<i64>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    job_id: i64,
    new_settings: &'a JobSettings,
}

#[derive(Debug, Serialize)]
struct RunNowRequest<'a> {
    job_id: i64,
    #[serde(skip_serializing_if = "no_params")]
    notebook_params: &'a BTreeMap<String, String>,
}

fn no_params(params: &&BTreeMap<String, String>) -> bool {
    params.is_empty()
}

// ---------------------------------------------------------------------------
// Jobs API 2.1
// ---------------------------------------------------------------------------

pub struct Jobs<'a> {
    client: &'a ApiClient,
}

impl<'a> Jobs<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Every job in the workspace, following `next_page_token` until the
    /// listing reports no more pages.
    pub fn list(&self) -> Result<Vec<JobSummary>> {
        let mut jobs = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page: ListResponse = {
                let mut query = vec![("limit", PAGE_SIZE)];
                if let Some(token) = page_token.as_deref() {
                    query.push(("page_token", token));
                }
                self.client.get("/api/2.1/jobs/list", &query)?
            };
            jobs.extend(page.jobs);
            match page.next_page_token {
                Some(token) if page.has_more && !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(jobs)
    }

    /// First job whose name equals `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Result<Option<JobSummary>> {
        Ok(self.list()?.into_iter().find(|job| job.name() == name))
    }

    pub fn create(&self, settings: &JobSettings) -> Result<i64> {
        let resp: CreateResponse = self.client.post("/api/2.1/jobs/create", settings)?;
        Ok(resp.job_id)
    }

    /// Replace a job's settings wholesale.
    pub fn update(&self, job_id: i64, settings: &JobSettings) -> Result<()> {
        let _: Empty = self.client.post(
            "/api/2.1/jobs/update",
            &UpdateRequest {
                job_id,
                new_settings: settings,
            },
        )?;
        Ok(())
    }

    pub fn run_now(&self, job_id: i64, params: &BTreeMap<String, String>) -> Result<RunNowResponse> {
        self.client.post(
            "/api/2.1/jobs/run-now",
            &RunNowRequest {
                job_id,
                notebook_params: params,
            },
        )
    }
}
