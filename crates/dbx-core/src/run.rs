use std::collections::BTreeMap;

use serde::Serialize;

use crate::api::ApiClient;
use crate::error::{DbxError, Result};

/// A triggered run. The run itself is not awaited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunHandle {
    pub job_id: i64,
    pub run_id: i64,
    pub number_in_job: Option<i64>,
}

impl RunHandle {
    pub fn monitor_url(&self, host: &str) -> String {
        format!(
            "{}/#job/{}/run/{}",
            host.trim_end_matches('/'),
            self.job_id,
            self.run_id
        )
    }
}

pub struct JobRunner<'a> {
    client: &'a ApiClient,
}

impl<'a> JobRunner<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Resolve `job_name` and trigger one run with `params`.
    pub fn run(&self, job_name: &str, params: &BTreeMap<String, String>) -> Result<RunHandle> {
        let jobs = self.client.jobs();
        let job = jobs
            .find_by_name(job_name)?
            .ok_or_else(|| DbxError::JobNotFound(job_name.to_string()))?;
        tracing::info!(name = job_name, job_id = job.job_id, ?params, "triggering run");

        let resp = jobs.run_now(job.job_id, params)?;
        let handle = RunHandle {
            job_id: job.job_id,
            run_id: resp.run_id,
            number_in_job: resp.number_in_job,
        };
        tracing::info!(
            run_id = handle.run_id,
            url = %handle.monitor_url(self.client.host()),
            "run started"
        );
        Ok(handle)
    }
}
