use super::Connection;
use crate::output::print_json;
use anyhow::Context;
use dbx_core::run::JobRunner;
use std::collections::BTreeMap;

pub fn run(
    conn: &Connection,
    job_name: &str,
    params: BTreeMap<String, String>,
    json: bool,
) -> anyhow::Result<()> {
    let client = conn.connect()?;
    let handle = JobRunner::new(&client)
        .run(job_name, &params)
        .with_context(|| format!("failed to run job '{job_name}'"))?;
    let url = handle.monitor_url(client.host());

    if json {
        return print_json(&serde_json::json!({
            "job_id": handle.job_id,
            "run_id": handle.run_id,
            "number_in_job": handle.number_in_job,
            "url": url,
        }));
    }
    println!("started run {} of job {}", handle.run_id, handle.job_id);
    println!("monitor: {url}");
    Ok(())
}
