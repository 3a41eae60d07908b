use super::Connection;
use crate::output::print_json;
use anyhow::Context;
use dbx_core::config::InstallPolicy;
use dbx_core::install::Installer;
use dbx_core::paths::DbfsPath;

pub fn run(conn: &Connection, cluster_id: &str, path: &str, json: bool) -> anyhow::Result<()> {
    let client = conn.connect()?;
    let artifact = DbfsPath::new(path);

    let report = Installer::new(&client, InstallPolicy::default())
        .install_and_verify(cluster_id, &artifact)
        .with_context(|| format!("failed to install {artifact} on cluster {cluster_id}"))?;

    if json {
        return print_json(&report);
    }
    println!(
        "installed {} on {} (verified after {} poll(s))",
        report.library, report.cluster_id, report.attempts
    );
    Ok(())
}
