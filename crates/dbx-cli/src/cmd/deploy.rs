use super::Connection;
use crate::output::{print_fields, print_json};
use anyhow::Context;
use dbx_core::builder::ArtifactBuilder;
use dbx_core::bundle::{BundleDeployer, DeployOptions, DeploymentReport, InstallStep};
use dbx_core::run::JobRunner;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub struct DeployArgs {
    pub bundle: PathBuf,
    pub job_key: Option<String>,
    pub skip_install: bool,
    pub with_requirements: bool,
    pub run: bool,
    pub params: BTreeMap<String, String>,
}

pub fn run(conn: &Connection, args: DeployArgs, json: bool) -> anyhow::Result<()> {
    if !args.bundle.is_dir() {
        anyhow::bail!("bundle directory not found: {}", args.bundle.display());
    }
    if !args.params.is_empty() && !args.run {
        tracing::warn!("--param has no effect without --run");
    }

    let client = conn.connect()?;
    let builder = ArtifactBuilder::detect().context("cannot build the bundle wheel")?;
    let options = DeployOptions {
        job_key: args.job_key,
        install: !args.skip_install,
        with_requirements: args.with_requirements,
        ..Default::default()
    };

    let report = BundleDeployer::new(&client, builder, options)
        .deploy(&args.bundle)
        .with_context(|| format!("failed to deploy bundle {}", args.bundle.display()))?;

    let run = if args.run {
        let handle = JobRunner::new(&client)
            .run(&report.job.name, &args.params)
            .with_context(|| format!("deployed, but failed to run job '{}'", report.job.name))?;
        Some(handle)
    } else {
        None
    };

    if json {
        return print_json(&serde_json::json!({
            "deployment": report,
            "run": run.as_ref().map(|h| serde_json::json!({
                "run_id": h.run_id,
                "url": h.monitor_url(client.host()),
            })),
        }));
    }

    print_report(&report);
    if let Some(handle) = run {
        println!();
        println!("started run {} of job {}", handle.run_id, handle.job_id);
        println!("monitor: {}", handle.monitor_url(client.host()));
    }
    Ok(())
}

fn print_report(report: &DeploymentReport) {
    let install = match &report.install {
        InstallStep::Installed { attempts } => format!("installed (verified after {attempts} poll(s))"),
        InstallStep::Skipped => "skipped".to_string(),
        InstallStep::Unverified { reason } => format!("NOT VERIFIED: {reason}"),
    };
    let mut fields = vec![
        ("bundle", report.bundle.clone()),
        ("wheel", report.wheel.display().to_string()),
        ("artifact", report.artifact.clone()),
        ("install", install),
    ];
    if let Some(req) = &report.requirements {
        fields.push(("requirements", req.clone()));
    }
    fields.push((
        "tree",
        format!(
            "{} file(s) -> {}",
            report.tree.files_uploaded, report.tree.workspace_path
        ),
    ));
    let action = match report.job.action {
        dbx_core::job::RegistrationAction::Created => "created",
        dbx_core::job::RegistrationAction::Updated => "updated",
    };
    fields.push((
        "job",
        format!("{} '{}' (id {})", action, report.job.name, report.job.job_id),
    ));
    print_fields(&fields);
}
