mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{cluster::ClusterSubcommand, Connection};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dbx",
    about = "Build, upload, and schedule wheel bundles on a Databricks workspace",
    version,
    propagate_version = true
)]
struct Cli {
    /// Workspace base URL, e.g. https://<instance>.cloud.databricks.com
    #[arg(long, global = true, env = "DATABRICKS_WORKSPACE_URL")]
    workspace_url: Option<String>,

    /// Personal access token
    #[arg(long, global = true, env = "DATABRICKS_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a bundle's wheel, install it on the job cluster, mirror the
    /// bundle tree, and create or update its job
    Deploy {
        /// Bundle directory containing databricks.yml and setup.py
        bundle: PathBuf,

        /// Job key under resources.jobs (required when several are defined)
        #[arg(long = "job")]
        job_key: Option<String>,

        /// Do not install the wheel on the cluster
        #[arg(long)]
        skip_install: bool,

        /// Upload requirements.txt and attach it to the job task
        #[arg(long)]
        with_requirements: bool,

        /// Trigger one run after the job is registered
        #[arg(long)]
        run: bool,

        /// Parameter for the --run trigger as KEY=VALUE (repeatable)
        #[arg(long = "param", value_parser = cmd::parse_kv)]
        params: Vec<(String, String)>,
    },

    /// Trigger a run of an existing job by exact name
    Run {
        /// Job name as shown in the workspace
        job_name: String,

        /// Run parameter as KEY=VALUE (repeatable)
        #[arg(long = "param", value_parser = cmd::parse_kv)]
        params: Vec<(String, String)>,
    },

    /// Install a wheel already on DBFS and wait for the cluster to report it
    Install {
        /// Target cluster id
        #[arg(long)]
        cluster: String,

        /// DBFS path of the wheel (dbfs:/... or /...)
        path: String,
    },

    /// Inspect clusters
    Cluster {
        #[command(subcommand)]
        subcommand: ClusterSubcommand,
    },

    /// Check that the workspace is reachable with the configured token
    Ping,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let conn = Connection {
        workspace_url: cli.workspace_url,
        token: cli.token,
        timeout_secs: cli.timeout_secs,
    };

    let result = match cli.command {
        Commands::Deploy {
            bundle,
            job_key,
            skip_install,
            with_requirements,
            run,
            params,
        } => cmd::deploy::run(
            &conn,
            cmd::deploy::DeployArgs {
                bundle,
                job_key,
                skip_install,
                with_requirements,
                run,
                params: params.into_iter().collect(),
            },
            cli.json,
        ),
        Commands::Run { job_name, params } => {
            cmd::run::run(&conn, &job_name, params.into_iter().collect(), cli.json)
        }
        Commands::Install { cluster, path } => cmd::install::run(&conn, &cluster, &path, cli.json),
        Commands::Cluster { subcommand } => cmd::cluster::run(&conn, subcommand, cli.json),
        Commands::Ping => cmd::ping::run(&conn, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
