use super::Connection;
use crate::output::{print_fields, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ClusterSubcommand {
    /// List clusters and their states
    List,
    /// Show one cluster's state
    Status {
        /// Cluster id
        cluster_id: String,
    },
}

pub fn run(conn: &Connection, subcmd: ClusterSubcommand, json: bool) -> anyhow::Result<()> {
    let client = conn.connect()?;
    let clusters = client.clusters();

    match subcmd {
        ClusterSubcommand::List => {
            let mut list = clusters.list().context("failed to list clusters")?;
            list.sort_by(|a, b| a.cluster_name.cmp(&b.cluster_name));
            if json {
                return print_json(&list);
            }
            if list.is_empty() {
                println!("no clusters");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = list
                .into_iter()
                .map(|c| vec![c.cluster_id, c.cluster_name, c.state])
                .collect();
            print_table(&["ID", "NAME", "STATE"], &rows);
            Ok(())
        }

        ClusterSubcommand::Status { cluster_id } => {
            let info = clusters
                .get(&cluster_id)
                .with_context(|| format!("failed to read cluster '{cluster_id}'"))?;
            if json {
                return print_json(&info);
            }
            let mut fields = vec![
                ("id", info.cluster_id.clone()),
                ("name", info.cluster_name.clone()),
                ("state", info.state.clone()),
            ];
            if let Some(msg) = &info.state_message {
                fields.push(("message", msg.clone()));
            }
            print_fields(&fields);
            Ok(())
        }
    }
}
