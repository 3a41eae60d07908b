use super::Connection;
use crate::output::print_json;
use anyhow::Context;
use dbx_core::bundle::check_connection;

pub fn run(conn: &Connection, json: bool) -> anyhow::Result<()> {
    let client = conn.connect()?;
    check_connection(&client)
        .with_context(|| format!("cannot reach workspace {}", client.host()))?;

    if json {
        print_json(&serde_json::json!({ "host": client.host(), "reachable": true }))?;
    } else {
        println!("connected to {}", client.host());
    }
    Ok(())
}
