pub mod cluster;
pub mod deploy;
pub mod install;
pub mod ping;
pub mod run;

use anyhow::Context;
use dbx_core::api::ApiClient;
use dbx_core::config::WorkspaceConfig;
use std::time::Duration;

/// Global connection flags, resolved into a client only by commands that
/// talk to the workspace.
pub struct Connection {
    pub workspace_url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Connection {
    pub fn connect(&self) -> anyhow::Result<ApiClient> {
        let config = WorkspaceConfig::new(self.workspace_url.clone(), self.token.clone())
            .context("set the variables in the environment or pass --workspace-url / --token")?
            .with_timeout(self.timeout_secs.map(Duration::from_secs));
        ApiClient::new(&config).context("failed to build HTTP client")
    }
}

pub fn parse_kv(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, _)) if k.trim().is_empty() => Err(format!("key cannot be empty in: {s}")),
        Some((k, v)) => Ok((k.trim().to_string(), v.to_string())),
        None => Err(format!("expected KEY=VALUE, got: {s}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kv_splits_on_first_equals() {
        assert_eq!(
            parse_kv("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_kv(" date =2024-03-01").unwrap(),
            ("date".to_string(), "2024-03-01".to_string())
        );
        assert_eq!(parse_kv("empty=").unwrap(), ("empty".to_string(), String::new()));
    }

    #[test]
    fn parse_kv_rejects_malformed() {
        assert!(parse_kv("novalue").is_err());
        assert!(parse_kv("=value").is_err());
    }

    #[test]
    fn connect_reports_every_missing_variable() {
        let conn = Connection {
            workspace_url: None,
            token: Some("  ".into()),
            timeout_secs: None,
        };
        let msg = format!("{:#}", conn.connect().err().unwrap());
        assert!(msg.contains("DATABRICKS_WORKSPACE_URL"));
        assert!(msg.contains("DATABRICKS_ACCESS_TOKEN"));
    }
}
