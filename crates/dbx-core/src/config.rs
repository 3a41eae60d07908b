use crate::error::{DbxError, Result};
use std::time::Duration;

pub const WORKSPACE_URL_VAR: &str = "DATABRICKS_WORKSPACE_URL";
pub const ACCESS_TOKEN_VAR: &str = "DATABRICKS_ACCESS_TOKEN";

// ---------------------------------------------------------------------------
// WorkspaceConfig
// ---------------------------------------------------------------------------

/// Connection settings for one workspace. Every API client is built from one
/// of these; nothing reads the environment behind the caller's back.
#[derive(Clone)]
pub struct WorkspaceConfig {
    pub host: String,
    pub token: String,
    /// Per-request timeout. `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for WorkspaceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceConfig")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl WorkspaceConfig {
    /// Validate and build a config. Empty or absent values are reported
    /// together, by their environment variable names.
    pub fn new(host: Option<String>, token: Option<String>) -> Result<Self> {
        let host = host.map(|h| h.trim().trim_end_matches('/').to_string());
        let token = token.map(|t| t.trim().to_string());

        let mut missing = Vec::new();
        if host.as_deref().map_or(true, str::is_empty) {
            missing.push(WORKSPACE_URL_VAR.to_string());
        }
        if token.as_deref().map_or(true, str::is_empty) {
            missing.push(ACCESS_TOKEN_VAR.to_string());
        }
        if !missing.is_empty() {
            return Err(DbxError::Configuration { missing });
        }

        Ok(Self {
            host: host.unwrap_or_default(),
            token: token.unwrap_or_default(),
            timeout: None,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(
            std::env::var(WORKSPACE_URL_VAR).ok(),
            std::env::var(ACCESS_TOKEN_VAR).ok(),
        )
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

// ---------------------------------------------------------------------------
// InstallPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallPolicy {
    /// Wait before each status poll.
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for InstallPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_host() {
        let cfg = WorkspaceConfig::new(
            Some("https://example.cloud.databricks.com/".into()),
            Some("test-token".into()),
        )
        .unwrap();
        assert_eq!(cfg.host, "https://example.cloud.databricks.com");
        assert_eq!(cfg.token, "test-token");
        assert!(cfg.timeout.is_none());
    }

    #[test]
    fn reports_all_missing_values() {
        let err = WorkspaceConfig::new(None, Some("  ".into())).unwrap_err();
        match err {
            DbxError::Configuration { missing } => {
                assert_eq!(missing, vec![WORKSPACE_URL_VAR, ACCESS_TOKEN_VAR]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = WorkspaceConfig::new(Some("https://h".into()), Some("secret".into())).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn default_install_policy() {
        let policy = InstallPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(10));
        assert_eq!(policy.max_attempts, 5);
    }
}
