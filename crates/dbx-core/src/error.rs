use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbxError {
    #[error("missing required configuration: {}", missing.join(", "))]
    Configuration { missing: Vec<String> },

    #[error("no build tool found on PATH (tried: {})", tried.join(", "))]
    BuildToolMissing { tried: Vec<String> },

    #[error("build command `{command}` failed with {status}: {stderr}")]
    Build {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("no artifact produced in {0}")]
    ArtifactNotFound(PathBuf),

    #[error("upload to {path} failed: {source}")]
    Upload {
        path: String,
        #[source]
        source: Box<DbxError>,
    },

    #[error("upload to {path} reported {actual} bytes, expected {expected}")]
    UploadSizeMismatch {
        path: String,
        expected: u64,
        actual: u64,
    },

    #[error("library {library} {status} on cluster {cluster_id}: {}", messages.join("; "))]
    Installation {
        cluster_id: String,
        library: String,
        status: String,
        messages: Vec<String>,
    },

    #[error("library {library} not installed on cluster {cluster_id} after {attempts} polls")]
    InstallTimedOut {
        cluster_id: String,
        library: String,
        attempts: u32,
    },

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("invalid job definition in {path}: {reason}")]
    JobDefinition { path: PathBuf, reason: String },

    #[error("{method} {endpoint} returned {status}: {body}")]
    Http {
        method: String,
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DbxError {
    /// Install failures are warned about, not fatal, inside a bundle deployment.
    pub fn is_installation(&self) -> bool {
        matches!(
            self,
            DbxError::Installation { .. } | DbxError::InstallTimedOut { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DbxError>;
