use super::{ApiClient, Empty, OnFailure};
use crate::error::Result;
use crate::paths::DbfsPath;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: String,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub modification_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    handle: i64,
}

#[derive(Debug, Serialize)]
struct PathRequest<'a> {
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    path: &'a str,
    overwrite: bool,
}

#[derive(Debug, Serialize)]
struct AddBlockRequest {
    handle: i64,
    data: String,
}

#[derive(Debug, Serialize)]
struct HandleRequest {
    handle: i64,
}

/// DBFS API 2.0.
pub struct Dbfs<'a> {
    client: &'a ApiClient,
}

impl<'a> Dbfs<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Create a directory and its parents. Existing directories make this
    /// fail, so the failure is returned but not logged as an error.
    pub fn try_mkdirs(&self, path: &DbfsPath) -> Result<()> {
        let _: Empty = self.client.post_with(
            "/api/2.0/dbfs/mkdirs",
            &PathRequest {
                path: path.api_path(),
            },
            OnFailure::Quiet,
        )?;
        Ok(())
    }

    /// Open a write stream. The returned handle must be passed to
    /// [`Dbfs::close`] exactly once.
    pub fn create(&self, path: &DbfsPath, overwrite: bool) -> Result<i64> {
        let resp: CreateResponse = self.client.post(
            "/api/2.0/dbfs/create",
            &CreateRequest {
                path: path.api_path(),
                overwrite,
            },
        )?;
        Ok(resp.handle)
    }

    pub fn add_block(&self, handle: i64, data: &[u8]) -> Result<()> {
        let _: Empty = self.client.post(
            "/api/2.0/dbfs/add-block",
            &AddBlockRequest {
                handle,
                data: STANDARD.encode(data),
            },
        )?;
        Ok(())
    }

    pub fn close(&self, handle: i64) -> Result<()> {
        let _: Empty = self
            .client
            .post("/api/2.0/dbfs/close", &HandleRequest { handle })?;
        Ok(())
    }

    pub fn get_status(&self, path: &DbfsPath) -> Result<FileInfo> {
        self.client
            .get("/api/2.0/dbfs/get-status", &[("path", path.api_path())])
    }
}
