//! Chunked DBFS uploads.
//!
//! A file is streamed through one `create` / `add-block`* / `close` session in
//! 1 MiB blocks and then checked with `get-status`. The write handle lives in
//! a guard that closes it when an upload bails out halfway, so a failed read
//! or append never leaves the server-side handle open.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::api::{ApiClient, Dbfs};
use crate::error::{DbxError, Result};
use crate::paths::{self, DbfsPath};

pub const BLOCK_SIZE: usize = 1024 * 1024;

/// Open DBFS write handle. `finish` closes it; dropping it closes it too.
struct WriteHandle<'a> {
    dbfs: Dbfs<'a>,
    handle: i64,
    open: bool,
}

impl<'a> WriteHandle<'a> {
    fn create(dbfs: Dbfs<'a>, path: &DbfsPath) -> Result<Self> {
        let handle = dbfs.create(path, true)?;
        Ok(Self {
            dbfs,
            handle,
            open: true,
        })
    }

    fn append(&self, block: &[u8]) -> Result<()> {
        self.dbfs.add_block(self.handle, block)
    }

    fn finish(mut self) -> Result<()> {
        self.open = false;
        self.dbfs.close(self.handle)
    }
}

impl Drop for WriteHandle<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.dbfs.close(self.handle) {
                tracing::warn!(handle = self.handle, error = %e, "failed to close abandoned upload handle");
            }
        }
    }
}

pub struct Uploader<'a> {
    client: &'a ApiClient,
    block_size: usize,
}

impl<'a> Uploader<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            block_size: BLOCK_SIZE,
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Upload a built artifact to `/FileStore/jars/<basename>`.
    pub fn upload_artifact(&self, local: &Path) -> Result<DbfsPath> {
        let remote = paths::artifact_destination(local).ok_or_else(|| DbxError::Upload {
            path: local.display().to_string(),
            source: Box::new(DbxError::ArtifactNotFound(local.to_path_buf())),
        })?;
        self.upload_to(local, &remote)?;
        Ok(remote)
    }

    /// Upload `local` to `remote`, overwriting, and verify the stored size.
    pub fn upload_to(&self, local: &Path, remote: &DbfsPath) -> Result<()> {
        tracing::info!(local = %local.display(), remote = %remote, "uploading");
        let expected = self.stream(local, remote).map_err(|e| DbxError::Upload {
            path: remote.to_string(),
            source: Box::new(e),
        })?;

        let info = self
            .client
            .dbfs()
            .get_status(remote)
            .map_err(|e| DbxError::Upload {
                path: remote.to_string(),
                source: Box::new(e),
            })?;
        if info.file_size != expected {
            return Err(DbxError::UploadSizeMismatch {
                path: remote.to_string(),
                expected,
                actual: info.file_size,
            });
        }
        tracing::info!(remote = %remote, bytes = info.file_size, "upload verified");
        Ok(())
    }

    /// Returns the number of bytes sent.
    fn stream(&self, local: &Path, remote: &DbfsPath) -> Result<u64> {
        let mut file = File::open(local)?;
        let dbfs = self.client.dbfs();

        if let Some(parent) = remote.parent() {
            // mkdirs fails when the directory already exists; create reports real errors.
            if let Err(e) = dbfs.try_mkdirs(&parent) {
                tracing::debug!(dir = %parent, error = %e, "mkdirs failed, continuing");
            }
        }

        let handle = WriteHandle::create(dbfs, remote)?;
        let mut sent = 0u64;
        let mut block = Vec::with_capacity(self.block_size);
        loop {
            block.clear();
            let n = (&mut file)
                .take(self.block_size as u64)
                .read_to_end(&mut block)?;
            if n == 0 {
                break;
            }
            handle.append(&block)?;
            sent += n as u64;
        }
        handle.finish()?;
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::client_for;
    use mockito::Matcher;
    use tempfile::TempDir;

    const JAR: &str = "/FileStore/jars/pkg-1.0-py3-none-any.whl";

    fn status_body(size: u64) -> String {
        format!(r#"{{"path":"{JAR}","is_dir":false,"file_size":{size}}}"#)
    }

    fn write_file(dir: &TempDir, size: usize) -> std::path::PathBuf {
        let path = dir.path().join("pkg-1.0-py3-none-any.whl");
        std::fs::write(&path, vec![7u8; size]).unwrap();
        path
    }

    struct Mocks {
        mkdirs: mockito::Mock,
        create: mockito::Mock,
        add_block: mockito::Mock,
        close: mockito::Mock,
        status: mockito::Mock,
    }

    fn mock_upload(server: &mut mockito::Server, blocks: usize, size: u64) -> Mocks {
        Mocks {
            mkdirs: server
                .mock("POST", "/api/2.0/dbfs/mkdirs")
                .match_body(Matcher::PartialJsonString(
                    r#"{"path":"/FileStore/jars"}"#.into(),
                ))
                .with_status(200)
                .with_body("{}")
                .create(),
            create: server
                .mock("POST", "/api/2.0/dbfs/create")
                .match_body(Matcher::PartialJsonString(format!(
                    r#"{{"path":"{JAR}","overwrite":true}}"#
                )))
                .with_status(200)
                .with_body(r#"{"handle": 11}"#)
                .expect(1)
                .create(),
            add_block: server
                .mock("POST", "/api/2.0/dbfs/add-block")
                .match_body(Matcher::PartialJsonString(r#"{"handle":11}"#.into()))
                .with_status(200)
                .with_body("{}")
                .expect(blocks)
                .create(),
            close: server
                .mock("POST", "/api/2.0/dbfs/close")
                .match_body(Matcher::Json(serde_json::json!({"handle": 11})))
                .with_status(200)
                .with_body("{}")
                .expect(1)
                .create(),
            status: server
                .mock("GET", "/api/2.0/dbfs/get-status")
                .match_query(Matcher::UrlEncoded("path".into(), JAR.into()))
                .with_status(200)
                .with_body(status_body(size))
                .expect(1)
                .create(),
        }
    }

    #[test]
    fn two_and_a_half_mib_takes_three_blocks() {
        let dir = TempDir::new().unwrap();
        let size = BLOCK_SIZE * 5 / 2;
        let local = write_file(&dir, size);

        let mut server = mockito::Server::new();
        let mocks = mock_upload(&mut server, 3, size as u64);

        let client = client_for(&server);
        let remote = Uploader::new(&client).upload_artifact(&local).unwrap();
        assert_eq!(remote.to_string(), format!("dbfs:{JAR}"));

        mocks.mkdirs.assert();
        mocks.create.assert();
        mocks.add_block.assert();
        mocks.close.assert();
        mocks.status.assert();
    }

    #[test]
    fn empty_file_still_closes_once() {
        let dir = TempDir::new().unwrap();
        let local = write_file(&dir, 0);

        let mut server = mockito::Server::new();
        let mocks = mock_upload(&mut server, 0, 0);

        let client = client_for(&server);
        Uploader::new(&client).upload_artifact(&local).unwrap();
        mocks.add_block.assert();
        mocks.close.assert();
    }

    #[test]
    fn exact_multiple_of_block_size() {
        let dir = TempDir::new().unwrap();
        let local = write_file(&dir, 8);

        let mut server = mockito::Server::new();
        let mocks = mock_upload(&mut server, 2, 8);

        let client = client_for(&server);
        Uploader::new(&client)
            .with_block_size(4)
            .upload_artifact(&local)
            .unwrap();
        mocks.add_block.assert();
        mocks.close.assert();
    }

    #[test]
    fn failed_append_still_closes_handle() {
        let dir = TempDir::new().unwrap();
        let local = write_file(&dir, 16);

        let mut server = mockito::Server::new();
        let _m1 = server
            .mock("POST", "/api/2.0/dbfs/mkdirs")
            .with_status(200)
            .with_body("{}")
            .create();
        let _m2 = server
            .mock("POST", "/api/2.0/dbfs/create")
            .with_status(200)
            .with_body(r#"{"handle": 11}"#)
            .create();
        let add_block = server
            .mock("POST", "/api/2.0/dbfs/add-block")
            .with_status(500)
            .with_body(r#"{"error_code":"INTERNAL_ERROR"}"#)
            .expect(1)
            .create();
        let close = server
            .mock("POST", "/api/2.0/dbfs/close")
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create();
        let status = server
            .mock("GET", "/api/2.0/dbfs/get-status")
            .match_query(Matcher::Any)
            .expect(0)
            .create();

        let client = client_for(&server);
        let err = Uploader::new(&client)
            .with_block_size(4)
            .upload_artifact(&local)
            .unwrap_err();
        match err {
            DbxError::Upload { path, source } => {
                assert_eq!(path, format!("dbfs:{JAR}"));
                assert!(matches!(*source, DbxError::Http { status: 500, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        add_block.assert();
        close.assert();
        status.assert();
    }

    #[test]
    fn size_mismatch_is_reported() {
        let dir = TempDir::new().unwrap();
        let local = write_file(&dir, 10);

        let mut server = mockito::Server::new();
        let _mocks = mock_upload(&mut server, 1, 3);

        let client = client_for(&server);
        let err = Uploader::new(&client).upload_artifact(&local).unwrap_err();
        assert!(matches!(
            err,
            DbxError::UploadSizeMismatch {
                expected: 10,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn mkdirs_failure_is_tolerated() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("requirements.txt");
        std::fs::write(&local, b"pyyaml>=6.0\n").unwrap();
        let remote = DbfsPath::new("/FileStore/job-requirements/b/requirements.txt");

        let mut server = mockito::Server::new();
        let _m3 = server
            .mock("POST", "/api/2.0/dbfs/mkdirs")
            .with_status(409)
            .with_body(r#"{"error_code":"RESOURCE_ALREADY_EXISTS"}"#)
            .create();
        let _m4 = server
            .mock("POST", "/api/2.0/dbfs/create")
            .with_status(200)
            .with_body(r#"{"handle": 5}"#)
            .create();
        let _m5 = server
            .mock("POST", "/api/2.0/dbfs/add-block")
            .with_status(200)
            .with_body("{}")
            .expect(1)
            .create();
        let _m6 = server
            .mock("POST", "/api/2.0/dbfs/close")
            .with_status(200)
            .with_body("{}")
            .create();
        let _m7 = server
            .mock("GET", "/api/2.0/dbfs/get-status")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"path":"/FileStore/job-requirements/b/requirements.txt","file_size":12}"#)
            .create();

        let client = client_for(&server);
        Uploader::new(&client).upload_to(&local, &remote).unwrap();
    }
}
