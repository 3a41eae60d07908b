use super::{ApiClient, Empty};
use crate::error::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub path: String,
    #[serde(default)]
    pub object_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ListResponse {
    #[serde(default)]
    objects: Vec<ObjectInfo>,
}

#[derive(Debug, Serialize)]
struct MkdirsRequest<'a> {
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct ImportRequest<'a> {
    path: &'a str,
    format: &'static str,
    content: String,
    overwrite: bool,
}

/// Workspace API 2.0 (notebooks and workspace files).
pub struct Workspace<'a> {
    client: &'a ApiClient,
}

impl<'a> Workspace<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self, path: &str) -> Result<Vec<ObjectInfo>> {
        let resp: ListResponse = self
            .client
            .get("/api/2.0/workspace/list", &[("path", path)])?;
        Ok(resp.objects)
    }

    /// Create `path` and any missing parents. Succeeds if it already exists.
    pub fn mkdirs(&self, path: &str) -> Result<()> {
        let _: Empty = self
            .client
            .post("/api/2.0/workspace/mkdirs", &MkdirsRequest { path })?;
        Ok(())
    }

    /// Upload a file, replacing any existing object at `path`.
    pub fn upload(&self, path: &str, content: &[u8]) -> Result<()> {
        let _: Empty = self.client.post(
            "/api/2.0/workspace/import",
            &ImportRequest {
                path,
                format: "AUTO",
                content: STANDARD.encode(content),
                overwrite: true,
            },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::client_for;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn upload_overwrites_with_auto_format() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/2.0/workspace/import")
            .match_body(Matcher::Json(json!({
                "path": "/Shared/bundles/b/setup.py",
                "format": "AUTO",
                "content": "cHJpbnQoMSk=",
                "overwrite": true
            })))
            .with_status(200)
            .with_body("{}")
            .create();

        let client = client_for(&server);
        client
            .workspace()
            .upload("/Shared/bundles/b/setup.py", b"print(1)")
            .unwrap();
        mock.assert();
    }

    #[test]
    fn list_tolerates_missing_objects() {
        let mut server = mockito::Server::new();
        let _m1 = server
            .mock("GET", "/api/2.0/workspace/list")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create();

        let client = client_for(&server);
        assert!(client.workspace().list("/").unwrap().is_empty());
    }
}
