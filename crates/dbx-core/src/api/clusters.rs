use super::ApiClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub cluster_id: String,
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_message: Option<String>,
}

impl ClusterInfo {
    pub fn is_running(&self) -> bool {
        self.state == "RUNNING"
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListResponse {
    #[serde(default)]
    clusters: Vec<ClusterInfo>,
}

/// Clusters API 2.0.
pub struct Clusters<'a> {
    client: &'a ApiClient,
}

impl<'a> Clusters<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Vec<ClusterInfo>> {
        let resp: ListResponse = self.client.get("/api/2.0/clusters/list", &[])?;
        Ok(resp.clusters)
    }

    pub fn get(&self, cluster_id: &str) -> Result<ClusterInfo> {
        self.client
            .get("/api/2.0/clusters/get", &[("cluster_id", cluster_id)])
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::client_for;
    use mockito::Matcher;

    #[test]
    fn list_and_get() {
        let mut server = mockito::Server::new();
        let _m1 = server
            .mock("GET", "/api/2.0/clusters/list")
            .with_status(200)
            .with_body(
                r#"{"clusters":[
                    {"cluster_id":"0101-abc","cluster_name":"etl","state":"RUNNING"},
                    {"cluster_id":"0202-def","cluster_name":"adhoc","state":"TERMINATED","state_message":"Inactive"}
                ]}"#,
            )
            .create();
        let _m2 = server
            .mock("GET", "/api/2.0/clusters/get")
            .match_query(Matcher::UrlEncoded("cluster_id".into(), "0202-def".into()))
            .with_status(200)
            .with_body(r#"{"cluster_id":"0202-def","cluster_name":"adhoc","state":"TERMINATED"}"#)
            .create();

        let client = client_for(&server);
        let clusters = client.clusters().list().unwrap();
        assert_eq!(clusters.len(), 2);
        assert!(clusters[0].is_running());
        assert_eq!(clusters[1].state_message.as_deref(), Some("Inactive"));

        let one = client.clusters().get("0202-def").unwrap();
        assert!(!one.is_running());
    }
}
