use crate::api::ApiClient;
use crate::config::WorkspaceConfig;

/// Client pointed at a mock server with a fixed token.
pub(crate) fn client_for(server: &mockito::Server) -> ApiClient {
    let config = WorkspaceConfig::new(Some(server.url()), Some("test-token".into())).unwrap();
    ApiClient::new(&config).unwrap()
}
