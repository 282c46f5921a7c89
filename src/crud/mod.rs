//! UI-facing CRUD operations with one shared `{loading, error}` lifecycle.
//!
//! Every operation sets `loading` and clears the prior `error` on entry,
//! and resolves to a sentinel (`None` / `false`) instead of propagating the
//! failure, so the canvas layer branches on return values and never has to
//! special-case error shapes per operation. The shared flag is
//! last-write-wins across concurrent invocations; that is enough here
//! because it drives UI feedback, not coordination.

use crate::client::{
    EdgeListOptions, EdgeListResponse, EdgeUpdate, GraphClient, NewEdge, NewNode,
    NodeListOptions, NodeListResponse, NodeUpdate,
};
use crate::error::GraphlensError;
use crate::model::{GraphEdge, GraphNode, NodeLabel};
use std::sync::Mutex;

/// Snapshot of the shared operation status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpStatus {
    pub loading: bool,
    pub error: Option<String>,
}

/// Wraps the REST client with uniform loading/error state.
pub struct CrudOrchestrator {
    client: GraphClient,
    status: Mutex<OpStatus>,
}

impl CrudOrchestrator {
    pub fn new(client: GraphClient) -> Self {
        Self {
            client,
            status: Mutex::new(OpStatus::default()),
        }
    }

    /// Current `{loading, error}` snapshot.
    pub fn status(&self) -> OpStatus {
        self.status.lock().unwrap().clone()
    }

    /// Whether any operation is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.status.lock().unwrap().loading
    }

    /// The error message of the most recently finished operation, if any.
    pub fn last_error(&self) -> Option<String> {
        self.status.lock().unwrap().error.clone()
    }

    /// Direct access to the underlying client, for read flows that manage
    /// their own result shape (explore, lineage, search).
    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    pub async fn create_node(&self, label: NodeLabel, node: &NewNode) -> Option<GraphNode> {
        self.begin();
        let result = self.client.create_node(label, node).await;
        self.settle(result, "Failed to create node")
    }

    pub async fn update_node(
        &self,
        label: NodeLabel,
        uuid: &str,
        update: &NodeUpdate,
    ) -> Option<GraphNode> {
        self.begin();
        let result = self.client.update_node(label, uuid, update).await;
        self.settle(result, "Failed to update node")
    }

    /// Returns `true` on success, `false` on failure (with `error` set).
    pub async fn delete_node(&self, label: NodeLabel, uuid: &str) -> bool {
        self.begin();
        let result = self.client.delete_node(label, uuid).await;
        self.settle(result, "Failed to delete node").is_some()
    }

    pub async fn create_edge(&self, edge: &NewEdge) -> Option<GraphEdge> {
        self.begin();
        let result = self.client.create_edge(edge).await;
        self.settle(result, "Failed to create edge")
    }

    pub async fn update_edge(&self, uuid: &str, update: &EdgeUpdate) -> Option<GraphEdge> {
        self.begin();
        let result = self.client.update_edge(uuid, update).await;
        self.settle(result, "Failed to update edge")
    }

    /// Returns `true` on success, `false` on failure (with `error` set).
    pub async fn delete_edge(&self, uuid: &str) -> bool {
        self.begin();
        let result = self.client.delete_edge(uuid).await;
        self.settle(result, "Failed to delete edge").is_some()
    }

    pub async fn load_nodes_list(
        &self,
        label: NodeLabel,
        options: &NodeListOptions,
    ) -> Option<NodeListResponse> {
        self.begin();
        let result = self.client.fetch_nodes(label, options).await;
        self.settle(result, "Failed to load nodes")
    }

    pub async fn load_edges_list(&self, options: &EdgeListOptions) -> Option<EdgeListResponse> {
        self.begin();
        let result = self.client.fetch_edges(options).await;
        self.settle(result, "Failed to load edges")
    }

    fn begin(&self) {
        let mut status = self.status.lock().unwrap();
        status.loading = true;
        status.error = None;
    }

    /// Resolve an operation: record the outcome in the shared status and
    /// map the result to its sentinel form. `loading` is reset on both
    /// paths, unconditionally.
    fn settle<T>(
        &self,
        result: crate::error::Result<T>,
        fallback: &str,
    ) -> Option<T> {
        let mut status = self.status.lock().unwrap();
        status.loading = false;
        match result {
            Ok(value) => {
                status.error = None;
                Some(value)
            }
            Err(e) => {
                let message = error_message(e, fallback);
                log::warn!("{}", message);
                status.error = Some(message);
                None
            }
        }
    }
}

/// Prefer the failure's own descriptive message; fall back to the
/// operation-specific default when there is none.
fn error_message(e: GraphlensError, fallback: &str) -> String {
    match e {
        GraphlensError::Request { message, .. } if !message.is_empty() => message,
        GraphlensError::InvalidInput(message) if !message.is_empty() => message,
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn orchestrator_for(server: &MockServer) -> CrudOrchestrator {
        CrudOrchestrator::new(GraphClient::new(&server.uri(), 5).unwrap())
    }

    fn node_json(uuid: &str) -> serde_json::Value {
        serde_json::json!({
            "uuid": uuid, "name": "orders", "label": "Table",
            "summary": "", "attributes": {}
        })
    }

    #[tokio::test]
    async fn test_create_node_success_clears_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/nodes/Table"))
            .respond_with(ResponseTemplate::new(201).set_body_json(node_json("n-1")))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server).await;
        let node = orchestrator
            .create_node(NodeLabel::Table, &NewNode { name: "orders".to_string(), ..Default::default() })
            .await;
        assert!(node.is_some());

        let status = orchestrator.status();
        assert!(!status.loading);
        assert_eq!(status.error, None);
    }

    #[tokio::test]
    async fn test_delete_missing_node_sets_not_found_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/nodes/Table/missing-uuid"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "Node not found: missing-uuid"
            })))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server).await;
        let deleted = orchestrator.delete_node(NodeLabel::Table, "missing-uuid").await;
        assert!(!deleted);

        let status = orchestrator.status();
        assert!(!status.loading);
        assert!(status.error.unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_failure_uses_fallback_when_message_is_generic() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/nodes/Table/n-1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("not json"))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server).await;
        let update = NodeUpdate { name: Some("X".to_string()), ..Default::default() };
        let node = orchestrator.update_node(NodeLabel::Table, "n-1", &update).await;
        assert!(node.is_none());
        // The normalized message ("Request failed: 500") is descriptive
        // enough to keep; it wins over the fallback.
        assert_eq!(orchestrator.last_error(), Some("Request failed: 500".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_input_surfaces_as_error_state() {
        let server = MockServer::start().await;
        let orchestrator = orchestrator_for(&server).await;
        let options = EdgeListOptions { limit: Some(0), ..Default::default() };
        let page = orchestrator.load_edges_list(&options).await;
        assert!(page.is_none());
        assert_eq!(
            orchestrator.last_error(),
            Some("limit must be greater than 0".to_string())
        );
        assert!(!orchestrator.is_loading());
        // Rejected before transport: no request reached the server.
        assert_eq!(server.received_requests().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_next_operation_clears_previous_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/nodes/Table/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "Node not found: gone"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/nodes/Table"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "nodes": [], "total": 0, "offset": 0, "limit": 50
            })))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server).await;
        assert!(!orchestrator.delete_node(NodeLabel::Table, "gone").await);
        assert!(orchestrator.last_error().is_some());

        let page = orchestrator
            .load_nodes_list(NodeLabel::Table, &NodeListOptions::default())
            .await;
        assert!(page.is_some());
        assert_eq!(orchestrator.last_error(), None);
    }

    #[tokio::test]
    async fn test_loading_resets_after_both_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/edges"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "edges": [], "total": 0, "offset": 0, "limit": 50
            })))
            .mount(&server)
            .await;

        let orchestrator = orchestrator_for(&server).await;
        orchestrator.load_edges_list(&EdgeListOptions::default()).await;
        assert!(!orchestrator.is_loading());

        // Failure path (connection refused against a dead port).
        let dead = CrudOrchestrator::new(GraphClient::new("http://127.0.0.1:1", 1).unwrap());
        assert!(!dead.delete_edge("e-1").await);
        assert!(!dead.is_loading());
        assert!(dead.last_error().unwrap().starts_with("Network error:"));
    }
}
