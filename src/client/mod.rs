//! Typed REST client for the graph-explorer backend surface.
//!
//! Every operation validates its inputs before transport, encodes list
//! filters as query parameters (omitting absent or empty values), and
//! normalizes every failure into `GraphlensError::Request`.

use crate::error::{GraphlensError, Result};
use crate::model::{EdgeType, GraphEdge, GraphNode, NodeLabel};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Paged node list as returned by `GET /nodes/{label}`.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeListResponse {
    pub nodes: Vec<GraphNode>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Paged edge list as returned by `GET /edges`.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeListResponse {
    pub edges: Vec<GraphEdge>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// One-hop neighborhood of a node, shared by explore and expand.
#[derive(Debug, Clone, Deserialize)]
pub struct ExploreResponse {
    pub center: GraphNode,
    pub neighbors: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Lineage of a node: the subgraph plus ordered root-to-node uuid paths.
#[derive(Debug, Clone, Deserialize)]
pub struct LineageResponse {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub paths: Vec<Vec<String>>,
}

/// Graph-wide overview: domain summaries and counter stats.
#[derive(Debug, Clone, Deserialize)]
pub struct OverviewResponse {
    #[serde(default)]
    pub domains: Vec<serde_json::Value>,
    #[serde(default)]
    pub stats: HashMap<String, serde_json::Value>,
}

/// Search result page, shared by lexical and semantic search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub nodes: Vec<GraphNode>,
    pub total: usize,
}

/// Filters for `fetch_nodes`.
#[derive(Debug, Clone, Default)]
pub struct NodeListOptions {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
}

/// Filters for `fetch_edges`.
#[derive(Debug, Clone, Default)]
pub struct EdgeListOptions {
    pub source_uuid: Option<String>,
    pub target_uuid: Option<String>,
    pub edge_type: Option<EdgeType>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

/// Fields for node creation. The server assigns the uuid.
#[derive(Debug, Clone, Default)]
pub struct NewNode {
    pub name: String,
    pub description: Option<String>,
    pub attributes: Option<HashMap<String, serde_json::Value>>,
}

/// Partial node update: only set fields are sent, absent fields stay
/// untouched server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, serde_json::Value>>,
}

/// Fields for edge creation.
#[derive(Debug, Clone, Serialize)]
pub struct NewEdge {
    pub edge_type: EdgeType,
    pub source_uuid: String,
    pub target_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, serde_json::Value>>,
}

/// Partial edge update, same semantics as `NodeUpdate`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EdgeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<EdgeType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Serialize)]
struct CreateNodeBody<'a> {
    label: NodeLabel,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<&'a HashMap<String, serde_json::Value>>,
}

/// Shape of backend error bodies: `{"error": "..."}`. Anything else
/// falls back to the generic status message.
#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the graph-explorer backend
///
/// All methods are async, validate inputs before transport, and fail with
/// a single normalized `GraphlensError::Request{status, message}`.
#[derive(Debug)]
pub struct GraphClient {
    client: Client,
    base_url: String,
}

impl GraphClient {
    /// Create a new client against `base_url` (e.g.
    /// `http://localhost:8000/api/graph`), with a per-request timeout.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        // Parse up front so a bad base URL fails at construction, not on
        // the first request.
        Url::parse(base_url)
            .map_err(|e| GraphlensError::Config(format!("Invalid base URL {}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GraphlensError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// List nodes of a label, paged and optionally filtered by a search
    /// term. `limit`, when provided, must be greater than 0.
    pub async fn fetch_nodes(
        &self,
        label: NodeLabel,
        options: &NodeListOptions,
    ) -> Result<NodeListResponse> {
        validate_limit(options.limit)?;

        let mut params = Vec::new();
        push_param(&mut params, "offset", options.offset.map(|v| v.to_string()));
        push_param(&mut params, "limit", options.limit.map(|v| v.to_string()));
        push_param(&mut params, "search", options.search.clone());

        let request = self
            .client
            .get(self.url(&format!("/nodes/{}", label.as_str())))
            .query(&params);
        decode(self.execute(request).await?).await
    }

    /// Fetch a single node by label and uuid.
    pub async fn fetch_node(&self, label: NodeLabel, uuid: &str) -> Result<GraphNode> {
        validate_uuid(uuid)?;
        let request = self
            .client
            .get(self.url(&format!("/nodes/{}/{}", label.as_str(), uuid)));
        decode(self.execute(request).await?).await
    }

    /// Create a node. The response is the authoritative created entity,
    /// including the server-assigned uuid.
    pub async fn create_node(&self, label: NodeLabel, node: &NewNode) -> Result<GraphNode> {
        if node.name.is_empty() {
            return Err(GraphlensError::InvalidInput("name must not be empty".to_string()));
        }
        let body = CreateNodeBody {
            label,
            name: &node.name,
            description: node.description.as_deref(),
            attributes: node.attributes.as_ref(),
        };
        let request = self
            .client
            .post(self.url(&format!("/nodes/{}", label.as_str())))
            .json(&body);
        decode(self.execute(request).await?).await
    }

    /// Partially update a node. Only fields set in `update` are mutated
    /// server-side.
    pub async fn update_node(
        &self,
        label: NodeLabel,
        uuid: &str,
        update: &NodeUpdate,
    ) -> Result<GraphNode> {
        validate_uuid(uuid)?;
        let request = self
            .client
            .put(self.url(&format!("/nodes/{}/{}", label.as_str(), uuid)))
            .json(update);
        decode(self.execute(request).await?).await
    }

    /// Delete a node. A delete of an already-deleted uuid surfaces a normal
    /// "not found" failure, never a crash.
    pub async fn delete_node(&self, label: NodeLabel, uuid: &str) -> Result<()> {
        validate_uuid(uuid)?;
        let request = self
            .client
            .delete(self.url(&format!("/nodes/{}/{}", label.as_str(), uuid)));
        decode_empty(self.execute(request).await?).await
    }

    /// List edges, paged and optionally filtered by endpoint or type.
    /// `limit`, when provided, must be greater than 0.
    pub async fn fetch_edges(&self, options: &EdgeListOptions) -> Result<EdgeListResponse> {
        validate_limit(options.limit)?;

        let mut params = Vec::new();
        push_param(&mut params, "source_uuid", options.source_uuid.clone());
        push_param(&mut params, "target_uuid", options.target_uuid.clone());
        push_param(
            &mut params,
            "edge_type",
            options.edge_type.map(|t| t.as_str().to_string()),
        );
        push_param(&mut params, "offset", options.offset.map(|v| v.to_string()));
        push_param(&mut params, "limit", options.limit.map(|v| v.to_string()));

        let request = self.client.get(self.url("/edges")).query(&params);
        decode(self.execute(request).await?).await
    }

    /// Create an edge between two existing nodes.
    pub async fn create_edge(&self, edge: &NewEdge) -> Result<GraphEdge> {
        validate_uuid(&edge.source_uuid)?;
        validate_uuid(&edge.target_uuid)?;
        let request = self.client.post(self.url("/edges")).json(edge);
        decode(self.execute(request).await?).await
    }

    /// Partially update an edge by uuid.
    pub async fn update_edge(&self, uuid: &str, update: &EdgeUpdate) -> Result<GraphEdge> {
        validate_uuid(uuid)?;
        let request = self
            .client
            .put(self.url(&format!("/edges/{}", uuid)))
            .json(update);
        decode(self.execute(request).await?).await
    }

    /// Delete an edge by uuid.
    pub async fn delete_edge(&self, uuid: &str) -> Result<()> {
        validate_uuid(uuid)?;
        let request = self.client.delete(self.url(&format!("/edges/{}", uuid)));
        decode_empty(self.execute(request).await?).await
    }

    /// One-hop neighborhood of a node: the node itself, its direct
    /// neighbors, and the connecting edges.
    pub async fn fetch_explore_node(&self, uuid: &str) -> Result<ExploreResponse> {
        validate_uuid(uuid)?;
        let request = self.client.get(self.url(&format!("/explore/{}", uuid)));
        decode(self.execute(request).await?).await
    }

    /// Incremental expansion of an already-visible node; same shape as
    /// `fetch_explore_node`.
    pub async fn expand_node(&self, uuid: &str) -> Result<ExploreResponse> {
        validate_uuid(uuid)?;
        let request = self
            .client
            .get(self.url(&format!("/explore/{}/expand", uuid)));
        decode(self.execute(request).await?).await
    }

    /// Ordered ancestry paths leading to a node.
    pub async fn fetch_lineage(&self, uuid: &str) -> Result<LineageResponse> {
        validate_uuid(uuid)?;
        let request = self.client.get(self.url(&format!("/lineage/{}", uuid)));
        decode(self.execute(request).await?).await
    }

    /// Graph-wide overview (domain list plus counter stats).
    pub async fn fetch_graph_overview(&self) -> Result<OverviewResponse> {
        let request = self.client.get(self.url("/overview"));
        decode(self.execute(request).await?).await
    }

    /// Lexical search over node names and summaries, optionally scoped to
    /// a label.
    pub async fn search_graph(
        &self,
        q: &str,
        label: Option<NodeLabel>,
        limit: Option<usize>,
    ) -> Result<SearchResponse> {
        self.search_internal("/search", q, label, limit).await
    }

    /// Embedding-based semantic search, optionally scoped to a label.
    pub async fn semantic_search_graph(
        &self,
        q: &str,
        label: Option<NodeLabel>,
        limit: Option<usize>,
    ) -> Result<SearchResponse> {
        self.search_internal("/search/semantic", q, label, limit).await
    }

    async fn search_internal(
        &self,
        path: &str,
        q: &str,
        label: Option<NodeLabel>,
        limit: Option<usize>,
    ) -> Result<SearchResponse> {
        if q.trim().is_empty() {
            return Err(GraphlensError::InvalidInput(
                "search query must not be empty".to_string(),
            ));
        }
        validate_limit(limit)?;

        let mut params = vec![("q", q.to_string())];
        push_param(&mut params, "label", label.map(|l| l.as_str().to_string()));
        push_param(&mut params, "limit", limit.map(|v| v.to_string()));

        let request = self.client.get(self.url(path)).query(&params);
        decode(self.execute(request).await?).await
    }

    /// Send a request, mapping transport-level failures (DNS, refused
    /// connection, timeout) to the normalized request failure with
    /// status 0.
    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|e| GraphlensError::Request {
            status: 0,
            message: format!("Network error: {}", e),
        })
    }
}

/// Append a query parameter, skipping absent and empty values so the
/// backend never receives an empty filter.
fn push_param(params: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(v) = value {
        if !v.is_empty() {
            params.push((key, v));
        }
    }
}

fn validate_limit(limit: Option<usize>) -> Result<()> {
    if limit == Some(0) {
        return Err(GraphlensError::InvalidInput(
            "limit must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn validate_uuid(uuid: &str) -> Result<()> {
    if uuid.is_empty() {
        return Err(GraphlensError::InvalidInput("uuid must not be empty".to_string()));
    }
    Ok(())
}

/// Decode a JSON response body, normalizing every non-2xx status into a
/// single request failure.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    response.json::<T>().await.map_err(|e| GraphlensError::Request {
        status: 0,
        message: format!("Failed to decode response: {}", e),
    })
}

/// Like `decode`, but for endpoints that answer with no content (204).
/// Never attempts JSON decoding of an empty body.
async fn decode_empty(response: Response) -> Result<()> {
    let response = check_status(response).await?;
    if response.status() != StatusCode::NO_CONTENT {
        log::debug!("Expected 204, got {} (treating as success)", response.status());
    }
    Ok(())
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Prefer the backend's `error` field when the body carries one; fall
    // back to "Request failed: <status>" otherwise.
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error);
    Err(GraphlensError::request(status.as_u16(), message))
}
