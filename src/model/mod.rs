//! Shared graph data model: nodes, edges, their label/type vocabularies,
//! the recorded user action, and the persisted session record.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Node label vocabulary of the property graph.
///
/// The serialized form is the exact label string the backend uses both in
/// JSON bodies and in `/nodes/{label}` path segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    Table,
    Column,
    Domain,
    BusinessEntity,
    BusinessRule,
    CodeSet,
    QueryPattern,
}

impl NodeLabel {
    /// All recognized labels, in display order.
    pub const ALL: [NodeLabel; 7] = [
        NodeLabel::Table,
        NodeLabel::Column,
        NodeLabel::Domain,
        NodeLabel::BusinessEntity,
        NodeLabel::BusinessRule,
        NodeLabel::CodeSet,
        NodeLabel::QueryPattern,
    ];

    /// Wire/path form of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Table => "Table",
            NodeLabel::Column => "Column",
            NodeLabel::Domain => "Domain",
            NodeLabel::BusinessEntity => "BusinessEntity",
            NodeLabel::BusinessRule => "BusinessRule",
            NodeLabel::CodeSet => "CodeSet",
            NodeLabel::QueryPattern => "QueryPattern",
        }
    }

    /// Parse a label string as received from user input (case-sensitive,
    /// matching the wire form). Returns None for unrecognized labels.
    pub fn parse(s: &str) -> Option<NodeLabel> {
        NodeLabel::ALL.iter().copied().find(|l| l.as_str() == s)
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge type vocabulary of the property graph (13 kinds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    HasColumn,
    ForeignKey,
    Join,
    BelongsTo,
    Synonym,
    DerivedFrom,
    AppliesTo,
    UsesTable,
    UsesColumn,
    MapsTo,
    RelatedTo,
    Contains,
    DescribedBy,
}

impl EdgeType {
    /// Wire form of the edge type (SCREAMING_SNAKE_CASE).
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::HasColumn => "HAS_COLUMN",
            EdgeType::ForeignKey => "FOREIGN_KEY",
            EdgeType::Join => "JOIN",
            EdgeType::BelongsTo => "BELONGS_TO",
            EdgeType::Synonym => "SYNONYM",
            EdgeType::DerivedFrom => "DERIVED_FROM",
            EdgeType::AppliesTo => "APPLIES_TO",
            EdgeType::UsesTable => "USES_TABLE",
            EdgeType::UsesColumn => "USES_COLUMN",
            EdgeType::MapsTo => "MAPS_TO",
            EdgeType::RelatedTo => "RELATED_TO",
            EdgeType::Contains => "CONTAINS",
            EdgeType::DescribedBy => "DESCRIBED_BY",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the remote property graph. Owned by the backend; the client
/// holds read-only copies merged into its working view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Globally unique, stable identifier assigned by the backend.
    pub uuid: String,
    pub name: String,
    pub label: NodeLabel,
    #[serde(default)]
    pub summary: String,
    /// String-keyed map of arbitrary scalar/structured values.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A typed relationship between two graph nodes.
///
/// Both endpoint uuids must resolve to nodes present in the current view
/// when the edge is rendered; the client merges `source_node`/`target_node`
/// into the view to maintain that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub uuid: String,
    pub edge_type: EdgeType,
    pub source_node: GraphNode,
    pub target_node: GraphNode,
    /// Free-text description of the relationship.
    #[serde(default)]
    pub fact: String,
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

/// The single recorded "last action" of the session, tagged by `type` in
/// its persisted JSON form, e.g. `{"type":"explore","uuid":"n-42"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GraphAction {
    /// Show all nodes of a label.
    #[serde(rename = "entity")]
    EntitySelect { label: NodeLabel },
    /// Lexical search, optionally scoped to a label.
    #[serde(rename = "search")]
    Search {
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<NodeLabel>,
    },
    /// Embedding-based search, optionally scoped to a label.
    #[serde(rename = "semantic")]
    SemanticSearch {
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<NodeLabel>,
    },
    /// Center-and-expand a single node.
    #[serde(rename = "explore")]
    Explore { uuid: String },
    /// Show the derivation path for a node.
    #[serde(rename = "lineage")]
    Lineage { uuid: String },
    /// Explicit multi-node working set.
    #[serde(rename = "pinned")]
    Pinned { uuids: Vec<String> },
}

/// The persisted view intent, written as one JSON record under a single
/// well-known storage key.
///
/// Priority invariant: a non-empty `pinned_nodes` takes precedence over
/// `action` on replay. Every save is a total overwrite of the prior record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub action: Option<GraphAction>,
    #[serde(rename = "selectedEntityType", default)]
    pub selected_entity_type: Option<NodeLabel>,
    #[serde(rename = "pinnedNodes", default)]
    pub pinned_nodes: Vec<String>,
}

impl SessionState {
    /// An empty session: nothing recorded yet.
    pub fn empty() -> Self {
        SessionState {
            action: None,
            selected_entity_type: None,
            pinned_nodes: Vec::new(),
        }
    }
}
