//! Recording side of the session machinery.
//!
//! Each user operation constructs the corresponding `GraphAction`, pairs it
//! with the currently-relevant selected entity type, and persists the full
//! `SessionState` — always a total overwrite of the prior record, never a
//! merge. The recorder carries the live pinned set forward on non-pinned
//! recordings, keeping pinned mode sticky until it is explicitly cleared or
//! replaced by a new pinned set.

use crate::model::{GraphAction, NodeLabel, SessionState};
use crate::session::store::SessionStorage;
use std::sync::Arc;

pub struct SessionRecorder {
    store: Arc<dyn SessionStorage>,
    selected_entity_type: Option<NodeLabel>,
    pinned_nodes: Vec<String>,
}

impl SessionRecorder {
    /// Create a recorder, seeding the tracked entity type and pinned set
    /// from whatever is already persisted so recording continues the prior
    /// session after a reload.
    pub fn new(store: Arc<dyn SessionStorage>) -> Self {
        let persisted = store.load();
        let (selected_entity_type, pinned_nodes) = match persisted {
            Some(state) => (state.selected_entity_type, state.pinned_nodes),
            None => (None, Vec::new()),
        };
        Self { store, selected_entity_type, pinned_nodes }
    }

    pub fn selected_entity_type(&self) -> Option<NodeLabel> {
        self.selected_entity_type
    }

    pub fn pinned_nodes(&self) -> &[String] {
        &self.pinned_nodes
    }

    /// Record "show all nodes of a label".
    pub fn record_entity_select(&mut self, label: NodeLabel) {
        self.selected_entity_type = Some(label);
        self.persist(Some(GraphAction::EntitySelect { label }));
    }

    /// Record a lexical search, optionally scoped to a label. An unscoped
    /// search carries no entity-type context.
    pub fn record_search(&mut self, query: &str, label: Option<NodeLabel>) {
        self.selected_entity_type = label;
        self.persist(Some(GraphAction::Search { query: query.to_string(), label }));
    }

    /// Record a semantic search, optionally scoped to a label.
    pub fn record_semantic_search(&mut self, query: &str, label: Option<NodeLabel>) {
        self.selected_entity_type = label;
        self.persist(Some(GraphAction::SemanticSearch { query: query.to_string(), label }));
    }

    /// Record centering-and-expanding a single node.
    pub fn record_explore(&mut self, uuid: &str) {
        self.selected_entity_type = None;
        self.persist(Some(GraphAction::Explore { uuid: uuid.to_string() }));
    }

    /// Record a lineage view of a single node.
    pub fn record_lineage(&mut self, uuid: &str) {
        self.selected_entity_type = None;
        self.persist(Some(GraphAction::Lineage { uuid: uuid.to_string() }));
    }

    /// Record an explicit pinned working set. The uuid list is written into
    /// both the action and the top-level `pinnedNodes` field, so the
    /// replay-priority rule can be evaluated from `pinnedNodes` alone.
    pub fn record_pinned_nodes(&mut self, uuids: Vec<String>) {
        self.selected_entity_type = None;
        self.pinned_nodes = uuids.clone();
        self.persist(Some(GraphAction::Pinned { uuids }));
    }

    /// Leave pinned mode, keeping no recorded action behind it.
    pub fn clear_pinned_nodes(&mut self) {
        self.pinned_nodes.clear();
        self.persist(None);
    }

    /// Drop the persisted session entirely.
    pub fn clear(&mut self) {
        self.selected_entity_type = None;
        self.pinned_nodes.clear();
        self.store.clear();
    }

    fn persist(&self, action: Option<GraphAction>) {
        self.store.save(&SessionState {
            action,
            selected_entity_type: self.selected_entity_type,
            pinned_nodes: self.pinned_nodes.clone(),
        });
    }
}
