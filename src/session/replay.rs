//! One-shot replay of the persisted session on activation.
//!
//! The engine reads the session record exactly once per activation and
//! re-issues the recorded operations through the callback seam, so the
//! canvas reconverges to the same visual state after a reload. Re-entry is
//! rejected by an explicit state machine rather than an ad hoc flag.

use crate::model::{GraphAction, NodeLabel};
use crate::session::store::SessionStorage;
use async_trait::async_trait;
use std::sync::Arc;

/// Replay lifecycle. The only allowed transition chain is
/// `NotStarted -> Replaying -> Done`; a second `run` is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPhase {
    NotStarted,
    Replaying,
    Done,
}

/// The seam between the replay engine and the view layer. The canvas (or
/// the CLI) implements these; the engine never talks to the network itself.
#[async_trait]
pub trait ReplayCallbacks: Send {
    async fn set_selected_entity_type(&mut self, label: NodeLabel);
    async fn set_pinned_nodes(&mut self, uuids: &[String]);
    async fn load_entity_nodes(&mut self, label: NodeLabel);
    async fn search_nodes(&mut self, query: &str, label: Option<NodeLabel>);
    async fn semantic_search(&mut self, query: &str, label: Option<NodeLabel>);
    async fn explore_node(&mut self, uuid: &str);
    async fn load_lineage(&mut self, uuid: &str);
}

pub struct ReplayEngine {
    store: Arc<dyn SessionStorage>,
    phase: ReplayPhase,
}

impl ReplayEngine {
    pub fn new(store: Arc<dyn SessionStorage>) -> Self {
        Self { store, phase: ReplayPhase::NotStarted }
    }

    pub fn phase(&self) -> ReplayPhase {
        self.phase
    }

    /// Replay the persisted session through `callbacks`. Runs at most once
    /// per engine; later calls return `false` without touching anything.
    /// Returns `true` when a session record was found and replayed.
    pub async fn run<C: ReplayCallbacks>(&mut self, callbacks: &mut C) -> bool {
        if self.phase != ReplayPhase::NotStarted {
            log::debug!("Replay already ran (phase {:?}), skipping", self.phase);
            return false;
        }
        self.phase = ReplayPhase::Replaying;

        let state = match self.store.load() {
            Some(state) => state,
            None => {
                self.phase = ReplayPhase::Done;
                return false;
            }
        };

        log::info!(
            "Replaying session: action={:?} selected={:?} pinned={}",
            state.action,
            state.selected_entity_type,
            state.pinned_nodes.len()
        );

        // The selected entity type applies whenever present, regardless of
        // which branch follows.
        if let Some(label) = state.selected_entity_type {
            callbacks.set_selected_entity_type(label).await;
        }

        // A non-empty pinned set wins over the recorded action, terminally.
        if !state.pinned_nodes.is_empty() {
            pin_and_explore(callbacks, &state.pinned_nodes).await;
            self.phase = ReplayPhase::Done;
            return true;
        }

        if let Some(action) = state.action {
            match action {
                GraphAction::EntitySelect { label } => {
                    callbacks.load_entity_nodes(label).await;
                }
                GraphAction::Search { query, label } => {
                    callbacks.search_nodes(&query, label).await;
                }
                GraphAction::SemanticSearch { query, label } => {
                    callbacks.semantic_search(&query, label).await;
                }
                GraphAction::Explore { uuid } => {
                    callbacks.explore_node(&uuid).await;
                }
                GraphAction::Lineage { uuid } => {
                    callbacks.load_lineage(&uuid).await;
                }
                GraphAction::Pinned { uuids } => {
                    if !uuids.is_empty() {
                        pin_and_explore(callbacks, &uuids).await;
                    }
                }
            }
        }

        self.phase = ReplayPhase::Done;
        true
    }
}

/// Set the pinned working set, then explore each pinned node in array order.
async fn pin_and_explore<C: ReplayCallbacks>(callbacks: &mut C, uuids: &[String]) {
    callbacks.set_pinned_nodes(uuids).await;
    for uuid in uuids {
        callbacks.explore_node(uuid).await;
    }
}
