//! Canonical graph ownership
//!
//! The store holds the one canonical copy of the current flowchart. The
//! input surface writes it with [`GraphStore::replace`] after a successful
//! generation; the canvas keeps its own working copy and commits edits back
//! with [`GraphStore::merge_local_edit`]. Only `replace` advances the
//! revision, which is what tells the canvas to resynchronize.

use super::graph::Graph;

#[derive(Debug, Default)]
pub struct GraphStore {
    graph: Graph,
    revision: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Incremented on every wholesale replacement
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Swap in a freshly generated graph. Never merges with the old one.
    pub fn replace(&mut self, graph: Graph) -> u64 {
        log::info!(
            "Replacing flowchart: {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        self.graph = graph;
        self.revision += 1;
        self.revision
    }

    /// Commit the canvas working copy without signalling a new generation
    pub fn merge_local_edit(&mut self, working: &Graph) {
        self.graph.clone_from(working);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowchart::graph::{FlowNode, Position};

    fn graph_with(labels: &[&str]) -> Graph {
        let mut graph = Graph::new();
        for (i, label) in labels.iter().enumerate() {
            graph
                .nodes
                .push(FlowNode::new(format!("node_{i}"), *label, Position::default()));
        }
        graph
    }

    #[test]
    fn test_replace_bumps_revision() {
        let mut store = GraphStore::new();
        assert_eq!(store.revision(), 0);
        assert!(store.is_empty());

        store.replace(graph_with(&["A", "B"]));
        assert_eq!(store.revision(), 1);
        store.replace(graph_with(&["C"]));
        assert_eq!(store.revision(), 2);
        assert_eq!(store.graph().nodes.len(), 1);
    }

    #[test]
    fn test_merge_keeps_revision() {
        let mut store = GraphStore::new();
        store.replace(graph_with(&["A"]));

        let mut working = store.graph().clone();
        working.nodes[0].position = Position::new(10.0, 20.0);
        store.merge_local_edit(&working);

        assert_eq!(store.revision(), 1);
        assert_eq!(store.graph().nodes[0].position, Position::new(10.0, 20.0));
    }
}
