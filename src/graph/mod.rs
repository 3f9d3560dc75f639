//! Dependency graph container and the passes that build and analyze it.
//!
//! The graph is a directed petgraph with string-id lookup on the side.
//! Nodes are modules and tables; edges are `uses`, `references` and
//! `imports` relationships.

pub mod analysis;
pub mod assembler;

pub use analysis::{analyze, GraphMetrics, StructuralReport};
pub use assembler::assemble;

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::types::{EdgeData, GraphNode};

/// A directed dependency graph keyed by namespaced node ids.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<GraphNode, EdgeData>,
    ids: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, keyed by its id. A second insert with the same id
    /// is a no-op; the existing node wins.
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&index) = self.ids.get(&node.id) {
            return index;
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.ids.insert(id, index);
        index
    }

    /// Inserts an edge between two existing nodes.
    ///
    /// Returns `false` without inserting when either endpoint is missing
    /// or an edge between the pair already exists (first write wins).
    pub fn add_edge(&mut self, source_id: &str, target_id: &str, data: EdgeData) -> bool {
        let (Some(&source), Some(&target)) = (self.ids.get(source_id), self.ids.get(target_id))
        else {
            return false;
        };
        if self.graph.find_edge(source, target).is_some() {
            return false;
        }
        self.graph.add_edge(source, target, data);
        true
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Returns the petgraph index of a node id.
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    pub fn node(&self, index: NodeIndex) -> &GraphNode {
        &self.graph[index]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Iterates over all edges as (source, target, data) triples.
    pub fn edges(&self) -> impl Iterator<Item = (&GraphNode, &GraphNode, &EdgeData)> {
        self.graph.edge_references().map(|e| {
            (
                &self.graph[e.source()],
                &self.graph[e.target()],
                e.weight(),
            )
        })
    }

    /// Total degree of a node, counting both directions.
    pub fn degree(&self, index: NodeIndex) -> usize {
        self.graph.edges_directed(index, Direction::Incoming).count()
            + self.graph.edges_directed(index, Direction::Outgoing).count()
    }

    /// The underlying petgraph, for algorithm passes.
    pub fn inner(&self) -> &DiGraph<GraphNode, EdgeData> {
        &self.graph
    }
}
