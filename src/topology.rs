//! The topology snapshot artifact.
//!
//! An immutable, serializable summary of one analysis run: every node and
//! edge of the dependency graph, the structural findings, and whole-graph
//! statistics. Field names here are the external contract; downstream
//! consumers parse the JSON form directly.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::Result;
use crate::graph::{self, analysis};
use crate::schema::SchemaDescription;
use crate::types::{EdgeKind, EdgeMetadata, ExtractionRecord, GraphNode, NodeKind, SpofRecord};

/// One edge of the snapshot, with endpoints flattened to node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub metadata: EdgeMetadata,
}

/// Whole-graph statistics block of the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Count of module nodes.
    pub modules: usize,
    /// Count of table nodes.
    pub tables: usize,
    pub spof_count: usize,
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub max_degree_centrality: f64,
    pub max_betweenness_centrality: f64,
}

/// The complete topology artifact for one repository snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<SnapshotEdge>,
    pub spofs: Vec<SpofRecord>,
    pub circular_dependencies: Vec<Vec<String>>,
    pub statistics: TopologyStatistics,
}

impl TopologySnapshot {
    /// Builds a snapshot from extraction records and a schema description:
    /// assembles the graph, runs the analysis pass and flattens the result.
    pub fn build(records: &[ExtractionRecord], schema: &SchemaDescription) -> Self {
        let graph = graph::assemble(records, schema);
        let report = analysis::analyze(&graph);

        let nodes: Vec<GraphNode> = graph.nodes().cloned().collect();
        let edges: Vec<SnapshotEdge> = graph
            .edges()
            .map(|(source, target, data)| SnapshotEdge {
                source: source.id.clone(),
                target: target.id.clone(),
                kind: data.kind,
                metadata: data.metadata.clone(),
            })
            .collect();

        let modules = nodes.iter().filter(|n| n.kind == NodeKind::Module).count();
        let tables = nodes.iter().filter(|n| n.kind == NodeKind::Table).count();

        let statistics = TopologyStatistics {
            total_nodes: report.metrics.node_count,
            total_edges: report.metrics.edge_count,
            modules,
            tables,
            spof_count: report.spofs.len(),
            node_count: report.metrics.node_count,
            edge_count: report.metrics.edge_count,
            density: report.metrics.density,
            max_degree_centrality: report.metrics.max_degree_centrality,
            max_betweenness_centrality: report.metrics.max_betweenness_centrality,
        };

        info!(
            nodes = statistics.total_nodes,
            edges = statistics.total_edges,
            spofs = statistics.spof_count,
            cycles = report.cycles.len(),
            "topology snapshot built"
        );

        Self {
            nodes,
            edges,
            spofs: report.spofs,
            circular_dependencies: report.cycles,
            statistics,
        }
    }

    /// Serializes the snapshot to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the JSON form of the snapshot to a file.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Renders a human-readable markdown digest of the snapshot.
    pub fn markdown_summary(&self) -> String {
        let mut out = String::new();
        out.push_str("# Dependency Topology\n\n");

        out.push_str("## Summary\n\n");
        out.push_str(&format!("- Modules: {}\n", self.statistics.modules));
        out.push_str(&format!("- Tables: {}\n", self.statistics.tables));
        out.push_str(&format!("- Edges: {}\n", self.statistics.total_edges));
        out.push_str(&format!(
            "- Single points of failure: {}\n",
            self.statistics.spof_count
        ));
        out.push_str(&format!(
            "- Circular dependencies: {}\n",
            self.circular_dependencies.len()
        ));

        out.push_str("\n## Graph Metrics\n\n");
        out.push_str(&format!("- Density: {:.4}\n", self.statistics.density));
        out.push_str(&format!(
            "- Max degree centrality: {:.4}\n",
            self.statistics.max_degree_centrality
        ));
        out.push_str(&format!(
            "- Max betweenness centrality: {:.4}\n",
            self.statistics.max_betweenness_centrality
        ));

        if !self.spofs.is_empty() {
            out.push_str("\n## Single Points of Failure\n\n");
            out.push_str("| Node | Type | Centrality | Degree | Risk |\n");
            out.push_str("|------|------|-----------:|-------:|------|\n");
            for spof in self.spofs.iter().take(10) {
                out.push_str(&format!(
                    "| {} | {} | {:.4} | {} | {} |\n",
                    spof.name,
                    spof.kind.as_str(),
                    spof.betweenness_centrality,
                    spof.degree,
                    spof.risk_level.as_str()
                ));
            }
        }

        if !self.circular_dependencies.is_empty() {
            out.push_str("\n## Circular Dependencies\n\n");
            for cycle in self.circular_dependencies.iter().take(5) {
                let mut closed = cycle.clone();
                if let Some(first) = cycle.first() {
                    closed.push(first.clone());
                }
                out.push_str(&format!("- {}\n", closed.join(" \u{2192} ")));
            }
        }

        out
    }

    /// Writes the markdown digest to a file.
    pub fn write_markdown(&self, path: &Path) -> Result<()> {
        fs::write(path, self.markdown_summary())?;
        Ok(())
    }
}
