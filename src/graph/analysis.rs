//! Structural analysis over the assembled dependency graph.
//!
//! Computes density, degree and betweenness centrality, single points of
//! failure and elementary circuits. Analysis never fails: degenerate
//! graphs (empty, single node, no edges) produce zeroed metrics and empty
//! findings.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::DependencyGraph;
use crate::types::{EdgeData, GraphNode, RiskLevel, SpofRecord};

/// Betweenness centrality above this marks a node as a SPOF candidate.
pub const SPOF_THRESHOLD: f64 = 0.1;

/// Betweenness centrality above this escalates a SPOF to high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.3;

/// Whole-graph scalar metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub max_degree_centrality: f64,
    pub max_betweenness_centrality: f64,
}

/// Everything the analysis pass derives from one graph.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralReport {
    pub metrics: GraphMetrics,
    pub spofs: Vec<SpofRecord>,
    pub cycles: Vec<Vec<String>>,
}

/// Runs the full analysis pass over a graph.
pub fn analyze(graph: &DependencyGraph) -> StructuralReport {
    let betweenness = betweenness_centrality(graph);
    let degrees = degree_centrality(graph);
    let spofs = detect_spofs(graph, &betweenness);
    let cycles = find_cycles(graph);

    let metrics = GraphMetrics {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        density: density(graph),
        max_degree_centrality: degrees.iter().copied().fold(0.0, f64::max),
        max_betweenness_centrality: betweenness.iter().copied().fold(0.0, f64::max),
    };

    debug!(
        spofs = spofs.len(),
        cycles = cycles.len(),
        density = metrics.density,
        "structural analysis complete"
    );

    StructuralReport {
        metrics,
        spofs,
        cycles,
    }
}

/// Directed density: edges over the `n * (n - 1)` possible ordered pairs.
/// Zero for graphs with fewer than two nodes.
pub fn density(graph: &DependencyGraph) -> f64 {
    let n = graph.node_count();
    if n < 2 {
        return 0.0;
    }
    graph.edge_count() as f64 / (n as f64 * (n as f64 - 1.0))
}

/// Degree centrality per node: total degree over `n - 1`, indexed by
/// petgraph node index.
pub fn degree_centrality(graph: &DependencyGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n < 2 {
        return vec![0.0; n];
    }
    graph
        .inner()
        .node_indices()
        .map(|i| graph.degree(i) as f64 / (n as f64 - 1.0))
        .collect()
}

/// Betweenness centrality per node (Brandes, unweighted BFS variant),
/// indexed by petgraph node index.
///
/// Normalized by `(n - 1) * (n - 2)` for graphs with more than two nodes,
/// the ordered-pair count for a directed graph.
pub fn betweenness_centrality(graph: &DependencyGraph) -> Vec<f64> {
    let g = graph.inner();
    let n = g.node_count();
    let mut centrality = vec![0.0f64; n];

    for s in g.node_indices() {
        let mut stack: Vec<NodeIndex> = Vec::new();
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist = vec![-1i64; n];
        sigma[s.index()] = 1.0;
        dist[s.index()] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for w in g.neighbors(v) {
                if dist[w.index()] < 0 {
                    dist[w.index()] = dist[v.index()] + 1;
                    queue.push_back(w);
                }
                if dist[w.index()] == dist[v.index()] + 1 {
                    sigma[w.index()] += sigma[v.index()];
                    preds[w.index()].push(v.index());
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w.index()] {
                delta[v] += (sigma[v] / sigma[w.index()]) * (1.0 + delta[w.index()]);
            }
            if w != s {
                centrality[w.index()] += delta[w.index()];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n as f64 - 1.0) * (n as f64 - 2.0));
        for c in centrality.iter_mut() {
            *c *= scale;
        }
    }
    centrality
}

/// Flags nodes whose betweenness centrality exceeds the SPOF threshold.
///
/// Results are ordered by descending centrality, node id as the
/// tiebreaker, so reports are stable across runs.
pub fn detect_spofs(graph: &DependencyGraph, betweenness: &[f64]) -> Vec<SpofRecord> {
    let mut spofs: Vec<SpofRecord> = graph
        .inner()
        .node_indices()
        .filter(|i| betweenness[i.index()] > SPOF_THRESHOLD)
        .map(|i| {
            let node = graph.node(i);
            let centrality = betweenness[i.index()];
            SpofRecord {
                node_id: node.id.clone(),
                kind: node.kind,
                name: node.name.clone(),
                betweenness_centrality: centrality,
                degree: graph.degree(i),
                risk_level: if centrality > HIGH_RISK_THRESHOLD {
                    RiskLevel::High
                } else {
                    RiskLevel::Medium
                },
            }
        })
        .collect();

    spofs.sort_by(|a, b| {
        b.betweenness_centrality
            .partial_cmp(&a.betweenness_centrality)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
    spofs
}

/// Enumerates elementary circuits of length two or more (Johnson's
/// algorithm over Tarjan components). Self-loops are not reported.
///
/// Each circuit appears exactly once, as the node-id path starting from
/// its lowest-index member.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let g = graph.inner();
    let mut circuits: Vec<Vec<NodeIndex>> = Vec::new();

    for mut component in tarjan_scc(g) {
        if component.len() < 2 {
            continue;
        }
        component.sort();
        for (i, &start) in component.iter().enumerate() {
            let allowed: HashSet<NodeIndex> = component[i..].iter().copied().collect();
            let mut state = CircuitState {
                blocked: HashSet::new(),
                block_map: HashMap::new(),
                path: Vec::new(),
            };
            circuit(g, start, start, &allowed, &mut state, &mut circuits);
        }
    }

    let mut cycles: Vec<Vec<String>> = circuits
        .iter()
        .map(|path| path.iter().map(|&i| g[i].id.clone()).collect())
        .collect();
    cycles.sort();
    cycles
}

struct CircuitState {
    blocked: HashSet<NodeIndex>,
    block_map: HashMap<NodeIndex, HashSet<NodeIndex>>,
    path: Vec<NodeIndex>,
}

fn circuit(
    g: &DiGraph<GraphNode, EdgeData>,
    v: NodeIndex,
    start: NodeIndex,
    allowed: &HashSet<NodeIndex>,
    state: &mut CircuitState,
    circuits: &mut Vec<Vec<NodeIndex>>,
) -> bool {
    let mut found = false;
    state.path.push(v);
    state.blocked.insert(v);

    let neighbors: Vec<NodeIndex> = g.neighbors(v).filter(|w| allowed.contains(w)).collect();
    for &w in &neighbors {
        if w == start {
            if state.path.len() > 1 {
                circuits.push(state.path.clone());
            }
            found = true;
        } else if !state.blocked.contains(&w) && circuit(g, w, start, allowed, state, circuits) {
            found = true;
        }
    }

    if found {
        unblock(v, &mut state.blocked, &mut state.block_map);
    } else {
        for &w in &neighbors {
            state.block_map.entry(w).or_default().insert(v);
        }
    }

    state.path.pop();
    found
}

fn unblock(
    v: NodeIndex,
    blocked: &mut HashSet<NodeIndex>,
    block_map: &mut HashMap<NodeIndex, HashSet<NodeIndex>>,
) {
    blocked.remove(&v);
    if let Some(dependents) = block_map.remove(&v) {
        for w in dependents {
            if blocked.contains(&w) {
                unblock(w, blocked, block_map);
            }
        }
    }
}
