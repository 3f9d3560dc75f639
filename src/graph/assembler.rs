//! Two-phase graph assembly.
//!
//! Phase one materializes every node (modules from extraction records,
//! tables from the schema snapshot); phase two adds edges. No edge is
//! written before every node exists, so edge insertion order can never
//! depend on file iteration order.

use std::collections::HashMap;

use tracing::debug;

use crate::graph::DependencyGraph;
use crate::schema::SchemaDescription;
use crate::types::{
    module_id, table_id, EdgeData, EdgeKind, EdgeMetadata, ExtractionRecord, GraphNode, NodeKind,
    NodeMetadata,
};

/// Assembles the dependency graph from extraction records and a schema
/// snapshot.
pub fn assemble(records: &[ExtractionRecord], schema: &SchemaDescription) -> DependencyGraph {
    let mut graph = DependencyGraph::new();

    // Phase 1: nodes. Files whose extraction failed still become nodes;
    // they carry no edges but stay visible in the topology.
    for record in records {
        graph.add_node(GraphNode {
            id: module_id(&record.path),
            kind: NodeKind::Module,
            name: record.path.clone(),
            metadata: NodeMetadata::Module {
                lines: record.line_count,
                language: record.language,
            },
        });
    }
    for table in &schema.tables {
        graph.add_node(GraphNode {
            id: table_id(&table.name),
            kind: NodeKind::Table,
            name: table.name.clone(),
            metadata: NodeMetadata::Table {
                columns: table.columns.len(),
                indexes: table.indexes.len(),
            },
        });
    }

    // Phase 2: edges. Both endpoints must already exist; anything that
    // fails to resolve is dropped silently.
    add_reference_edges(&mut graph, schema);
    let module_index = build_module_index(records);
    for record in records {
        add_usage_edges(&mut graph, record);
        add_import_edges(&mut graph, record, &module_index);
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "assembled dependency graph"
    );
    graph
}

/// Table-to-table `references` edges from foreign key columns.
fn add_reference_edges(graph: &mut DependencyGraph, schema: &SchemaDescription) {
    for table in &schema.tables {
        for column in &table.columns {
            let Some(fk) = &column.foreign_key else {
                continue;
            };
            let source = table_id(&table.name);
            let target = table_id(&fk.table);
            let added = graph.add_edge(
                &source,
                &target,
                EdgeData {
                    kind: EdgeKind::References,
                    metadata: EdgeMetadata::References {
                        column: column.name.clone(),
                    },
                },
            );
            if !added {
                debug!(%source, %target, "foreign key target not in schema; dropped");
            }
        }
    }
}

/// Module-to-table `uses` edges from attributed SQL statements.
fn add_usage_edges(graph: &mut DependencyGraph, record: &ExtractionRecord) {
    let source = module_id(&record.path);
    for stmt in &record.sql_statements {
        let Some(table) = &stmt.table else {
            continue;
        };
        let target = table_id(table);
        if !graph.has_node(&target) {
            debug!(
                %source,
                %table,
                "SQL statement names a table outside the schema; dropped"
            );
            continue;
        }
        graph.add_edge(
            &source,
            &target,
            EdgeData {
                kind: EdgeKind::Uses,
                metadata: EdgeMetadata::Uses {
                    query_type: stmt.statement_type,
                    line: stmt.line,
                },
            },
        );
    }
}

/// Module-to-module `imports` edges, resolved against the canonical
/// module-name index.
fn add_import_edges(
    graph: &mut DependencyGraph,
    record: &ExtractionRecord,
    module_index: &HashMap<String, String>,
) {
    let source = module_id(&record.path);
    for import in &record.imports {
        let normalized = normalize_import_target(import);
        let Some(target) = module_index.get(&normalized) else {
            // External package or unresolved relative path; no edge.
            continue;
        };
        if *target == source {
            continue;
        }
        graph.add_edge(
            &source,
            target,
            EdgeData {
                kind: EdgeKind::Imports,
                metadata: EdgeMetadata::Imports {
                    import: import.clone(),
                },
            },
        );
    }
}

/// Maps canonical module names to their node ids.
fn build_module_index(records: &[ExtractionRecord]) -> HashMap<String, String> {
    records
        .iter()
        .map(|r| (canonical_module_name(&r.path), module_id(&r.path)))
        .collect()
}

/// Canonical dotted name of a module file: path separators become dots
/// and the extension drops, so `src/app/db.py` resolves as `src.app.db`.
pub fn canonical_module_name(path: &str) -> String {
    let trimmed = path.trim_start_matches("./");
    let stem = match trimmed.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => trimmed,
    };
    stem.replace(['/', '\\'], ".")
}

/// Normalizes a raw import target into the canonical dotted form used by
/// the module index.
fn normalize_import_target(target: &str) -> String {
    let trimmed = target.trim_start_matches("./");
    let mut dotted = trimmed.replace(['/', '\\'], ".");
    for ext in [".py", ".js", ".jsx", ".ts", ".tsx", ".cs", ".java", ".go"] {
        if trimmed.ends_with(ext) {
            dotted.truncate(dotted.len() - ext.len());
            break;
        }
    }
    dotted
}
