use std::collections::BTreeSet;

use topomap::graph::assemble;
use topomap::schema::{ColumnSchema, ForeignKeyRef, IndexSchema, SchemaDescription, TableSchema};
use topomap::types::{
    EdgeKind, ExtractionRecord, Language, NodeKind, SqlStatement, StatementType,
};

fn record(path: &str, imports: &[&str], sql: &[(&str, Option<StatementType>, &str, u32)]) -> ExtractionRecord {
    ExtractionRecord {
        path: path.to_string(),
        language: Language::Python,
        imports: imports.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
        sql_statements: sql
            .iter()
            .map(|(text, statement_type, table, line)| SqlStatement {
                text: text.to_string(),
                statement_type: *statement_type,
                table: Some(table.to_string()),
                line: *line,
            })
            .collect(),
        db_call_sites: Vec::new(),
        line_count: 10,
        error: None,
    }
}

fn users_schema() -> SchemaDescription {
    SchemaDescription {
        tables: vec![
            TableSchema {
                name: "users".to_string(),
                columns: vec![
                    ColumnSchema {
                        name: "id".to_string(),
                        column_type: "integer".to_string(),
                        foreign_key: None,
                    },
                    ColumnSchema {
                        name: "email".to_string(),
                        column_type: "text".to_string(),
                        foreign_key: None,
                    },
                ],
                indexes: vec![IndexSchema {
                    name: "users_email_idx".to_string(),
                    columns: vec!["email".to_string()],
                }],
            },
            TableSchema {
                name: "orders".to_string(),
                columns: vec![
                    ColumnSchema {
                        name: "id".to_string(),
                        column_type: "integer".to_string(),
                        foreign_key: None,
                    },
                    ColumnSchema {
                        name: "user_id".to_string(),
                        column_type: "integer".to_string(),
                        foreign_key: Some(ForeignKeyRef {
                            table: "users".to_string(),
                            column: "id".to_string(),
                        }),
                    },
                ],
                indexes: vec![],
            },
        ],
    }
}

#[test]
fn test_all_nodes_exist_before_edges() {
    // The importing record comes first; the edge still resolves because
    // nodes are created in a separate pass.
    let records = vec![
        record("a.py", &["b"], &[]),
        record("b.py", &[], &[]),
    ];
    let graph = assemble(&records, &SchemaDescription::empty());
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    let (source, target, data) = graph.edges().next().unwrap();
    assert_eq!(source.id, "module:a.py");
    assert_eq!(target.id, "module:b.py");
    assert_eq!(data.kind, EdgeKind::Imports);
}

#[test]
fn test_failed_records_still_become_nodes() {
    let records = vec![ExtractionRecord::failed(
        "broken.py",
        Language::Python,
        42,
        "tree-sitter parse returned None".to_string(),
    )];
    let graph = assemble(&records, &SchemaDescription::empty());
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.has_node("module:broken.py"));
}

#[test]
fn test_schema_tables_become_nodes_with_counts() {
    let graph = assemble(&[], &users_schema());
    assert!(graph.has_node("table:users"));
    assert!(graph.has_node("table:orders"));

    let users = graph.node(graph.node_index("table:users").unwrap());
    assert_eq!(users.kind, NodeKind::Table);
    let json = serde_json::to_value(&users.metadata).unwrap();
    assert_eq!(json["columns"], 2);
    assert_eq!(json["indexes"], 1);
}

#[test]
fn test_foreign_keys_become_reference_edges() {
    let graph = assemble(&[], &users_schema());
    assert_eq!(graph.edge_count(), 1);
    let (source, target, data) = graph.edges().next().unwrap();
    assert_eq!(source.id, "table:orders");
    assert_eq!(target.id, "table:users");
    assert_eq!(data.kind, EdgeKind::References);
    let json = serde_json::to_value(&data.metadata).unwrap();
    assert_eq!(json["column"], "user_id");
}

#[test]
fn test_foreign_key_to_missing_table_is_dropped() {
    let schema = SchemaDescription {
        tables: vec![TableSchema {
            name: "orders".to_string(),
            columns: vec![ColumnSchema {
                name: "user_id".to_string(),
                column_type: "integer".to_string(),
                foreign_key: Some(ForeignKeyRef {
                    table: "users".to_string(),
                    column: "id".to_string(),
                }),
            }],
            indexes: vec![],
        }],
    };
    let graph = assemble(&[], &schema);
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_sql_statement_becomes_uses_edge() {
    let records = vec![record(
        "repo.py",
        &[],
        &[("SELECT * FROM users", Some(StatementType::Select), "users", 12)],
    )];
    let graph = assemble(&records, &users_schema());
    let uses: Vec<_> = graph
        .edges()
        .filter(|(_, _, d)| d.kind == EdgeKind::Uses)
        .collect();
    assert_eq!(uses.len(), 1);
    let (source, target, data) = &uses[0];
    assert_eq!(source.id, "module:repo.py");
    assert_eq!(target.id, "table:users");
    let json = serde_json::to_value(&data.metadata).unwrap();
    assert_eq!(json["query_type"], "SELECT");
    assert_eq!(json["line"], 12);
}

#[test]
fn test_sql_naming_unknown_table_adds_no_edge() {
    let records = vec![record(
        "repo.py",
        &[],
        &[("SELECT * FROM ghosts", Some(StatementType::Select), "ghosts", 3)],
    )];
    let graph = assemble(&records, &users_schema());
    assert!(graph
        .edges()
        .all(|(_, _, d)| d.kind != EdgeKind::Uses));
}

#[test]
fn test_first_statement_per_pair_wins() {
    let records = vec![record(
        "repo.py",
        &[],
        &[
            ("SELECT * FROM users", Some(StatementType::Select), "users", 3),
            ("DELETE FROM users", Some(StatementType::Delete), "users", 9),
        ],
    )];
    let graph = assemble(&records, &users_schema());
    let uses: Vec<_> = graph
        .edges()
        .filter(|(_, _, d)| d.kind == EdgeKind::Uses)
        .collect();
    assert_eq!(uses.len(), 1);
    let json = serde_json::to_value(&uses[0].2.metadata).unwrap();
    assert_eq!(json["line"], 3);
}

#[test]
fn test_unresolved_import_adds_no_edge() {
    let records = vec![record("a.py", &["requests"], &[])];
    let graph = assemble(&records, &SchemaDescription::empty());
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_import_resolution_across_directories() {
    let records = vec![
        record("src/app/main.py", &["src.app.db"], &[]),
        record("src/app/db.py", &[], &[]),
    ];
    let graph = assemble(&records, &SchemaDescription::empty());
    assert_eq!(graph.edge_count(), 1);
    let (source, target, _) = graph.edges().next().unwrap();
    assert_eq!(source.id, "module:src/app/main.py");
    assert_eq!(target.id, "module:src/app/db.py");
}

#[test]
fn test_relative_js_import_resolution() {
    let mut a = record("lib/index.js", &["./util.js"], &[]);
    a.language = Language::JavaScript;
    let mut b = record("lib/util.js", &[], &[]);
    b.language = Language::JavaScript;
    let graph = assemble(&[a, b], &SchemaDescription::empty());
    // "./util.js" normalizes to "util", not "lib.util"; relative targets
    // resolve only when they spell out the full path from the root.
    assert_eq!(graph.edge_count(), 0);

    let records = vec![
        {
            let mut r = record("lib/index.js", &["lib/util"], &[]);
            r.language = Language::JavaScript;
            r
        },
        {
            let mut r = record("lib/util.js", &[], &[]);
            r.language = Language::JavaScript;
            r
        },
    ];
    let graph = assemble(&records, &SchemaDescription::empty());
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_self_import_adds_no_edge() {
    let records = vec![record("a.py", &["a"], &[])];
    let graph = assemble(&records, &SchemaDescription::empty());
    assert_eq!(graph.edge_count(), 0);
}
