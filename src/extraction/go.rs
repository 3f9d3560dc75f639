/// Tree-sitter based Go extractor.
use tree_sitter::Node as TsNode;

use crate::extraction::{self, sql, LanguageExtractor};
use crate::types::{DbCallSite, ExtractionRecord, Language};

/// Extracts imports, SQL literals and DB call-sites from Go sources.
pub struct GoExtractor;

/// Method names treated as database API calls (database/sql verbs).
const DB_CALL_ALLOWLIST: &[&str] = &[
    "Query",
    "QueryRow",
    "QueryContext",
    "Exec",
    "ExecContext",
    "Prepare",
];

impl GoExtractor {
    /// Extracts a single Go file into an extraction record.
    pub fn extract(path: &str, source: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::new(path, Language::Go, source);
        let tree = match extraction::parse_source(tree_sitter_go::LANGUAGE.into(), source) {
            Ok(tree) => tree,
            Err(msg) => return ExtractionRecord::failed(path, Language::Go, record.line_count, msg),
        };
        Self::visit(tree.root_node(), source.as_bytes(), &mut record);
        record
    }

    fn visit(node: TsNode<'_>, src: &[u8], record: &mut ExtractionRecord) {
        match node.kind() {
            "import_spec" => {
                // Import paths are quoted strings but never SQL; do not
                // descend into them.
                if let Some(path_node) = node.child_by_field_name("path") {
                    let raw = extraction::node_text(path_node, src);
                    record.imports.insert(sql::strip_quotes(&raw).to_string());
                }
                return;
            }
            "interpreted_string_literal" | "raw_string_literal" => {
                let raw = extraction::node_text(node, src);
                if let Some(stmt) =
                    sql::scan_literal(sql::strip_quotes(&raw), extraction::node_line(node))
                {
                    record.sql_statements.push(stmt);
                }
                return;
            }
            "call_expression" => {
                if let Some(function) = node.child_by_field_name("function") {
                    if function.kind() == "selector_expression" {
                        if let Some(field) = function.child_by_field_name("field") {
                            let name = extraction::node_text(field, src);
                            if DB_CALL_ALLOWLIST.contains(&name.as_str()) {
                                record.db_call_sites.push(DbCallSite {
                                    name,
                                    line: extraction::node_line(node),
                                });
                            }
                        }
                    }
                }
                // Fall through: argument lists carry the SQL literals.
            }
            _ => {}
        }

        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                Self::visit(cursor.node(), src, record);
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
    }
}

impl LanguageExtractor for GoExtractor {
    fn language(&self) -> Language {
        Language::Go
    }

    fn verify_grammar(&self) -> Result<(), String> {
        extraction::check_grammar(tree_sitter_go::LANGUAGE.into())
    }

    fn extract(&self, path: &str, source: &str) -> ExtractionRecord {
        GoExtractor::extract(path, source)
    }
}
