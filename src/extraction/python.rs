/// Tree-sitter based Python extractor.
use tree_sitter::Node as TsNode;

use crate::extraction::{self, sql, LanguageExtractor};
use crate::types::{DbCallSite, ExtractionRecord, Language};

/// Extracts imports, SQL literals and DB call-sites from Python sources.
pub struct PythonExtractor;

/// Callee names treated as database API calls in Python code (DB-API
/// cursors and the common ORM/driver verbs).
const DB_CALL_ALLOWLIST: &[&str] = &[
    "execute",
    "executemany",
    "query",
    "fetch",
    "fetchone",
    "fetchmany",
    "fetchall",
];

impl PythonExtractor {
    /// Extracts a single Python file into an extraction record.
    pub fn extract(path: &str, source: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::new(path, Language::Python, source);
        let tree = match extraction::parse_source(tree_sitter_python::LANGUAGE.into(), source) {
            Ok(tree) => tree,
            Err(msg) => {
                return ExtractionRecord::failed(path, Language::Python, record.line_count, msg)
            }
        };
        Self::visit(tree.root_node(), source.as_bytes(), &mut record);
        record
    }

    fn visit(node: TsNode<'_>, src: &[u8], record: &mut ExtractionRecord) {
        match node.kind() {
            "import_statement" => {
                Self::collect_import_targets(node, src, record);
                return;
            }
            "import_from_statement" => {
                // `from x.y import z` depends on module x.y; the imported
                // names are resolved inside that module, not here.
                if let Some(module) = node.child_by_field_name("module_name") {
                    record.imports.insert(extraction::node_text(module, src));
                }
                return;
            }
            "string" => {
                let raw = extraction::node_text(node, src);
                if let Some(stmt) =
                    sql::scan_literal(sql::strip_quotes(&raw), extraction::node_line(node))
                {
                    record.sql_statements.push(stmt);
                }
                return;
            }
            "call" => {
                if let Some(function) = node.child_by_field_name("function") {
                    let callee = extraction::node_text(function, src);
                    let name = callee.rsplit('.').next().unwrap_or("");
                    if DB_CALL_ALLOWLIST.contains(&name) {
                        record.db_call_sites.push(DbCallSite {
                            name: name.to_string(),
                            line: extraction::node_line(node),
                        });
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

    /// Collects targets of a plain `import a.b, c as d` statement.
    fn collect_import_targets(node: TsNode<'_>, src: &[u8], record: &mut ExtractionRecord) {
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                match child.kind() {
                    "dotted_name" => {
                        record.imports.insert(extraction::node_text(child, src));
                    }
                    "aliased_import" => {
                        if let Some(name) = child.child_by_field_name("name") {
                            record.imports.insert(extraction::node_text(name, src));
                        }
                    }
                    _ => {}
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
    }
}

impl LanguageExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn verify_grammar(&self) -> Result<(), String> {
        extraction::check_grammar(tree_sitter_python::LANGUAGE.into())
    }

    fn extract(&self, path: &str, source: &str) -> ExtractionRecord {
        PythonExtractor::extract(path, source)
    }
}
