/// Tree-sitter based C# extractor.
use tree_sitter::Node as TsNode;

use crate::extraction::{self, sql, LanguageExtractor};
use crate::types::{DbCallSite, ExtractionRecord, Language};

/// Extracts imports, SQL literals and DB call-sites from C# sources.
pub struct CSharpExtractor;

/// Method names treated as database API calls (ADO.NET verbs).
const DB_CALL_ALLOWLIST: &[&str] = &["ExecuteReader", "ExecuteNonQuery", "ExecuteScalar"];

impl CSharpExtractor {
    /// Extracts a single C# file into an extraction record.
    pub fn extract(path: &str, source: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::new(path, Language::CSharp, source);
        let tree = match extraction::parse_source(tree_sitter_c_sharp::LANGUAGE.into(), source) {
            Ok(tree) => tree,
            Err(msg) => {
                return ExtractionRecord::failed(path, Language::CSharp, record.line_count, msg)
            }
        };
        Self::visit(tree.root_node(), source.as_bytes(), &mut record);
        record
    }

    fn visit(node: TsNode<'_>, src: &[u8], record: &mut ExtractionRecord) {
        match node.kind() {
            "using_directive" => {
                Self::collect_using_target(node, src, record);
                return;
            }
            "string_literal" | "verbatim_string_literal" | "interpolated_string_expression"
            | "raw_string_literal" => {
                let raw = extraction::node_text(node, src);
                if let Some(stmt) =
                    sql::scan_literal(sql::strip_quotes(&raw), extraction::node_line(node))
                {
                    record.sql_statements.push(stmt);
                }
                return;
            }
            "invocation_expression" => {
                if let Some(function) = node.child_by_field_name("function") {
                    if function.kind() == "member_access_expression" {
                        if let Some(name_node) = function.child_by_field_name("name") {
                            let name = extraction::node_text(name_node, src);
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

    /// Records the namespace path of a `using A.B.C;` directive.
    fn collect_using_target(node: TsNode<'_>, src: &[u8], record: &mut ExtractionRecord) {
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if matches!(child.kind(), "qualified_name" | "identifier") {
                    record.imports.insert(extraction::node_text(child, src));
                    break;
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
    }
}

impl LanguageExtractor for CSharpExtractor {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn verify_grammar(&self) -> Result<(), String> {
        extraction::check_grammar(tree_sitter_c_sharp::LANGUAGE.into())
    }

    fn extract(&self, path: &str, source: &str) -> ExtractionRecord {
        CSharpExtractor::extract(path, source)
    }
}
