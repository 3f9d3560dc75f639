/// Tree-sitter based Java extractor.
use tree_sitter::Node as TsNode;

use crate::extraction::{self, sql, LanguageExtractor};
use crate::types::{DbCallSite, ExtractionRecord, Language};

/// Extracts imports, SQL literals and DB call-sites from Java sources.
pub struct JavaExtractor;

/// Method names treated as database API calls (JDBC and JPA verbs).
const DB_CALL_ALLOWLIST: &[&str] = &[
    "execute",
    "executeQuery",
    "executeUpdate",
    "prepareStatement",
    "createQuery",
];

impl JavaExtractor {
    /// Extracts a single Java file into an extraction record.
    pub fn extract(path: &str, source: &str) -> ExtractionRecord {
        let mut record = ExtractionRecord::new(path, Language::Java, source);
        let tree = match extraction::parse_source(tree_sitter_java::LANGUAGE.into(), source) {
            Ok(tree) => tree,
            Err(msg) => {
                return ExtractionRecord::failed(path, Language::Java, record.line_count, msg)
            }
        };
        Self::visit(tree.root_node(), source.as_bytes(), &mut record);
        record
    }

    fn visit(node: TsNode<'_>, src: &[u8], record: &mut ExtractionRecord) {
        match node.kind() {
            "import_declaration" => {
                Self::collect_import_target(node, src, record);
                return;
            }
            "string_literal" => {
                let raw = extraction::node_text(node, src);
                if let Some(stmt) =
                    sql::scan_literal(sql::strip_quotes(&raw), extraction::node_line(node))
                {
                    record.sql_statements.push(stmt);
                }
                return;
            }
            "method_invocation" => {
                if let Some(name_node) = node.child_by_field_name("name") {
                    let name = extraction::node_text(name_node, src);
                    if DB_CALL_ALLOWLIST.contains(&name.as_str()) {
                        record.db_call_sites.push(DbCallSite {
                            name,
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

    /// Records the package path of an `import a.b.C;` declaration.
    fn collect_import_target(node: TsNode<'_>, src: &[u8], record: &mut ExtractionRecord) {
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if matches!(child.kind(), "scoped_identifier" | "identifier") {
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

impl LanguageExtractor for JavaExtractor {
    fn language(&self) -> Language {
        Language::Java
    }

    fn verify_grammar(&self) -> Result<(), String> {
        extraction::check_grammar(tree_sitter_java::LANGUAGE.into())
    }

    fn extract(&self, path: &str, source: &str) -> ExtractionRecord {
        JavaExtractor::extract(path, source)
    }
}
