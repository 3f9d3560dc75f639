/// Tree-sitter based JavaScript and TypeScript extractors.
///
/// Both languages share one tree walk; they differ only in the grammar
/// loaded (TSX files use the TSX variant of the TypeScript grammar).
use tree_sitter::Node as TsNode;

use crate::extraction::{self, sql, LanguageExtractor};
use crate::types::{DbCallSite, ExtractionRecord, Language};

/// Extracts imports, SQL literals and DB call-sites from JavaScript sources.
pub struct JavaScriptExtractor;

/// Extracts imports, SQL literals and DB call-sites from TypeScript sources.
pub struct TypeScriptExtractor;

/// Method names treated as database API calls (node-postgres, mysql2,
/// better-sqlite3 and knex verbs).
const DB_CALL_ALLOWLIST: &[&str] = &["query", "execute", "run", "all", "get"];

fn extract_with(
    grammar: tree_sitter::Language,
    language: Language,
    path: &str,
    source: &str,
) -> ExtractionRecord {
    let mut record = ExtractionRecord::new(path, language, source);
    let tree = match extraction::parse_source(grammar, source) {
        Ok(tree) => tree,
        Err(msg) => return ExtractionRecord::failed(path, language, record.line_count, msg),
    };
    visit(tree.root_node(), source.as_bytes(), &mut record);
    record
}

fn visit(node: TsNode<'_>, src: &[u8], record: &mut ExtractionRecord) {
    match node.kind() {
        "import_statement" => {
            // `import x from './y'` — the source string is an import path,
            // never SQL, so do not descend into it.
            if let Some(source_node) = node.child_by_field_name("source") {
                let raw = extraction::node_text(source_node, src);
                record.imports.insert(sql::strip_quotes(&raw).to_string());
            }
            return;
        }
        "string" | "template_string" => {
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
                if extraction::node_text(function, src) == "require" {
                    collect_require_target(node, src, record);
                    return;
                }
                if function.kind() == "member_expression" {
                    if let Some(property) = function.child_by_field_name("property") {
                        let name = extraction::node_text(property, src);
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
            visit(cursor.node(), src, record);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

/// Records the string argument of a `require('module')` call.
fn collect_require_target(call: TsNode<'_>, src: &[u8], record: &mut ExtractionRecord) {
    if let Some(arguments) = call.child_by_field_name("arguments") {
        let mut cursor = arguments.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if child.kind() == "string" {
                    let raw = extraction::node_text(child, src);
                    record.imports.insert(sql::strip_quotes(&raw).to_string());
                    break;
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
    }
}

impl LanguageExtractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn verify_grammar(&self) -> Result<(), String> {
        extraction::check_grammar(tree_sitter_javascript::LANGUAGE.into())
    }

    fn extract(&self, path: &str, source: &str) -> ExtractionRecord {
        extract_with(
            tree_sitter_javascript::LANGUAGE.into(),
            Language::JavaScript,
            path,
            source,
        )
    }
}

impl TypeScriptExtractor {
    /// TSX needs the dedicated grammar variant; plain TypeScript does not.
    fn grammar_for(path: &str) -> tree_sitter::Language {
        if path.ends_with(".tsx") {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        }
    }
}

impl LanguageExtractor for TypeScriptExtractor {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn verify_grammar(&self) -> Result<(), String> {
        extraction::check_grammar(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())?;
        extraction::check_grammar(tree_sitter_typescript::LANGUAGE_TSX.into())
    }

    fn extract(&self, path: &str, source: &str) -> ExtractionRecord {
        extract_with(Self::grammar_for(path), Language::TypeScript, path, source)
    }
}
