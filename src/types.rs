use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Languages supported by the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "Python")]
    Python,
    #[serde(rename = "Java")]
    Java,
    #[serde(rename = "JavaScript")]
    JavaScript,
    #[serde(rename = "TypeScript")]
    TypeScript,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "Go")]
    Go,
}

impl Language {
    /// Returns the display name of this language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::CSharp => "C#",
            Language::Go => "Go",
        }
    }

    /// Maps a lowercase file extension (without the dot) to a language tag.
    ///
    /// This is the static detection table: files whose extension is not
    /// listed here are excluded from extraction entirely.
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext {
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "js" | "jsx" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "cs" => Some(Language::CSharp),
            "go" => Some(Language::Go),
            _ => None,
        }
    }
}

/// Recognized SQL statement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Alter,
}

impl StatementType {
    /// Returns the uppercase SQL keyword for this statement type.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::Select => "SELECT",
            StatementType::Insert => "INSERT",
            StatementType::Update => "UPDATE",
            StatementType::Delete => "DELETE",
            StatementType::Create => "CREATE",
            StatementType::Drop => "DROP",
            StatementType::Alter => "ALTER",
        }
    }

    /// Parses an uppercase SQL keyword into a `StatementType`.
    pub fn from_keyword(keyword: &str) -> Option<StatementType> {
        match keyword {
            "SELECT" => Some(StatementType::Select),
            "INSERT" => Some(StatementType::Insert),
            "UPDATE" => Some(StatementType::Update),
            "DELETE" => Some(StatementType::Delete),
            "CREATE" => Some(StatementType::Create),
            "DROP" => Some(StatementType::Drop),
            "ALTER" => Some(StatementType::Alter),
            _ => None,
        }
    }
}

/// A SQL-bearing string literal found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlStatement {
    /// The literal text, trimmed, with quote delimiters stripped.
    #[serde(rename = "query")]
    pub text: String,
    /// Statement kind when the text starts with a recognized keyword.
    /// Absent for SQL-bearing literals that do not start with one; such
    /// statements are retained, not discarded.
    #[serde(rename = "type")]
    pub statement_type: Option<StatementType>,
    /// First table the statement could be attributed to. Multi-table
    /// statements attribute only to the first match.
    pub table: Option<String>,
    /// 1-based source line of the literal.
    pub line: u32,
}

/// A call site whose callee matched the per-language database API
/// allow-list. Evidentiary only; never turned into graph edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbCallSite {
    pub name: String,
    /// 1-based source line of the call.
    pub line: u32,
}

/// Canonical per-file summary of imports, SQL statement occurrences and
/// database call-sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Relative path of the source file within the repository snapshot.
    pub path: String,
    pub language: Language,
    /// Raw import target strings, as written; resolution happens during
    /// graph assembly. Sorted set, so extraction output is deterministic.
    pub imports: BTreeSet<String>,
    pub sql_statements: Vec<SqlStatement>,
    pub db_call_sites: Vec<DbCallSite>,
    /// Total line count of the file; module node metadata.
    pub line_count: u32,
    /// Set when parsing failed. The collections above are then empty —
    /// an explicit failure marker, not "no dependencies".
    pub error: Option<String>,
}

impl ExtractionRecord {
    /// Creates an empty record for a file about to be extracted.
    pub fn new(path: &str, language: Language, source: &str) -> Self {
        Self {
            path: path.to_string(),
            language,
            imports: BTreeSet::new(),
            sql_statements: Vec::new(),
            db_call_sites: Vec::new(),
            line_count: source.lines().count() as u32,
            error: None,
        }
    }

    /// Creates a record for a file that could not be parsed.
    pub fn failed(path: &str, language: Language, line_count: u32, message: String) -> Self {
        Self {
            path: path.to_string(),
            language,
            imports: BTreeSet::new(),
            sql_statements: Vec::new(),
            db_call_sites: Vec::new(),
            line_count,
            error: Some(message),
        }
    }
}

/// Kinds of nodes in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Module,
    Table,
}

impl NodeKind {
    /// Returns the string representation of this node kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::Table => "table",
        }
    }

    /// Parses a string into a `NodeKind`, returning `None` for unrecognized values.
    pub fn parse(s: &str) -> Option<NodeKind> {
        match s {
            "module" => Some(NodeKind::Module),
            "table" => Some(NodeKind::Table),
            _ => None,
        }
    }
}

/// Kinds of edges in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Module reads or writes a table via an attributed SQL statement.
    Uses,
    /// Table points at another table through a foreign key column.
    References,
    /// Module imports another module of the same snapshot.
    Imports,
}

impl EdgeKind {
    /// Returns the string representation of this edge kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Uses => "uses",
            EdgeKind::References => "references",
            EdgeKind::Imports => "imports",
        }
    }

    /// Parses a string into an `EdgeKind`, returning `None` for unrecognized values.
    pub fn parse(s: &str) -> Option<EdgeKind> {
        match s {
            "uses" => Some(EdgeKind::Uses),
            "references" => Some(EdgeKind::References),
            "imports" => Some(EdgeKind::Imports),
            _ => None,
        }
    }
}

/// Per-kind node metadata carried into the topology artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeMetadata {
    Module { lines: u32, language: Language },
    Table { columns: usize, indexes: usize },
}

/// A node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Globally unique, namespaced id: `module:<path>` or `table:<name>`.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub metadata: NodeMetadata,
}

/// Per-kind edge metadata carried into the topology artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeMetadata {
    Uses {
        query_type: Option<StatementType>,
        line: u32,
    },
    References {
        column: String,
    },
    Imports {
        import: String,
    },
}

/// Payload stored on a graph edge; endpoints live in the graph itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub metadata: EdgeMetadata,
}

/// Risk level assigned to a SPOF candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
        }
    }
}

/// A single-point-of-failure candidate: a node whose betweenness
/// centrality exceeds the detection threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpofRecord {
    pub node_id: String,
    #[serde(rename = "node_type")]
    pub kind: NodeKind,
    #[serde(rename = "node_name")]
    pub name: String,
    pub betweenness_centrality: f64,
    /// In-degree plus out-degree of the node.
    #[serde(rename = "dependencies_count")]
    pub degree: usize,
    pub risk_level: RiskLevel,
}

/// Builds the namespaced node id for a module path.
pub fn module_id(path: &str) -> String {
    format!("module:{path}")
}

/// Builds the namespaced node id for a table name.
pub fn table_id(name: &str) -> String {
    format!("table:{name}")
}
