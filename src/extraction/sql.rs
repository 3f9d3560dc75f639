//! SQL occurrence scanning over string-literal text.
//!
//! Extractors hand every string/template-literal node here; comments never
//! reach this module because they are not string-literal nodes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{SqlStatement, StatementType};

/// The recognized SQL keywords, in classification order.
pub const SQL_KEYWORDS: [&str; 7] = [
    "SELECT", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER",
];

/// Whole-word, case-insensitive detection scan for any recognized keyword.
static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(SELECT|INSERT|UPDATE|DELETE|CREATE|DROP|ALTER)\b")
        .expect("keyword pattern is valid")
});

/// Table attribution patterns, tried in priority order; first match wins.
static TABLE_PATTERNS: Lazy<[Regex; 4]> = Lazy::new(|| {
    let build = |clause: &str| {
        Regex::new(&format!(r"(?i)\b{clause}\s+([A-Za-z_][A-Za-z0-9_]*)"))
            .expect("table pattern is valid")
    };
    [build("FROM"), build("INTO"), build("UPDATE"), build("TABLE")]
});

/// Returns `true` when the text contains a recognized SQL keyword as a
/// whole word, in any case.
pub fn contains_sql_keyword(text: &str) -> bool {
    KEYWORD_RE.is_match(text)
}

/// Classifies a statement by the first recognized keyword at the start of
/// its trimmed, upper-cased text. Returns `None` for SQL-bearing literals
/// that do not start with a keyword.
pub fn classify_statement(text: &str) -> Option<StatementType> {
    let upper = text.trim().to_uppercase();
    SQL_KEYWORDS
        .iter()
        .find(|kw| upper.starts_with(*kw))
        .and_then(|kw| StatementType::from_keyword(kw))
}

/// Attributes a statement to the first table mentioned after `FROM`,
/// `INTO`, `UPDATE` or `TABLE`, in that priority order.
///
/// Multi-table statements (joins, subqueries) attribute only to the first
/// match. Known limitation carried from the statement-scan design.
pub fn attributed_table(text: &str) -> Option<String> {
    TABLE_PATTERNS
        .iter()
        .find_map(|re| re.captures(text).map(|c| c[1].to_string()))
}

/// Scans one string-literal text; returns a statement when the detection
/// scan matches, otherwise `None`.
pub fn scan_literal(text: &str, line: u32) -> Option<SqlStatement> {
    if !contains_sql_keyword(text) {
        return None;
    }
    Some(SqlStatement {
        text: text.trim().to_string(),
        statement_type: classify_statement(text),
        table: attributed_table(text),
        line,
    })
}

/// Strips quote delimiters (and string prefixes like `f"` / `@"` / `r#"`)
/// from a raw literal's source text.
pub fn strip_quotes(raw: &str) -> &str {
    let without_prefix = raw
        .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '@' || c == '#' || c == '$');
    without_prefix.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_is_whole_word_and_case_insensitive() {
        assert!(contains_sql_keyword("select * from users"));
        assert!(contains_sql_keyword("log the UPDATE result"));
        // Substrings of larger words do not match.
        assert!(!contains_sql_keyword("selection committee"));
        assert!(!contains_sql_keyword("dropdown menu"));
        assert!(!contains_sql_keyword("hello world"));
    }

    #[test]
    fn classification_takes_leading_keyword() {
        assert_eq!(
            classify_statement("  select id FROM users"),
            Some(StatementType::Select)
        );
        assert_eq!(
            classify_statement("DELETE FROM sessions"),
            Some(StatementType::Delete)
        );
        // Detection matched but the text does not start with a keyword:
        // retained unclassified.
        assert_eq!(classify_statement("run a SELECT against users"), None);
    }

    #[test]
    fn table_attribution_priority() {
        assert_eq!(
            attributed_table("SELECT * FROM users WHERE id = ?"),
            Some("users".to_string())
        );
        assert_eq!(
            attributed_table("INSERT INTO orders (id) VALUES (?)"),
            Some("orders".to_string())
        );
        assert_eq!(
            attributed_table("UPDATE accounts SET balance = 0"),
            Some("accounts".to_string())
        );
        assert_eq!(
            attributed_table("CREATE TABLE audit_log (id INT)"),
            Some("audit_log".to_string())
        );
        // FROM outranks INTO when both appear.
        assert_eq!(
            attributed_table("INSERT INTO archive SELECT * FROM users"),
            Some("users".to_string())
        );
        assert_eq!(attributed_table("SELECT 1"), None);
    }

    #[test]
    fn joins_attribute_to_first_table_only() {
        assert_eq!(
            attributed_table("SELECT * FROM orders JOIN users ON orders.user_id = users.id"),
            Some("orders".to_string())
        );
    }

    #[test]
    fn scan_retains_unclassified_sql_literals() {
        let stmt = scan_literal("issue a SELECT on users table", 7).unwrap();
        assert_eq!(stmt.statement_type, None);
        assert_eq!(stmt.line, 7);
        assert!(scan_literal("no sql here", 1).is_none());
    }

    #[test]
    fn strip_quotes_handles_prefixes() {
        assert_eq!(strip_quotes("\"SELECT 1\""), "SELECT 1");
        assert_eq!(strip_quotes("f\"SELECT {x}\""), "SELECT {x}");
        assert_eq!(strip_quotes("@\"SELECT 1\""), "SELECT 1");
        assert_eq!(strip_quotes("`SELECT 1`"), "SELECT 1");
        assert_eq!(strip_quotes("'SELECT 1'"), "SELECT 1");
    }
}
