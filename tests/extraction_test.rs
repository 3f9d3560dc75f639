use topomap::extraction::{self, ExtractorRegistry};
use topomap::types::{Language, StatementType};

fn registry() -> ExtractorRegistry {
    ExtractorRegistry::new().unwrap()
}

#[test]
fn test_detect_language_from_extension() {
    assert_eq!(extraction::detect("src/app.py"), Some(Language::Python));
    assert_eq!(extraction::detect("Repo.java"), Some(Language::Java));
    assert_eq!(extraction::detect("lib/util.jsx"), Some(Language::JavaScript));
    assert_eq!(extraction::detect("ui/App.tsx"), Some(Language::TypeScript));
    assert_eq!(extraction::detect("Store.cs"), Some(Language::CSharp));
    assert_eq!(extraction::detect("main.go"), Some(Language::Go));
    assert_eq!(extraction::detect("README.md"), None);
    assert_eq!(extraction::detect("Makefile"), None);
}

#[test]
fn test_python_extraction() {
    let source = r#"import db.models
from app import helpers

def load(cur):
    cur.execute("SELECT * FROM users WHERE id = ?")
"#;
    let record = registry().extract_file("src/load.py", source.as_bytes()).unwrap();
    assert_eq!(record.language, Language::Python);
    assert!(record.error.is_none());
    assert!(record.imports.contains("db.models"));
    assert!(record.imports.contains("app"));

    assert_eq!(record.sql_statements.len(), 1);
    let stmt = &record.sql_statements[0];
    assert_eq!(stmt.statement_type, Some(StatementType::Select));
    assert_eq!(stmt.table.as_deref(), Some("users"));
    assert_eq!(stmt.line, 5);

    assert_eq!(record.db_call_sites.len(), 1);
    assert_eq!(record.db_call_sites[0].name, "execute");
    assert_eq!(record.db_call_sites[0].line, 5);
    assert_eq!(record.line_count, 5);
}

#[test]
fn test_python_aliased_import() {
    let source = "import numpy as np\n";
    let record = registry().extract_file("calc.py", source.as_bytes()).unwrap();
    assert!(record.imports.contains("numpy"));
}

#[test]
fn test_sql_in_comments_is_ignored() {
    let source = "# SELECT * FROM users\nx = 1\n";
    let record = registry().extract_file("noop.py", source.as_bytes()).unwrap();
    assert!(record.sql_statements.is_empty());
}

#[test]
fn test_java_extraction() {
    let source = r#"import java.sql.Connection;
import com.acme.db.Pool;

class Repo {
    void run(java.sql.Statement stmt) throws Exception {
        stmt.executeQuery("SELECT name FROM accounts");
    }
}
"#;
    let record = registry().extract_file("Repo.java", source.as_bytes()).unwrap();
    assert!(record.imports.contains("java.sql.Connection"));
    assert!(record.imports.contains("com.acme.db.Pool"));

    assert_eq!(record.sql_statements.len(), 1);
    assert_eq!(record.sql_statements[0].table.as_deref(), Some("accounts"));
    assert_eq!(record.sql_statements[0].line, 6);

    assert_eq!(record.db_call_sites.len(), 1);
    assert_eq!(record.db_call_sites[0].name, "executeQuery");
}

#[test]
fn test_javascript_extraction() {
    let source = r#"import helpers from './helpers.js';
const db = require('./db');

async function load(pool) {
  return pool.query(`SELECT * FROM orders WHERE id = $1`);
}
"#;
    let record = registry().extract_file("load.js", source.as_bytes()).unwrap();
    assert!(record.imports.contains("./helpers.js"));
    assert!(record.imports.contains("./db"));

    assert_eq!(record.sql_statements.len(), 1);
    assert_eq!(
        record.sql_statements[0].statement_type,
        Some(StatementType::Select)
    );
    assert_eq!(record.sql_statements[0].table.as_deref(), Some("orders"));
    assert_eq!(record.sql_statements[0].line, 5);

    assert_eq!(record.db_call_sites.len(), 1);
    assert_eq!(record.db_call_sites[0].name, "query");
}

#[test]
fn test_typescript_extraction() {
    let source = "import { api } from './api';\nconst rows: string[] = [];\n";
    let record = registry().extract_file("app.ts", source.as_bytes()).unwrap();
    assert_eq!(record.language, Language::TypeScript);
    assert!(record.imports.contains("./api"));
}

#[test]
fn test_tsx_extraction() {
    let source = "import React from 'react';\nexport const View = () => <div/>;\n";
    let record = registry().extract_file("View.tsx", source.as_bytes()).unwrap();
    assert!(record.error.is_none());
    assert!(record.imports.contains("react"));
}

#[test]
fn test_csharp_extraction() {
    let source = r#"using System.Data;
using Acme.Data;

class Repo {
    void Run(System.Data.IDbCommand cmd) {
        var sql = "DELETE FROM sessions WHERE expired = 1";
        cmd.ExecuteReader();
    }
}
"#;
    let record = registry().extract_file("Repo.cs", source.as_bytes()).unwrap();
    assert!(record.imports.contains("System.Data"));
    assert!(record.imports.contains("Acme.Data"));

    assert_eq!(record.sql_statements.len(), 1);
    assert_eq!(
        record.sql_statements[0].statement_type,
        Some(StatementType::Delete)
    );
    assert_eq!(record.sql_statements[0].table.as_deref(), Some("sessions"));
    assert_eq!(record.sql_statements[0].line, 6);

    assert_eq!(record.db_call_sites.len(), 1);
    assert_eq!(record.db_call_sites[0].name, "ExecuteReader");
    assert_eq!(record.db_call_sites[0].line, 7);
}

#[test]
fn test_go_extraction() {
    let source = r#"package main

import (
	"database/sql"
	"acme/internal/store"
)

func load(db *sql.DB) {
	db.Query("SELECT id FROM products")
}
"#;
    let record = registry().extract_file("main.go", source.as_bytes()).unwrap();
    assert!(record.imports.contains("database/sql"));
    assert!(record.imports.contains("acme/internal/store"));

    assert_eq!(record.sql_statements.len(), 1);
    assert_eq!(record.sql_statements[0].table.as_deref(), Some("products"));
    assert_eq!(record.sql_statements[0].line, 9);

    assert_eq!(record.db_call_sites.len(), 1);
    assert_eq!(record.db_call_sites[0].name, "Query");
}

#[test]
fn test_unclassified_sql_is_retained() {
    let source = "msg = \"logging the SELECT results for users\"\n";
    let record = registry().extract_file("log.py", source.as_bytes()).unwrap();
    assert_eq!(record.sql_statements.len(), 1);
    assert_eq!(record.sql_statements[0].statement_type, None);
}

#[test]
fn test_unsupported_extension_yields_no_record() {
    assert!(registry().extract_file("notes.txt", b"SELECT 1").is_none());
}

#[test]
fn test_invalid_utf8_yields_error_record() {
    let record = registry()
        .extract_file("bad.py", &[0x66, 0x6f, 0xff, 0xfe])
        .unwrap();
    assert!(record.error.is_some());
    assert!(record.imports.is_empty());
    assert!(record.sql_statements.is_empty());
}

#[test]
fn test_extraction_is_deterministic() {
    let source = "import a.b\nimport c.d\nq = \"SELECT * FROM t1\"\n";
    let reg = registry();
    let first = reg.extract_file("m.py", source.as_bytes()).unwrap();
    let second = reg.extract_file("m.py", source.as_bytes()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_batch_extraction_drops_unsupported_files() {
    let files = vec![
        ("a.py".to_string(), b"import b\n".to_vec()),
        ("README.md".to_string(), b"# docs\n".to_vec()),
        ("b.py".to_string(), b"x = 1\n".to_vec()),
    ];
    let records = registry().extract_batch(&files);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.language == Language::Python));
}

#[test]
fn test_supported_languages() {
    let languages = registry().supported_languages();
    assert_eq!(languages.len(), 6);
    assert!(languages.contains(&Language::Python));
    assert!(languages.contains(&Language::Go));
}
