/// Tree-sitter based source code extraction.
///
/// Each supported language has one extractor that parses a single file
/// into an [`ExtractionRecord`]: imports, SQL-bearing string literals and
/// database call-sites. Extraction never fails outward — a file that
/// cannot be parsed yields a record carrying only an error message.
mod csharp;
mod go;
mod java;
mod javascript;
mod python;
pub mod sql;

pub use csharp::CSharpExtractor;
pub use go::GoExtractor;
pub use java::JavaExtractor;
pub use javascript::{JavaScriptExtractor, TypeScriptExtractor};
pub use python::PythonExtractor;

use std::path::Path;

use rayon::prelude::*;
use tracing::debug;
use tree_sitter::{Parser, Tree};

use crate::errors::{Result, TopologyError};
use crate::types::{ExtractionRecord, Language};

/// Detects the language of a file from its extension.
///
/// Pure function of the static extension table; unsupported files return
/// `None` and are excluded from extraction.
pub fn detect(path: &str) -> Option<Language> {
    let ext = Path::new(path).extension()?.to_str()?;
    Language::from_extension(&ext.to_ascii_lowercase())
}

/// Trait for language-specific extractors.
///
/// Each implementation handles a single language tag, walking that
/// language's syntax tree rather than scanning lines, so comments and
/// non-literal text never produce false positives.
pub trait LanguageExtractor: Send + Sync {
    /// The language tag this extractor handles.
    fn language(&self) -> Language;

    /// Verifies the extractor's grammar loads into a parser.
    fn verify_grammar(&self) -> std::result::Result<(), String>;

    /// Extracts imports, SQL statements and DB call-sites from one file.
    ///
    /// Never fails: parse problems are reported through the record's
    /// `error` field.
    fn extract(&self, path: &str, source: &str) -> ExtractionRecord;
}

/// Registry of all built-in extractors; dispatches files by detected
/// language.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn LanguageExtractor>>,
}

impl ExtractorRegistry {
    /// Creates a registry with all built-in language extractors.
    ///
    /// Every grammar is loaded into a throwaway parser up front: a grammar
    /// that cannot load is fatal here, before any extraction starts,
    /// rather than a silent per-file failure later.
    pub fn new() -> Result<Self> {
        let extractors: Vec<Box<dyn LanguageExtractor>> = vec![
            Box::new(PythonExtractor),
            Box::new(JavaExtractor),
            Box::new(JavaScriptExtractor),
            Box::new(TypeScriptExtractor),
            Box::new(CSharpExtractor),
            Box::new(GoExtractor),
        ];

        for extractor in &extractors {
            extractor
                .verify_grammar()
                .map_err(|message| TopologyError::Grammar {
                    language: extractor.language().as_str().to_string(),
                    message,
                })?;
        }

        Ok(Self { extractors })
    }

    /// Returns the extractor for a language tag.
    pub fn extractor_for(&self, language: Language) -> Option<&dyn LanguageExtractor> {
        self.extractors
            .iter()
            .find(|e| e.language() == language)
            .map(|e| e.as_ref())
    }

    /// Extracts a single file, returning `None` for unsupported extensions.
    ///
    /// Content that is not valid UTF-8 yields an error record, the same
    /// recovery as a parse failure.
    pub fn extract_file(&self, path: &str, content: &[u8]) -> Option<ExtractionRecord> {
        let language = detect(path)?;
        let extractor = self.extractor_for(language)?;

        let source = match std::str::from_utf8(content) {
            Ok(s) => s,
            Err(e) => {
                debug!(path, "skipping non-UTF-8 content: {e}");
                return Some(ExtractionRecord::failed(
                    path,
                    language,
                    0,
                    format!("invalid UTF-8 content: {e}"),
                ));
            }
        };

        Some(extractor.extract(path, source))
    }

    /// Extracts a batch of files in parallel.
    ///
    /// Per-file extraction shares no mutable state, so files fan out over
    /// a worker pool and join back into one ordered record list. Files of
    /// unsupported languages are dropped.
    pub fn extract_batch(&self, files: &[(String, Vec<u8>)]) -> Vec<ExtractionRecord> {
        files
            .par_iter()
            .filter_map(|(path, content)| self.extract_file(path, content))
            .collect()
    }

    /// Returns the language tags of all registered extractors.
    pub fn supported_languages(&self) -> Vec<Language> {
        self.extractors.iter().map(|e| e.language()).collect()
    }
}

/// Parses source code with the given grammar, reporting failures as
/// messages suitable for an extraction record's error field.
pub(crate) fn parse_source(
    grammar: tree_sitter::Language,
    source: &str,
) -> std::result::Result<Tree, String> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|e| format!("failed to load grammar: {e}"))?;
    parser
        .parse(source, None)
        .ok_or_else(|| "tree-sitter parse returned None".to_string())
}

/// Loads the given grammar into a throwaway parser, surfacing version or
/// ABI mismatches.
pub(crate) fn check_grammar(grammar: tree_sitter::Language) -> std::result::Result<(), String> {
    let mut parser = Parser::new();
    parser.set_language(&grammar).map_err(|e| e.to_string())
}

/// Returns the 1-based line of a tree-sitter node.
pub(crate) fn node_line(node: tree_sitter::Node<'_>) -> u32 {
    node.start_position().row as u32 + 1
}

/// Returns the source text of a tree-sitter node.
pub(crate) fn node_text(node: tree_sitter::Node<'_>, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}
