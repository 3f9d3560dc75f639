//! End-to-end analysis pipeline: scan, extract, assemble, analyze.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{self, AnalysisConfig};
use crate::errors::Result;
use crate::extraction::ExtractorRegistry;
use crate::schema::SchemaDescription;
use crate::topology::TopologySnapshot;
use crate::types::ExtractionRecord;

/// Counters reported alongside a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Files scanned and handed to extraction.
    pub file_count: usize,
    /// Extraction records produced (unsupported files are dropped).
    pub record_count: usize,
    /// Records carrying a parse error.
    pub parse_failures: usize,
    pub duration_ms: u128,
}

/// Drives one full analysis of a repository root.
pub struct AnalysisPipeline {
    registry: ExtractorRegistry,
    config: AnalysisConfig,
    root: PathBuf,
}

impl AnalysisPipeline {
    /// Creates a pipeline for a repository root.
    ///
    /// Fails up front when any language grammar cannot load; a run must
    /// not start with a capability silently missing.
    pub fn new(root: &Path, config: AnalysisConfig) -> Result<Self> {
        Ok(Self {
            registry: ExtractorRegistry::new()?,
            config,
            root: root.to_path_buf(),
        })
    }

    /// Runs the full pipeline and returns the snapshot with run counters.
    pub fn run(&self, schema: &SchemaDescription) -> Result<(TopologySnapshot, RunSummary)> {
        let started = Instant::now();

        let files = self.scan_files()?;
        let file_count = files.len();
        info!(files = file_count, root = %self.root.display(), "scan complete");

        let records = self.registry.extract_batch(&files);
        let parse_failures = records.iter().filter(|r| r.error.is_some()).count();
        if parse_failures > 0 {
            warn!(parse_failures, "some files could not be parsed");
        }

        let snapshot = TopologySnapshot::build(&records, schema);
        let summary = RunSummary {
            file_count,
            record_count: records.len(),
            parse_failures,
            duration_ms: started.elapsed().as_millis(),
        };
        Ok((snapshot, summary))
    }

    /// Extracts a single file, for inspection from the command line.
    pub fn extract_one(&self, path: &Path) -> Result<Option<ExtractionRecord>> {
        let content = fs::read(path)?;
        let rel = self.relative_path(path);
        Ok(self.registry.extract_file(&rel, &content))
    }

    /// Walks the repository root, applying the configured include/exclude
    /// globs and the file size limit. Unreadable files are skipped with a
    /// warning rather than failing the run.
    fn scan_files(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = self.relative_path(entry.path());
            if !config::should_include_file(&rel, &self.config) {
                continue;
            }

            match entry.metadata() {
                Ok(meta) if meta.len() > self.config.max_file_size => {
                    debug!(path = %rel, size = meta.len(), "skipping oversized file");
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %rel, "skipping unreadable file: {e}");
                    continue;
                }
            }

            match fs::read(entry.path()) {
                Ok(content) => files.push((rel, content)),
                Err(e) => warn!(path = %rel, "skipping unreadable file: {e}"),
            }
        }

        // Deterministic record order regardless of directory walk order.
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }

    /// Path relative to the repository root, with forward slashes.
    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}
