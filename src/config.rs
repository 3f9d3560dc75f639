use std::fs;
use std::path::Path;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TopologyError};

/// Configuration for an analysis run.
///
/// Controls which files are scanned and the per-file size limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Glob patterns for files to include during scanning.
    pub include: Vec<String>,
    /// Glob patterns for files to exclude during scanning.
    pub exclude: Vec<String>,
    /// Maximum file size in bytes; files larger than this are skipped.
    pub max_file_size: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            version: 1,
            include: vec![
                "**/*.py".to_string(),
                "**/*.java".to_string(),
                "**/*.js".to_string(),
                "**/*.jsx".to_string(),
                "**/*.ts".to_string(),
                "**/*.tsx".to_string(),
                "**/*.cs".to_string(),
                "**/*.go".to_string(),
            ],
            exclude: vec![
                ".git/**".to_string(),
                "node_modules/**".to_string(),
                "__pycache__/**".to_string(),
                "target/**".to_string(),
                "vendor/**".to_string(),
                "bin/**".to_string(),
                "build/**".to_string(),
                "out/**".to_string(),
                "dist/**".to_string(),
                "**/*.min.*".to_string(),
            ],
            max_file_size: 1_048_576,
        }
    }
}

/// Loads an analysis configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let contents = fs::read_to_string(path).map_err(|e| TopologyError::Config {
        message: format!("failed to read config file '{}': {e}", path.display()),
    })?;

    serde_json::from_str(&contents).map_err(|e| TopologyError::Config {
        message: format!("failed to parse config file '{}': {e}", path.display()),
    })
}

/// Determines whether a file should be included based on the configuration's
/// include and exclude glob patterns.
///
/// A file is included only if it matches at least one include pattern and
/// does not match any exclude pattern. Exclude patterns take precedence.
pub fn should_include_file(file_path: &str, config: &AnalysisConfig) -> bool {
    let match_opts = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    for pattern_str in &config.exclude {
        if let Ok(pattern) = Pattern::new(pattern_str) {
            if pattern.matches_with(file_path, match_opts) {
                return false;
            }
        }
    }

    for pattern_str in &config.include {
        if let Ok(pattern) = Pattern::new(pattern_str) {
            if pattern.matches_with(file_path, match_opts) {
                return true;
            }
        }
    }

    false
}
