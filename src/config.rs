//! Build configuration.
//!
//! [`BuildOptions`] carries every knob of a build. It can be constructed in code,
//! through [`TableBuilder`](crate::TableBuilder), or loaded from JSON:
//!
//! ```no_run
//! use f4_builder::BuildOptions;
//! # fn main() -> anyhow::Result<()> {
//! let opts = BuildOptions::from_json_str(r#"{ "num_workers": 4, "index_columns": ["id"] }"#)?;
//! assert_eq!(opts.delimiter, "\t");
//! # Ok(())
//! # }
//! ```

use crate::error::BuildError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The only supported field separator.
pub const TAB_DELIMITER: &str = "\t";

/// Default number of lines the merger buffers before each write.
pub const DEFAULT_MERGE_BATCH_LINES: usize = 10;

/// Options for a single build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Field separator. Must be [`TAB_DELIMITER`].
    pub delimiter: String,
    /// Columns to copy into the secondary index. Empty means no index.
    pub index_columns: Vec<String>,
    /// Worker count for the profiling and encoding phases. `0` uses one worker per logical CPU.
    pub num_workers: usize,
    /// Columns per profiling partition. `None` profiles all columns as one partition.
    pub columns_per_chunk: Option<usize>,
    /// Directory for per-worker chunk files. Created if missing; a private
    /// directory is generated when unset.
    pub temp_dir: Option<PathBuf>,
    /// Lines buffered per write while merging chunk files.
    pub merge_batch_lines: usize,
    /// Tokens treated as missing values during type inference. Empty fields are always missing.
    pub missing_values: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            delimiter: TAB_DELIMITER.to_string(),
            index_columns: Vec::new(),
            num_workers: 1,
            columns_per_chunk: None,
            temp_dir: None,
            merge_batch_lines: DEFAULT_MERGE_BATCH_LINES,
            missing_values: vec!["NA".to_string()],
        }
    }
}

impl BuildOptions {
    /// Parse options from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parse build options")
    }

    /// Load options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("load options from {}", path.display()))
    }

    /// Check the options without touching the filesystem.
    ///
    /// # Errors
    /// [`BuildError::UnsupportedDelimiter`] or [`BuildError::InvalidOption`].
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.delimiter != TAB_DELIMITER {
            return Err(BuildError::UnsupportedDelimiter(self.delimiter.clone()));
        }
        if self.columns_per_chunk == Some(0) {
            return Err(BuildError::InvalidOption(
                "columns_per_chunk must be at least 1".into(),
            ));
        }
        if self.merge_batch_lines == 0 {
            return Err(BuildError::InvalidOption(
                "merge_batch_lines must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The delimiter as a single byte. Only meaningful after [`validate`](Self::validate).
    pub fn delimiter_byte(&self) -> u8 {
        b'\t'
    }

    /// Worker count with `0` resolved to the number of logical CPUs.
    pub fn resolved_workers(&self) -> usize {
        match self.num_workers {
            0 => num_cpus::get().max(1),
            n => n,
        }
    }
}
