//! Build timings and the summary report returned by a build.
//!
//! [`BuildMetrics`] records how long each phase took. [`BuildSummary`] bundles
//! the metrics with what was written, and can be printed or saved as JSON:
//!
//! ```no_run
//! use f4_builder::TableBuilder;
//! # fn main() -> anyhow::Result<()> {
//! let summary = TableBuilder::new("table.tsv", "table.f4").workers(4).build()?;
//! summary.print();
//! summary.save_to_file("build-report.json")?;
//! # Ok(())
//! # }
//! ```

use crate::index::IndexSummary;
use crate::types::ColumnType;
use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Wall-clock duration of one build phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseTiming {
    pub name: &'static str,
    pub elapsed: Duration,
}

/// Per-phase timings, in the order the phases ran.
#[derive(Clone, Debug, Default)]
pub struct BuildMetrics {
    phases: Vec<PhaseTiming>,
    started: Option<Instant>,
    total: Option<Duration>,
}

impl BuildMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_start(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn record_end(&mut self) {
        self.total = self.started.map(|s| s.elapsed());
    }

    /// Run `f` and record its duration under `name`.
    pub fn time<T>(&mut self, name: &'static str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.phases.push(PhaseTiming {
            name,
            elapsed: start.elapsed(),
        });
        out
    }

    #[must_use]
    pub fn phases(&self) -> &[PhaseTiming] {
        &self.phases
    }

    #[must_use]
    pub fn phase(&self, name: &str) -> Option<Duration> {
        self.phases.iter().find(|p| p.name == name).map(|p| p.elapsed)
    }

    /// Time between [`record_start`](Self::record_start) and [`record_end`](Self::record_end).
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.total
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut phases = serde_json::Map::new();
        for phase in &self.phases {
            phases.insert(format!("{}_ms", phase.name), json!(phase.elapsed.as_millis()));
        }
        if let Some(total) = self.total {
            phases.insert("total_ms".to_string(), json!(total.as_millis()));
        }
        Value::Object(phases)
    }
}

/// Outcome of a successful build.
#[derive(Clone, Debug)]
pub struct BuildSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub num_rows: usize,
    pub num_cols: usize,
    /// Encoded line length, newline included.
    pub line_length: usize,
    pub column_names: Vec<String>,
    pub column_types: Vec<ColumnType>,
    pub column_widths: Vec<usize>,
    pub index: Option<IndexSummary>,
    pub metrics: BuildMetrics,
}

#[derive(Serialize)]
struct ColumnReport<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    column_type: ColumnType,
    width: usize,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    input: String,
    output: String,
    num_rows: usize,
    num_cols: usize,
    line_length: usize,
    columns: Vec<ColumnReport<'a>>,
    index: Option<&'a IndexSummary>,
    timings: &'a BuildMetrics,
}

impl Serialize for BuildMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for BuildSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.report().serialize(serializer)
    }
}

impl BuildSummary {
    fn report(&self) -> SummaryReport<'_> {
        let columns = self
            .column_names
            .iter()
            .zip(&self.column_types)
            .zip(&self.column_widths)
            .map(|((name, &column_type), &width)| ColumnReport {
                name: name.as_str(),
                column_type,
                width,
            })
            .collect();
        SummaryReport {
            input: self.input.display().to_string(),
            output: self.output.display().to_string(),
            num_rows: self.num_rows,
            num_cols: self.num_cols,
            line_length: self.line_length,
            columns,
            index: self.index.as_ref(),
            timings: &self.metrics,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!(self.report())
    }

    /// Print a human-readable report to stdout.
    pub fn print(&self) {
        println!("\n========== Build Summary ==========");
        println!("{} -> {}", self.input.display(), self.output.display());
        println!("Rows: {}, Columns: {}, Line length: {}", self.num_rows, self.num_cols, self.line_length);
        if let Some(index) = &self.index {
            println!("Index: {} columns, line length {}", index.columns.len(), index.line_length);
        }
        println!("-----------------------------------");
        for phase in self.metrics.phases() {
            println!("{}: {} ms", phase.name, phase.elapsed.as_millis());
        }
        if let Some(total) = self.metrics.elapsed() {
            println!("Total: {:.3}s", total.as_secs_f64());
        }
        println!("===================================\n");
    }

    /// Save the report as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let formatted = serde_json::to_string_pretty(self)?;
        file.write_all(formatted.as_bytes())
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}
