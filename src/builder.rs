//! Build orchestration.
//!
//! A build runs these phases in order, each finishing before the next starts:
//!
//! 1. read the header,
//! 2. profile column widths and types (parallel over column partitions),
//! 3. write the layout side files,
//! 4. encode rows into per-worker chunk files (parallel over row ranges),
//! 5. merge the chunk files in worker order and record the line length,
//! 6. optionally build the secondary index from the finished data file.
//!
//! The parallel phases share no mutable state; the join at the end of each
//! phase surfaces the first worker error and aborts the build.

use crate::config::BuildOptions;
use crate::encode::encode_rows;
use crate::index::{IndexSummary, build_index, normalize_columns, remove_index_files, should_index};
use crate::io::delimited::read_header;
use crate::merge::{merge_chunk_files, remove_temp_dir};
use crate::metadata::{LINE_LENGTH, TableLayout, write_scalar};
use crate::metrics::{BuildMetrics, BuildSummary};
use crate::profile::profile_columns;
use crate::reader::resolve_columns;
use crate::types::MissingValues;
use anyhow::{Context, Result};
use log::info;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fluent front end for [`build`].
///
/// ```no_run
/// use f4_builder::TableBuilder;
/// # fn main() -> anyhow::Result<()> {
/// let summary = TableBuilder::new("genes.tsv.gz", "genes.f4")
///     .workers(8)
///     .index_columns(["gene_id"])
///     .build()?;
/// println!("{} rows", summary.num_rows);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct TableBuilder {
    input: PathBuf,
    output: PathBuf,
    options: BuildOptions,
}

impl TableBuilder {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            options: BuildOptions::default(),
        }
    }

    /// Replace all options at once.
    #[must_use]
    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.options.delimiter = delimiter.into();
        self
    }

    #[must_use]
    pub fn index_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.index_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn workers(mut self, num_workers: usize) -> Self {
        self.options.num_workers = num_workers;
        self
    }

    #[must_use]
    pub fn columns_per_chunk(mut self, columns: usize) -> Self {
        self.options.columns_per_chunk = Some(columns);
        self
    }

    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.temp_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn merge_batch_lines(mut self, lines: usize) -> Self {
        self.options.merge_batch_lines = lines;
        self
    }

    #[must_use]
    pub fn missing_values<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.missing_values = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(&self) -> Result<BuildSummary> {
        build(&self.input, &self.output, &self.options)
    }
}

fn worker_pool(num_workers: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_workers)
        .thread_name(|i| format!("f4-worker-{i}"))
        .build()
        .context("start worker pool")
}

/// Compile the delimited table at `input` into a fixed-width table at `output`.
///
/// # Errors
/// See [`crate::error`]. Options are validated before any file is touched. A
/// failed build may leave partial output and chunk files behind.
pub fn build(input: impl AsRef<Path>, output: impl AsRef<Path>, options: &BuildOptions) -> Result<BuildSummary> {
    let input = input.as_ref();
    let output = output.as_ref();
    options.validate()?;

    let delimiter = options.delimiter_byte();
    let num_workers = options.resolved_workers();
    let missing = MissingValues::new(&options.missing_values);

    let mut metrics = BuildMetrics::new();
    metrics.record_start();

    info!("Parsing {}", input.display());
    let names = read_header(input, delimiter)?;
    let num_cols = names.len();

    // Check index names against the header before doing any heavy work.
    let index_columns = normalize_columns(resolve_columns(&names, &options.index_columns)?);
    let want_index = should_index(&index_columns, num_cols);

    let pool = worker_pool(num_workers)?;

    info!("Finding max width of each column");
    let profile = metrics.time("profile", || {
        profile_columns(&pool, input, delimiter, num_cols, options.columns_per_chunk, &missing)
    })?;

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let layout = TableLayout::new(names, profile.widths, profile.types, profile.num_rows);
    metrics.time("metadata", || layout.write(output))?;

    // Keeps a generated directory alive until the build returns.
    let mut generated: Option<TempDir> = None;
    let temp_dir = match &options.temp_dir {
        Some(dir) => {
            create_dir_all(dir).with_context(|| format!("create temporary directory {}", dir.display()))?;
            dir.clone()
        }
        None => generated
            .insert(
                tempfile::Builder::new()
                    .prefix("f4-build-")
                    .tempdir()
                    .context("create temporary directory")?,
            )
            .path()
            .to_path_buf(),
    };

    info!("Parsing chunks of the input file and saving to temp files");
    let chunks = metrics.time("encode", || {
        encode_rows(&pool, input, delimiter, &layout.widths, layout.num_rows, num_workers, &temp_dir)
    })?;
    let line_length = chunks.iter().map(|c| c.max_line).max().unwrap_or(0);
    let chunk_ids: Vec<usize> = chunks.iter().map(|c| c.id).collect();
    write_scalar(output, LINE_LENGTH, line_length)?;

    info!("Merging the file chunks");
    metrics.time("merge", || {
        merge_chunk_files(output, &temp_dir, &chunk_ids, options.merge_batch_lines)
    })?;
    remove_temp_dir(&temp_dir).with_context(|| format!("remove temporary directory {}", temp_dir.display()))?;
    drop(generated);
    info!("Done saving to {}", output.display());

    let index: Option<IndexSummary> = if want_index {
        metrics.time("index", || build_index(output, &options.index_columns))?
    } else {
        remove_index_files(output)?;
        None
    };

    metrics.record_end();
    Ok(BuildSummary {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        num_rows: layout.num_rows,
        num_cols,
        line_length,
        column_names: layout
            .names
            .iter()
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .collect(),
        column_types: layout.types,
        column_widths: layout.widths,
        index,
        metrics,
    })
}
