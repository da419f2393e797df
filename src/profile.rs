//! Column profiling: widest value and inferred type of every column.
//!
//! Columns are split into partitions ([`Chunk`]s of column indices). Each
//! partition streams the whole input on its own and reports results for its
//! columns only; [`profile_columns`] runs the partitions on a worker pool and
//! stitches the results back together in column order.

use crate::chunks::{Chunk, chunk_ranges};
use crate::error::BuildError;
use crate::io::delimited::DataRows;
use crate::types::{ColumnType, MissingValues, infer_type};
use anyhow::Result;
use log::debug;
use rayon::ThreadPool;
use rayon::prelude::*;
use std::path::Path;

/// Profile of one column partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionProfile {
    /// Columns this profile covers.
    pub columns: Chunk,
    /// Max field byte length per column, in column order.
    pub widths: Vec<usize>,
    /// Folded type per column, in column order.
    pub types: Vec<ColumnType>,
    /// Data rows seen by this partition's scan.
    pub num_rows: usize,
}

/// Width and type of every column plus the data row count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnProfile {
    pub widths: Vec<usize>,
    pub types: Vec<ColumnType>,
    pub num_rows: usize,
}

/// Scan the input and profile the columns in `columns`.
pub fn profile_partition(
    input: &Path,
    delimiter: u8,
    columns: Chunk,
    missing: &MissingValues,
) -> Result<PartitionProfile> {
    let mut rows = DataRows::open(input, delimiter)?;
    let mut widths = vec![0usize; columns.len()];
    let mut types = vec![ColumnType::Absent; columns.len()];

    while rows.advance()?.is_some() {
        let record = rows.record();
        for (slot, col) in (columns.start..columns.end).enumerate() {
            let field = &record[col];
            widths[slot] = widths[slot].max(field.len());
            types[slot] = types[slot].join(infer_type(field, missing));
        }
    }

    debug!(
        "profiled columns {}..{} over {} rows",
        columns.start,
        columns.end,
        rows.rows_read()
    );
    Ok(PartitionProfile {
        columns,
        widths,
        types,
        num_rows: rows.rows_read(),
    })
}

/// Profile all `num_cols` columns of `input` on `pool`.
///
/// Widths are at least one byte, so column start offsets stay strictly increasing.
///
/// # Errors
/// - [`BuildError::NoDataRows`] when the input has a header but no data rows.
/// - [`BuildError::RowCountMismatch`] when partitions count different rows.
/// - Any worker's I/O or parse error.
pub fn profile_columns(
    pool: &ThreadPool,
    input: &Path,
    delimiter: u8,
    num_cols: usize,
    columns_per_chunk: Option<usize>,
    missing: &MissingValues,
) -> Result<ColumnProfile> {
    let partitions = chunk_ranges(num_cols, columns_per_chunk);
    debug!("profiling {num_cols} columns in {} partitions", partitions.len());

    let results: Vec<PartitionProfile> = pool.install(|| {
        partitions
            .into_par_iter()
            .map(|columns| profile_partition(input, delimiter, columns, missing))
            .collect::<Result<Vec<_>>>()
    })?;

    merge_partitions(input, results)
}

/// Concatenate partition results in column order.
fn merge_partitions(input: &Path, mut results: Vec<PartitionProfile>) -> Result<ColumnProfile> {
    results.sort_by_key(|p| p.columns.start);
    let num_rows = results.first().map_or(0, |p| p.num_rows);
    if let Some(other) = results.iter().find(|p| p.num_rows != num_rows) {
        return Err(BuildError::RowCountMismatch {
            first: num_rows,
            other: other.num_rows,
        }
        .into());
    }
    if num_rows == 0 {
        return Err(BuildError::NoDataRows(input.to_path_buf()).into());
    }

    let mut widths = Vec::new();
    let mut types = Vec::new();
    for partition in results {
        widths.extend(partition.widths.into_iter().map(|w| w.max(1)));
        types.extend(partition.types);
    }
    Ok(ColumnProfile {
        widths,
        types,
        num_rows,
    })
}
