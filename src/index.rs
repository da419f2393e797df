//! Secondary index over a subset of columns.
//!
//! The index is read back from the finished data file: for each row the
//! requested columns' fixed-width slots are copied, in column order, into one
//! line of `<data>.idx`. The index gets its own line length, column count and
//! coordinate map.

use crate::metadata::{
    INDEX_COLUMN_COORDS, INDEX_DATA, INDEX_LINE_LENGTH, INDEX_MAX_COLUMN_COORD_LEN, INDEX_NUM_COLS,
    column_start_coords, side_path, write_coords, write_scalar,
};
use crate::reader::TableReader;
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

/// What was written to the index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    /// Indexed column positions in the main table, ascending.
    pub columns: Vec<usize>,
    /// Index line length, newline included.
    pub line_length: usize,
}

/// Whether `requested` asks for a non-empty strict subset of `num_cols` columns.
///
/// `requested` is expected to be de-duplicated.
pub fn should_index(requested: &[usize], num_cols: usize) -> bool {
    !requested.is_empty() && requested.len() < num_cols
}

/// Sort and de-duplicate resolved column indices.
pub fn normalize_columns(mut columns: Vec<usize>) -> Vec<usize> {
    columns.sort_unstable();
    columns.dedup();
    columns
}

/// Delete index files left by an earlier build of the same output.
pub fn remove_index_files(data_path: &Path) -> Result<()> {
    for suffix in [
        INDEX_DATA,
        INDEX_LINE_LENGTH,
        INDEX_NUM_COLS,
        INDEX_COLUMN_COORDS,
        INDEX_MAX_COLUMN_COORD_LEN,
    ] {
        let path = side_path(data_path, suffix);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("remove {}", path.display())),
        }
    }
    Ok(())
}

/// Build the index for the named columns of the table at `data_path`.
///
/// Returns `None` without writing anything when the names cover no column or
/// every column.
pub fn build_index<S: AsRef<[u8]>>(data_path: &Path, columns: &[S]) -> Result<Option<IndexSummary>> {
    let mut reader = TableReader::open(data_path)?;
    let indices = normalize_columns(reader.column_indices(columns)?);
    if !should_index(&indices, reader.num_cols()) {
        return Ok(None);
    }
    info!("Building index over {} columns", indices.len());

    let coords = reader.column_coords(&indices)?;
    let index_path = side_path(data_path, INDEX_DATA);
    let file = File::create(&index_path).with_context(|| format!("create {}", index_path.display()))?;
    let mut out = BufWriter::new(file);

    let mut line = Vec::with_capacity(coords.iter().map(|c| c.width()).sum::<usize>() + 1);
    for row in 0..reader.num_rows() {
        line.clear();
        for value in reader.read_row_values(row, &coords)? {
            line.extend_from_slice(value);
        }
        line.push(b'\n');
        out.write_all(&line)
            .with_context(|| format!("write {}", index_path.display()))?;
    }
    out.flush().with_context(|| format!("flush {}", index_path.display()))?;

    // Every index line has the same length as the last one written.
    let line_length = line.len();
    write_scalar(data_path, INDEX_LINE_LENGTH, line_length)?;
    write_scalar(data_path, INDEX_NUM_COLS, indices.len())?;

    let widths: Vec<usize> = coords.iter().map(|c| c.width()).collect();
    write_coords(
        data_path,
        INDEX_COLUMN_COORDS,
        INDEX_MAX_COLUMN_COORD_LEN,
        &column_start_coords(&widths),
    )?;

    Ok(Some(IndexSummary {
        columns: indices,
        line_length,
    }))
}
