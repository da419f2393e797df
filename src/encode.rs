//! Fixed-width row encoding.
//!
//! Rows are split into contiguous ranges, one per worker. Each worker streams
//! the input from the start, encodes the rows in its range, and writes them to
//! its own chunk file `<temp_dir>/<worker id>`. The merger later concatenates
//! the chunk files in worker order.

use crate::chunks::{Chunk, chunk_ranges, rows_per_worker};
use crate::error::BuildError;
use crate::io::delimited::DataRows;
use anyhow::{Context, Result};
use csv::ByteRecord;
use log::debug;
use rayon::ThreadPool;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Everything one encoding worker needs.
#[derive(Clone, Copy, Debug)]
pub struct EncodeTask<'a> {
    pub input: &'a Path,
    pub delimiter: u8,
    pub widths: &'a [usize],
    /// Rows to encode; `rows.id` is the worker id.
    pub rows: Chunk,
    pub temp_dir: &'a Path,
}

/// A chunk file written by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodedChunk {
    /// Worker id, also the chunk file name.
    pub id: usize,
    /// Longest line written, newline included.
    pub max_line: usize,
}

/// Path of the chunk file written by `worker`.
pub fn chunk_file_path(temp_dir: &Path, worker: usize) -> PathBuf {
    temp_dir.join(worker.to_string())
}

/// Append `record` to `out`, each field right-padded with spaces to its column width,
/// followed by a newline.
///
/// # Errors
/// [`BuildError::FieldTooWide`] if a field exceeds its width.
pub fn encode_row(row: usize, record: &ByteRecord, widths: &[usize], out: &mut Vec<u8>) -> Result<(), BuildError> {
    for (column, (field, &width)) in record.iter().zip(widths).enumerate() {
        if field.len() > width {
            return Err(BuildError::FieldTooWide {
                row,
                column,
                len: field.len(),
                width,
            });
        }
        out.extend_from_slice(field);
        out.resize(out.len() + (width - field.len()), b' ');
    }
    out.push(b'\n');
    Ok(())
}

/// Encode the rows of one task into its chunk file.
pub fn encode_chunk(task: &EncodeTask<'_>) -> Result<EncodedChunk> {
    let path = chunk_file_path(task.temp_dir, task.rows.id);
    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    let mut rows = DataRows::open(task.input, task.delimiter)?;
    let mut line = Vec::with_capacity(task.widths.iter().sum::<usize>() + 1);
    let mut max_line = 0;

    while let Some(row) = rows.advance()? {
        if row < task.rows.start {
            continue;
        }
        if row == task.rows.end {
            break;
        }
        line.clear();
        encode_row(row, rows.record(), task.widths, &mut line)?;
        out.write_all(&line)
            .with_context(|| format!("write {}", path.display()))?;
        max_line = max_line.max(line.len());
    }

    out.flush().with_context(|| format!("flush {}", path.display()))?;
    debug!(
        "worker {} encoded rows {}..{} into {}",
        task.rows.id,
        task.rows.start,
        task.rows.end,
        path.display()
    );
    Ok(EncodedChunk {
        id: task.rows.id,
        max_line,
    })
}

/// Encode all `num_rows` rows on `pool`, one chunk per worker.
///
/// Returns the chunks that were written, in worker order. Only these files
/// belong to this build; anything else in `temp_dir` is left alone.
pub fn encode_rows(
    pool: &ThreadPool,
    input: &Path,
    delimiter: u8,
    widths: &[usize],
    num_rows: usize,
    num_workers: usize,
    temp_dir: &Path,
) -> Result<Vec<EncodedChunk>> {
    let chunks = chunk_ranges(num_rows, Some(rows_per_worker(num_rows, num_workers)));
    debug!("encoding {num_rows} rows in {} chunks", chunks.len());

    pool.install(|| {
        chunks
            .into_par_iter()
            .map(|rows| {
                encode_chunk(&EncodeTask {
                    input,
                    delimiter,
                    widths,
                    rows,
                    temp_dir,
                })
            })
            .collect::<Result<Vec<_>>>()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_padded_to_width() -> Result<(), BuildError> {
        let record = ByteRecord::from(vec!["7", "", "ab"]);
        let mut line = Vec::new();
        encode_row(0, &record, &[2, 1, 3], &mut line)?;
        assert_eq!(line, b"7  ab \n");
        Ok(())
    }

    #[test]
    fn field_wider_than_column_aborts() {
        let record = ByteRecord::from(vec!["1", "abc"]);
        let mut line = Vec::new();
        let err = encode_row(7, &record, &[1, 2], &mut line).unwrap_err();
        assert!(matches!(
            err,
            BuildError::FieldTooWide {
                row: 7,
                column: 1,
                len: 3,
                width: 2
            }
        ));
    }
}
