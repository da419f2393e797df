//! Reading the delimited source table.
//!
//! The header is scanned once by [`read_header`]. Every profiling and encoding
//! worker then opens its own [`DataRows`] stream, which skips the header and
//! yields the raw field bytes of each data row.
//!
//! # Design notes
//! - Fields are split on the delimiter byte only. Quotes have no meaning.
//! - Records end at `\n`; a `\r` before it stays part of the last field.
//! - Every `\n`-terminated line after the header is a row. An empty line is a
//!   row with one empty field, so it is only valid in a one-column table.
//! - Every data row must have exactly as many fields as the header.

use crate::error::BuildError;
use crate::io::compression::open_decompressed;
use anyhow::{Context, Result};
use csv::ByteRecord;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

type LineReader = BufReader<Box<dyn io::Read + Send>>;

fn open_lines(path: &Path) -> Result<LineReader> {
    Ok(BufReader::new(open_decompressed(path)?))
}

/// Read one line into `line` without its `\n`. Returns `false` at end of input.
fn read_line(reader: &mut impl BufRead, line: &mut Vec<u8>) -> io::Result<bool> {
    line.clear();
    if reader.read_until(b'\n', line)? == 0 {
        return Ok(false);
    }
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    Ok(true)
}

/// Split `line` on `delimiter` into `record`, replacing its previous fields.
pub fn split_fields(line: &[u8], delimiter: u8, record: &mut ByteRecord) {
    record.clear();
    for field in line.split(|&b| b == delimiter) {
        record.push_field(field);
    }
}

/// Read the column names from the first line of `path`.
///
/// Surrounding ASCII whitespace is trimmed from each name.
///
/// # Errors
/// [`BuildError::NoColumns`] if the file has no header line, or an I/O error.
pub fn read_header(path: impl AsRef<Path>, delimiter: u8) -> Result<Vec<Vec<u8>>> {
    let path = path.as_ref();
    let mut reader = open_lines(path)?;
    let mut line = Vec::new();
    let found = read_line(&mut reader, &mut line).with_context(|| format!("read header of {}", path.display()))?;
    if !found || line.is_empty() {
        return Err(BuildError::NoColumns(path.to_path_buf()).into());
    }
    Ok(line
        .split(|&b| b == delimiter)
        .map(|name| name.trim_ascii().to_vec())
        .collect())
}

/// Streaming reader over the data rows of a delimited file.
///
/// The record buffer is reused between rows; borrow it with [`record`](Self::record)
/// after a successful [`advance`](Self::advance).
pub struct DataRows {
    path: PathBuf,
    reader: LineReader,
    delimiter: u8,
    num_cols: usize,
    line: Vec<u8>,
    record: ByteRecord,
    next_row: usize,
}

impl DataRows {
    /// Open `path` and position the stream at the first data row.
    ///
    /// The header's field count becomes the required field count of every row.
    pub fn open(path: impl AsRef<Path>, delimiter: u8) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut reader = open_lines(&path)?;
        let mut line = Vec::new();
        read_line(&mut reader, &mut line).with_context(|| format!("read header of {}", path.display()))?;
        let num_cols = line.split(|&b| b == delimiter).count();
        Ok(Self {
            path,
            reader,
            delimiter,
            num_cols,
            line,
            record: ByteRecord::new(),
            next_row: 0,
        })
    }

    /// Read the next data row. Returns its zero-based index, or `None` at end of input.
    ///
    /// # Errors
    /// [`BuildError::RaggedRow`] if the row's field count differs from the header's.
    pub fn advance(&mut self) -> Result<Option<usize>> {
        let row = self.next_row;
        let found = read_line(&mut self.reader, &mut self.line)
            .with_context(|| format!("read data row {row} of {}", self.path.display()))?;
        if !found {
            return Ok(None);
        }
        split_fields(&self.line, self.delimiter, &mut self.record);
        if self.record.len() != self.num_cols {
            return Err(BuildError::RaggedRow {
                row,
                expected: self.num_cols,
                found: self.record.len(),
            })
            .with_context(|| format!("read data row {row} of {}", self.path.display()));
        }
        self.next_row += 1;
        Ok(Some(row))
    }

    /// Fields of the row most recently returned by [`advance`](Self::advance).
    pub fn record(&self) -> &ByteRecord {
        &self.record
    }

    /// Number of data rows read so far.
    pub fn rows_read(&self) -> usize {
        self.next_row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_is_one_empty_field() {
        let mut record = ByteRecord::new();
        split_fields(b"", b'\t', &mut record);
        assert_eq!(record.len(), 1);
        assert_eq!(&record[0], b"");

        split_fields(b"a\t\tc\r", b'\t', &mut record);
        assert_eq!(record.iter().collect::<Vec<_>>(), vec![&b"a"[..], b"", b"c\r"]);
    }

    #[test]
    fn read_line_strips_only_newline() -> io::Result<()> {
        let mut input: &[u8] = b"x\r\n\nlast";
        let mut line = Vec::new();
        assert!(read_line(&mut input, &mut line)?);
        assert_eq!(line, b"x\r");
        assert!(read_line(&mut input, &mut line)?);
        assert_eq!(line, b"");
        assert!(read_line(&mut input, &mut line)?);
        assert_eq!(line, b"last");
        assert!(!read_line(&mut input, &mut line)?);
        Ok(())
    }
}
