//! Random access to a built table.
//!
//! [`TableReader`] loads the side files of a table and reads column byte
//! ranges out of individual rows of the data file. The index builder uses it
//! to re-read the finished data file; it is also handy for inspecting output.

use crate::error::BuildError;
use crate::metadata::{
    COLUMN_COORDS, COLUMN_NAMES, COLUMN_TYPES, LINE_LENGTH, MAX_COLUMN_COORD_LEN, MAX_COLUMN_NAME_LEN, NUM_COLS,
    NUM_ROWS, parse_string_map, read_scalar, read_side_file, trim_padding,
};
use crate::types::ColumnType;
use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// `[start, end)` byte range of a column within an encoded row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coordinate {
    pub start: usize,
    pub end: usize,
}

impl Coordinate {
    pub fn width(&self) -> usize {
        self.end - self.start
    }
}

/// Resolve `requested` names against `names`, keeping the request order.
///
/// # Errors
/// [`BuildError::UnknownColumn`] for the first name not in `names`.
pub fn resolve_columns<N, R>(names: &[N], requested: &[R]) -> Result<Vec<usize>, BuildError>
where
    N: AsRef<[u8]>,
    R: AsRef<[u8]>,
{
    requested
        .iter()
        .map(|want| {
            let want = want.as_ref();
            names
                .iter()
                .position(|name| name.as_ref() == want)
                .ok_or_else(|| BuildError::UnknownColumn(String::from_utf8_lossy(want).into_owned()))
        })
        .collect()
}

pub struct TableReader {
    path: PathBuf,
    data: File,
    num_rows: usize,
    line_length: usize,
    names: Vec<Vec<u8>>,
    types: Vec<ColumnType>,
    coords: Vec<usize>,
    row: Vec<u8>,
}

impl TableReader {
    /// Open the table whose data file is `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = File::open(&path).with_context(|| format!("open {}", path.display()))?;

        let num_rows = read_scalar(&path, NUM_ROWS)?;
        let num_cols = read_scalar(&path, NUM_COLS)?;
        let line_length = read_scalar(&path, LINE_LENGTH)?;

        let names = parse_string_map(
            &read_side_file(&path, COLUMN_NAMES)?,
            read_scalar(&path, MAX_COLUMN_NAME_LEN)?,
        );
        let coords = parse_string_map(
            &read_side_file(&path, COLUMN_COORDS)?,
            read_scalar(&path, MAX_COLUMN_COORD_LEN)?,
        )
        .iter()
        .map(|entry| {
            std::str::from_utf8(entry)
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .with_context(|| format!("bad column coordinate in {}{COLUMN_COORDS}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
        let types = parse_string_map(&read_side_file(&path, COLUMN_TYPES)?, 1)
            .iter()
            .map(|code| {
                code.first()
                    .copied()
                    .and_then(ColumnType::from_code)
                    .with_context(|| format!("bad column type in {}{COLUMN_TYPES}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        if names.len() != num_cols || types.len() != num_cols || coords.len() != num_cols + 1 {
            bail!("side files of {} disagree on the column count", path.display());
        }

        Ok(Self {
            path,
            data,
            num_rows,
            line_length,
            names,
            types,
            coords,
            row: vec![0; line_length],
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.names.len()
    }

    /// Encoded line length, newline included.
    pub fn line_length(&self) -> usize {
        self.line_length
    }

    pub fn column_names(&self) -> &[Vec<u8>] {
        &self.names
    }

    pub fn column_types(&self) -> &[ColumnType] {
        &self.types
    }

    /// Indices of the named columns, in request order.
    pub fn column_indices<S: AsRef<[u8]>>(&self, names: &[S]) -> Result<Vec<usize>> {
        Ok(resolve_columns(&self.names, names)?)
    }

    /// Byte ranges of the given columns.
    pub fn column_coords(&self, indices: &[usize]) -> Result<Vec<Coordinate>> {
        indices
            .iter()
            .map(|&i| {
                if i >= self.num_cols() {
                    bail!("column index {i} out of range for {} columns", self.num_cols());
                }
                Ok(Coordinate {
                    start: self.coords[i],
                    end: self.coords[i + 1],
                })
            })
            .collect()
    }

    /// Load row `row` into the internal buffer.
    fn load_row(&mut self, row: usize) -> Result<()> {
        if row >= self.num_rows {
            bail!("row {row} out of range for {} rows", self.num_rows);
        }
        let offset = (row * self.line_length) as u64;
        self.data
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.data.read_exact(&mut self.row))
            .with_context(|| format!("read row {row} of {}", self.path.display()))
    }

    /// Raw (padded) bytes of the given columns in row `row`.
    pub fn read_row_values(&mut self, row: usize, coords: &[Coordinate]) -> Result<Vec<&[u8]>> {
        self.load_row(row)?;
        Ok(coords.iter().map(|c| &self.row[c.start..c.end]).collect())
    }

    /// Value of one field with its padding removed.
    pub fn read_value(&mut self, row: usize, column: usize) -> Result<Vec<u8>> {
        let coords = self.column_coords(&[column])?;
        let values = self.read_row_values(row, &coords)?;
        Ok(trim_padding(values[0]).to_vec())
    }
}
