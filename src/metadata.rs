//! Side files describing the layout of a built table.
//!
//! A table at base path `P` is described by small files named `P` + suffix.
//! Lists are stored as *string maps*: one entry per line, every entry padded
//! with spaces to the longest entry, so entry `i` starts at byte
//! `i * (max_len + 1)`. The max length is stored in a companion scalar file.
//!
//! | Suffix | Content |
//! |---|---|
//! | `.cc` / `.mccl` | column start offsets / max entry length |
//! | `.cn` / `.mcnl` | column names / max entry length |
//! | `.ct` | one type code per column |
//! | `.nrow`, `.ncol` | row and column counts |
//! | `.ll` | encoded line length, newline included |
//! | `.idx.*` | the same for the secondary index |

use crate::types::ColumnType;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub const COLUMN_COORDS: &str = ".cc";
pub const MAX_COLUMN_COORD_LEN: &str = ".mccl";
pub const COLUMN_NAMES: &str = ".cn";
pub const MAX_COLUMN_NAME_LEN: &str = ".mcnl";
pub const COLUMN_TYPES: &str = ".ct";
pub const NUM_ROWS: &str = ".nrow";
pub const NUM_COLS: &str = ".ncol";
pub const LINE_LENGTH: &str = ".ll";
pub const INDEX_DATA: &str = ".idx";
pub const INDEX_LINE_LENGTH: &str = ".idx.ll";
pub const INDEX_NUM_COLS: &str = ".idx.ncol";
pub const INDEX_COLUMN_COORDS: &str = ".idx.cc";
pub const INDEX_MAX_COLUMN_COORD_LEN: &str = ".idx.mccl";

/// `base` with `suffix` appended to its file name (`data.f4` + `.cc` = `data.f4.cc`).
pub fn side_path(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Start offset of each column plus the total row width; `widths.len() + 1` entries.
pub fn column_start_coords(widths: &[usize]) -> Vec<usize> {
    let mut coords = Vec::with_capacity(widths.len() + 1);
    let mut position = 0;
    coords.push(position);
    for width in widths {
        position += width;
        coords.push(position);
    }
    coords
}

/// Encode `entries` as a string map. Returns the bytes and the max entry length.
pub fn build_string_map<S: AsRef<[u8]>>(entries: &[S]) -> (Vec<u8>, usize) {
    let max_len = entries.iter().map(|e| e.as_ref().len()).max().unwrap_or(0);
    let mut out = Vec::with_capacity(entries.len() * (max_len + 1));
    for entry in entries {
        let entry = entry.as_ref();
        out.extend_from_slice(entry);
        out.resize(out.len() + (max_len - entry.len()), b' ');
        out.push(b'\n');
    }
    (out, max_len)
}

/// Decode a string map whose entries are `max_len` bytes wide, stripping padding.
pub fn parse_string_map(bytes: &[u8], max_len: usize) -> Vec<Vec<u8>> {
    bytes
        .chunks_exact(max_len + 1)
        .map(|entry| trim_padding(&entry[..max_len]).to_vec())
        .collect()
}

/// Drop trailing space padding from a fixed-width value.
pub fn trim_padding(value: &[u8]) -> &[u8] {
    let end = value.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    &value[..end]
}

pub fn write_side_file(base: &Path, suffix: &str, contents: &[u8]) -> Result<()> {
    let path = side_path(base, suffix);
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
}

pub fn write_scalar(base: &Path, suffix: &str, value: usize) -> Result<()> {
    write_side_file(base, suffix, value.to_string().as_bytes())
}

pub fn read_side_file(base: &Path, suffix: &str) -> Result<Vec<u8>> {
    let path = side_path(base, suffix);
    fs::read(&path).with_context(|| format!("read {}", path.display()))
}

pub fn read_scalar(base: &Path, suffix: &str) -> Result<usize> {
    let bytes = read_side_file(base, suffix)?;
    let path = side_path(base, suffix);
    std::str::from_utf8(&bytes)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .with_context(|| format!("parse integer from {}", path.display()))
}

/// Write start offsets as a string map plus its max-length companion.
pub fn write_coords(base: &Path, coords_suffix: &str, max_len_suffix: &str, coords: &[usize]) -> Result<()> {
    let entries: Vec<String> = coords.iter().map(usize::to_string).collect();
    let (map, max_len) = build_string_map(&entries);
    write_side_file(base, coords_suffix, &map)?;
    write_scalar(base, max_len_suffix, max_len)
}

/// Layout of a table, fixed once profiling is done.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableLayout {
    pub names: Vec<Vec<u8>>,
    pub widths: Vec<usize>,
    pub types: Vec<ColumnType>,
    /// Start offsets, `num_cols + 1` entries; the last is the row width.
    pub coords: Vec<usize>,
    pub num_rows: usize,
}

impl TableLayout {
    pub fn new(names: Vec<Vec<u8>>, widths: Vec<usize>, types: Vec<ColumnType>, num_rows: usize) -> Self {
        let coords = column_start_coords(&widths);
        Self {
            names,
            widths,
            types,
            coords,
            num_rows,
        }
    }

    pub fn num_cols(&self) -> usize {
        self.names.len()
    }

    /// Encoded row width without the newline.
    pub fn row_width(&self) -> usize {
        self.coords.last().copied().unwrap_or(0)
    }

    /// Write every layout side file except `.ll`, which the merger records.
    pub fn write(&self, base: &Path) -> Result<()> {
        write_coords(base, COLUMN_COORDS, MAX_COLUMN_COORD_LEN, &self.coords)?;

        let (names, max_name_len) = build_string_map(&self.names);
        write_side_file(base, COLUMN_NAMES, &names)?;
        write_scalar(base, MAX_COLUMN_NAME_LEN, max_name_len)?;

        write_scalar(base, NUM_ROWS, self.num_rows)?;
        write_scalar(base, NUM_COLS, self.num_cols())?;

        // Codes are one byte wide, so no max-length companion.
        let codes: Vec<[u8; 1]> = self.types.iter().map(|t| [t.code()]).collect();
        let (types, _) = build_string_map(&codes);
        write_side_file(base, COLUMN_TYPES, &types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_accumulate_widths() {
        assert_eq!(column_start_coords(&[2, 5, 3]), vec![0, 2, 7, 10]);
        assert_eq!(column_start_coords(&[]), vec![0]);
    }

    #[test]
    fn string_map_pads_entries() {
        let (map, max_len) = build_string_map(&["0", "2", "10"]);
        assert_eq!(max_len, 2);
        assert_eq!(map, b"0 \n2 \n10\n");
        assert_eq!(parse_string_map(&map, max_len), vec![b"0".to_vec(), b"2".to_vec(), b"10".to_vec()]);
    }

    #[test]
    fn side_path_appends_suffix() {
        assert_eq!(side_path(Path::new("out/data.f4"), ".idx.cc"), PathBuf::from("out/data.f4.idx.cc"));
    }

    #[test]
    fn trim_padding_keeps_inner_spaces() {
        assert_eq!(trim_padding(b"a b  "), b"a b");
        assert_eq!(trim_padding(b"   "), b"");
        assert_eq!(trim_padding(b" x"), b" x");
    }
}
