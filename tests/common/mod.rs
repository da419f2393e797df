#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffixes of every file a build without an index writes.
pub const TABLE_SUFFIXES: &[&str] = &["", ".cc", ".mccl", ".cn", ".mcnl", ".ct", ".nrow", ".ncol", ".ll"];

pub const INDEX_SUFFIXES: &[&str] = &[".idx", ".idx.ll", ".idx.ncol", ".idx.cc", ".idx.mccl"];

pub fn write_input(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write input");
    path
}

pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

pub fn read_suffix(base: &Path, suffix: &str) -> Vec<u8> {
    fs::read(with_suffix(base, suffix)).unwrap_or_else(|e| panic!("read {suffix}: {e}"))
}

pub fn read_text(base: &Path, suffix: &str) -> String {
    String::from_utf8(read_suffix(base, suffix)).expect("utf-8 side file")
}

/// Contents of every table file, keyed by suffix.
pub fn snapshot(base: &Path, suffixes: &[&str]) -> BTreeMap<String, Vec<u8>> {
    suffixes
        .iter()
        .map(|s| (s.to_string(), read_suffix(base, s)))
        .collect()
}

/// A deterministic table with `rows` data rows and mixed column types.
///
/// Columns: `id` (integer), `label` (categorical, varying widths), `score`
/// (float with missing values), `count` (integer with missing values),
/// `empty` (always missing), `note` (categorical with inner spaces).
pub fn generated_table(rows: usize) -> String {
    let mut out = String::from("id\tlabel\tscore\tcount\tempty\tnote\n");
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    for i in 0..rows {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        let r = (state >> 33) as usize;
        let label = "x".repeat(1 + r % 12);
        let score = if r % 7 == 0 { "NA".to_string() } else { format!("{}.{}", r % 1000, r % 10) };
        let count = if r % 5 == 0 { String::new() } else { (r % 100_000).to_string() };
        let note = if r % 3 == 0 { "a b".to_string() } else { format!("n{}", r % 37) };
        out.push_str(&format!("{i}\t{label}\t{score}\t{count}\tNA\t{note}\n"));
    }
    out
}

/// Split `contents` into rows of fields, skipping the header.
pub fn source_rows(contents: &str) -> Vec<Vec<String>> {
    contents
        .lines()
        .skip(1)
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}
