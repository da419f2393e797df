mod common;

use common::*;
use f4_builder::TableBuilder;
use f4_builder::io::compression::{builtin_codecs, detect_from_extension, open_decompressed};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

fn write_gzip(path: &Path, contents: &str) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder.write_all(contents.as_bytes())?;
    encoder.finish()?;
    Ok(())
}

#[test]
fn plain_input_passes_through() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = write_input(tmp.path(), "plain.tsv", "a\tb\n1\t2\n");

    let mut text = String::new();
    open_decompressed(&path)?.read_to_string(&mut text)?;
    assert_eq!(text, "a\tb\n1\t2\n");
    assert!(detect_from_extension(&path).is_none());
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn gzip_input_builds_identical_table() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let contents = generated_table(80);
    let plain = write_input(tmp.path(), "table.tsv", &contents);
    let gz = tmp.path().join("table.tsv.gz");
    write_gzip(&gz, &contents)?;

    let from_plain = tmp.path().join("plain.f4");
    TableBuilder::new(&plain, &from_plain).workers(2).build()?;
    let from_gz = tmp.path().join("gz.f4");
    TableBuilder::new(&gz, &from_gz).workers(3).columns_per_chunk(2).build()?;

    assert_eq!(snapshot(&from_gz, TABLE_SUFFIXES), snapshot(&from_plain, TABLE_SUFFIXES));
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn gzip_detected_by_magic_bytes() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("no_extension");
    write_gzip(&path, "x\ty\n1\t2\n")?;

    let mut text = String::new();
    open_decompressed(&path)?.read_to_string(&mut text)?;
    assert_eq!(text, "x\ty\n1\t2\n");

    let output = tmp.path().join("out.f4");
    TableBuilder::new(&path, &output).build()?;
    assert_eq!(fs::read(&output)?, b"12\n");
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn extension_match_ignores_case() {
    let codec = detect_from_extension("DATA.TSV.GZ").expect("gzip codec");
    assert_eq!(codec.name(), "gzip");
    assert!(builtin_codecs().iter().any(|c| c.name() == "gzip"));
}

#[cfg(feature = "compression-zstd")]
#[test]
fn zstd_input_builds_identical_table() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let contents = generated_table(30);
    let plain = write_input(tmp.path(), "table.tsv", &contents);
    let zst = tmp.path().join("table.tsv.zst");
    fs::write(&zst, zstd::encode_all(contents.as_bytes(), 3)?)?;

    let from_plain = tmp.path().join("plain.f4");
    TableBuilder::new(&plain, &from_plain).build()?;
    let from_zst = tmp.path().join("zst.f4");
    TableBuilder::new(&zst, &from_zst).workers(2).build()?;

    assert_eq!(snapshot(&from_zst, TABLE_SUFFIXES), snapshot(&from_plain, TABLE_SUFFIXES));
    Ok(())
}
