mod common;

use common::*;
use f4_builder::TableBuilder;
use std::path::Path;

fn build_with(input: &Path, output: &Path, workers: usize, columns_per_chunk: Option<usize>) -> anyhow::Result<()> {
    let mut builder = TableBuilder::new(input, output).workers(workers);
    if let Some(columns) = columns_per_chunk {
        builder = builder.columns_per_chunk(columns);
    }
    builder.build()?;
    Ok(())
}

#[test]
fn worker_count_does_not_change_output() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = write_input(tmp.path(), "table.tsv", &generated_table(101));

    let baseline = tmp.path().join("one.f4");
    build_with(&input, &baseline, 1, None)?;
    let expected = snapshot(&baseline, TABLE_SUFFIXES);

    for workers in [2, 3, 4, 7, 16, 200] {
        let output = tmp.path().join(format!("w{workers}.f4"));
        build_with(&input, &output, workers, None)?;
        assert_eq!(snapshot(&output, TABLE_SUFFIXES), expected, "workers = {workers}");
    }
    Ok(())
}

#[test]
fn column_partitioning_does_not_change_output() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = write_input(tmp.path(), "table.tsv", &generated_table(64));

    let baseline = tmp.path().join("whole.f4");
    build_with(&input, &baseline, 2, None)?;
    let expected = snapshot(&baseline, TABLE_SUFFIXES);

    for columns in [1, 2, 4, 6, 50] {
        let output = tmp.path().join(format!("c{columns}.f4"));
        build_with(&input, &output, 3, Some(columns))?;
        assert_eq!(snapshot(&output, TABLE_SUFFIXES), expected, "columns_per_chunk = {columns}");
    }
    Ok(())
}

#[test]
fn merge_batch_size_does_not_change_output() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = write_input(tmp.path(), "table.tsv", &generated_table(33));

    let baseline = tmp.path().join("base.f4");
    build_with(&input, &baseline, 1, None)?;
    let expected = std::fs::read(&baseline)?;

    for lines in [1, 3, 10, 1000] {
        let output = tmp.path().join(format!("b{lines}.f4"));
        TableBuilder::new(&input, &output)
            .workers(4)
            .merge_batch_lines(lines)
            .build()?;
        assert_eq!(std::fs::read(&output)?, expected, "merge_batch_lines = {lines}");
    }
    Ok(())
}

#[test]
fn rebuilding_is_idempotent() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = write_input(tmp.path(), "table.tsv", &generated_table(25));
    let output = tmp.path().join("table.f4");

    TableBuilder::new(&input, &output).workers(3).index_columns(["id", "score"]).build()?;
    let suffixes: Vec<&str> = TABLE_SUFFIXES.iter().chain(INDEX_SUFFIXES).copied().collect();
    let first = snapshot(&output, &suffixes);

    TableBuilder::new(&input, &output).workers(3).index_columns(["id", "score"]).build()?;
    assert_eq!(snapshot(&output, &suffixes), first);
    Ok(())
}

#[test]
fn more_workers_than_rows() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = write_input(tmp.path(), "tiny.tsv", "a\tb\n1\tx\n");

    let one = tmp.path().join("one.f4");
    build_with(&input, &one, 1, None)?;
    let many = tmp.path().join("many.f4");
    build_with(&input, &many, 8, None)?;

    assert_eq!(snapshot(&many, TABLE_SUFFIXES), snapshot(&one, TABLE_SUFFIXES));
    assert_eq!(std::fs::read(&many)?, b"1x\n");
    Ok(())
}
