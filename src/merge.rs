//! Concatenating worker chunk files into the final data file.

use crate::encode::chunk_file_path;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

/// Move the chunk files named by `chunk_ids` from `temp_dir` into `output`, in
/// the order given.
///
/// A single chunk file is renamed into place. Otherwise the files are copied
/// `batch_lines` lines at a time and each is deleted once consumed. A listed
/// chunk file that does not exist is skipped.
pub fn merge_chunk_files(output: &Path, temp_dir: &Path, chunk_ids: &[usize], batch_lines: usize) -> Result<()> {
    if let [id] = chunk_ids {
        let chunk = chunk_file_path(temp_dir, *id);
        return move_file(&chunk, output);
    }

    let file = File::create(output).with_context(|| format!("create {}", output.display()))?;
    let mut out = BufWriter::new(file);
    let mut batch = Vec::new();
    let mut batched = 0usize;

    for &id in chunk_ids {
        let chunk = chunk_file_path(temp_dir, id);
        let file = match File::open(&chunk) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e).with_context(|| format!("open {}", chunk.display())),
        };

        let mut reader = BufReader::new(file);
        loop {
            let read = reader
                .read_until(b'\n', &mut batch)
                .with_context(|| format!("read {}", chunk.display()))?;
            if read == 0 {
                break;
            }
            batched += 1;
            if batched == batch_lines {
                out.write_all(&batch)
                    .with_context(|| format!("write {}", output.display()))?;
                batch.clear();
                batched = 0;
            }
        }
        drop(reader);
        fs::remove_file(&chunk).with_context(|| format!("remove {}", chunk.display()))?;
        debug!("merged chunk {}", chunk.display());
    }

    out.write_all(&batch)
        .with_context(|| format!("write {}", output.display()))?;
    out.flush().with_context(|| format!("flush {}", output.display()))
}

/// Rename, or copy and delete when the rename fails (e.g. across filesystems).
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
    fs::remove_file(from).with_context(|| format!("remove {}", from.display()))
}

/// Remove an (expected empty) temporary directory.
///
/// A directory that is missing or still holds files is left alone with a
/// warning; any other failure is returned.
pub fn remove_temp_dir(dir: &Path) -> io::Result<()> {
    match fs::remove_dir(dir) {
        Ok(()) => Ok(()),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::DirectoryNotEmpty) => {
            warn!("leaving temporary directory {}: {e}", dir.display());
            Ok(())
        }
        Err(e) => Err(e),
    }
}
