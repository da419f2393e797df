//! Partition descriptors for the parallel phases.
//!
//! A [`Chunk`] is a contiguous, end-exclusive range of indices (columns while
//! profiling, rows while encoding) plus the id of the worker that owns it.
//! Chunks from one call to [`chunk_ranges`] are disjoint, ordered by id, and
//! cover `[0, len)` exactly.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Worker index; also names the worker's temporary file.
    pub id: usize,
    /// First index, inclusive.
    pub start: usize,
    /// Last index, exclusive.
    pub end: usize,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

/// Split `[0, len)` into chunks of at most `chunk_size` indices.
///
/// `None` yields a single chunk spanning the whole range (even when `len == 0`).
/// With `Some(size)` an empty range yields no chunks.
pub fn chunk_ranges(len: usize, chunk_size: Option<usize>) -> Vec<Chunk> {
    let Some(size) = chunk_size else {
        return vec![Chunk { id: 0, start: 0, end: len }];
    };
    let size = size.max(1);
    (0..len.div_ceil(size))
        .map(|id| {
            let start = id * size;
            Chunk {
                id,
                start,
                end: (start + size).min(len),
            }
        })
        .collect()
}

/// Rows assigned to each encoding worker: `ceil(num_rows / num_workers) + 1`.
///
/// The extra row means the last worker may receive a short chunk, or none at all.
pub fn rows_per_worker(num_rows: usize, num_workers: usize) -> usize {
    num_rows.div_ceil(num_workers.max(1)) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(chunks: &[Chunk], len: usize) {
        let mut next = 0;
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.id, i);
            assert_eq!(c.start, next);
            assert!(c.end > c.start);
            next = c.end;
        }
        assert_eq!(next, len);
    }

    #[test]
    fn whole_range_without_size() {
        assert_eq!(chunk_ranges(7, None), vec![Chunk { id: 0, start: 0, end: 7 }]);
        assert_eq!(chunk_ranges(0, None), vec![Chunk { id: 0, start: 0, end: 0 }]);
    }

    #[test]
    fn sized_chunks_cover_range() {
        for len in [1, 2, 9, 10, 11, 100] {
            for size in [1, 3, 10, 1000] {
                assert_covers(&chunk_ranges(len, Some(size)), len);
            }
        }
        assert!(chunk_ranges(0, Some(4)).is_empty());
    }

    #[test]
    fn row_chunks_never_exceed_worker_count() {
        for rows in [1, 2, 5, 17, 1000] {
            for workers in [1, 2, 3, 8, 64] {
                let chunks = chunk_ranges(rows, Some(rows_per_worker(rows, workers)));
                assert!(chunks.len() <= workers, "rows={rows} workers={workers}");
                assert_covers(&chunks, rows);
            }
        }
    }

    #[test]
    fn rows_per_worker_adds_one() {
        assert_eq!(rows_per_worker(10, 3), 5);
        assert_eq!(rows_per_worker(9, 3), 4);
        assert_eq!(rows_per_worker(2, 4), 2);
    }
}
