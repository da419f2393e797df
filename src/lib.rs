//! # f4-builder
//!
//! Compiles a large **tab-delimited text table** into a compact fixed-width
//! columnar file. Every value of a column occupies the same number of bytes,
//! so any row or column can be located by arithmetic instead of re-parsing the
//! text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use f4_builder::{TableBuilder, TableReader};
//! # fn main() -> anyhow::Result<()> {
//! let summary = TableBuilder::new("samples.tsv.gz", "samples.f4")
//!     .workers(4)
//!     .index_columns(["sample_id"])
//!     .build()?;
//! println!("{} rows x {} columns", summary.num_rows, summary.num_cols);
//!
//! let mut reader = TableReader::open("samples.f4")?;
//! let value = reader.read_value(0, 1)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Output Layout
//!
//! For an output path `P` a build writes:
//!
//! | File | Content |
//! |---|---|
//! | `P` | fixed-width rows, each `line_length` bytes including `\n` |
//! | `P.cc` / `P.mccl` | column start offsets / max entry length |
//! | `P.cn` / `P.mcnl` | column names / max entry length |
//! | `P.ct` | column type codes (`i`, `f`, `c`, `n`) |
//! | `P.nrow`, `P.ncol` | row and column counts |
//! | `P.ll` | line length |
//! | `P.idx`, `P.idx.*` | secondary index, when requested |
//!
//! ## Execution
//!
//! Column profiling and row encoding each run on a pool of `num_workers`
//! threads over disjoint partitions. Output is byte-identical for any worker
//! count. See [`builder`] for the phase order.
//!
//! ## Feature Flags
//!
//! - `compression-gzip` (default) - read `.gz` inputs
//! - `compression-zstd` - read `.zst` inputs
//! - `compression-bzip2` - read `.bz2` inputs
//! - `compression-xz` - read `.xz` inputs
//!
//! ## Module Overview
//!
//! - [`builder`] - [`TableBuilder`] and the [`build`] entry point
//! - [`config`] - [`BuildOptions`]
//! - [`profile`] - column width and type profiling
//! - [`encode`] - fixed-width row encoding
//! - [`merge`] - chunk file merging and temp directory cleanup
//! - [`metadata`] - side files and the string map format
//! - [`index`] - secondary index
//! - [`reader`] - random access to built tables
//! - [`io`] - input decompression and delimited row streaming

pub mod builder;
pub mod chunks;
pub mod config;
pub mod encode;
pub mod error;
pub mod index;
pub mod io;
pub mod merge;
pub mod metadata;
pub mod metrics;
pub mod profile;
pub mod reader;
pub mod types;

pub use builder::{TableBuilder, build};
pub use config::BuildOptions;
pub use error::{BuildError, ErrorClass, classify};
pub use index::IndexSummary;
pub use metrics::{BuildMetrics, BuildSummary};
pub use reader::{Coordinate, TableReader};
pub use types::ColumnType;
