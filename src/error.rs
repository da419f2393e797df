//! Error taxonomy for table builds.
//!
//! Build functions return [`anyhow::Result`]. Failures that callers may want to
//! react to are raised as a [`BuildError`] inside the `anyhow` chain, so they can
//! be recovered with `err.downcast_ref::<BuildError>()` or bucketed with
//! [`classify`].

use std::path::PathBuf;
use thiserror::Error;

/// Classified build failures.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The delimiter is not the single supported separator (a tab).
    #[error("unsupported delimiter {0:?}: only \"\\t\" is supported")]
    UnsupportedDelimiter(String),

    /// An option is out of range (e.g. `merge_batch_lines == 0`).
    #[error("invalid build option: {0}")]
    InvalidOption(String),

    /// The header line yielded no columns.
    #[error("no data was detected in {}", .0.display())]
    NoColumns(PathBuf),

    /// A header row exists but there are no data rows after it.
    #[error("a header row but no data rows were detected in {}", .0.display())]
    NoDataRows(PathBuf),

    /// A requested column name is not present in the header.
    #[error("unknown column {0:?}")]
    UnknownColumn(String),

    /// A field is wider than the width recorded for its column during profiling.
    #[error("row {row}, column {column}: field is {len} bytes but the column width is {width}")]
    FieldTooWide {
        /// Zero-based data row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// Byte length of the offending field.
        len: usize,
        /// Profiled column width.
        width: usize,
    },

    /// A data row has a different number of fields than the header.
    #[error("row {row} has {found} fields but the header has {expected}")]
    RaggedRow {
        /// Zero-based data row index.
        row: usize,
        /// Header field count.
        expected: usize,
        /// Field count of the row.
        found: usize,
    },

    /// Two profiling partitions observed a different number of data rows.
    #[error("profiling partitions disagree on the row count ({first} vs {other})")]
    RowCountMismatch {
        /// Row count reported by the first partition.
        first: usize,
        /// Conflicting row count reported by a later partition.
        other: usize,
    },
}

/// Coarse failure categories a caller can branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad delimiter, option or column request. Raised before any output is written.
    Configuration,
    /// Zero header columns, or a header with zero data rows.
    EmptyInput,
    /// The input is inconsistent (ragged rows, or it changed between passes).
    MalformedInput,
    /// File or directory I/O failed.
    Resource,
}

impl BuildError {
    /// The category this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            BuildError::UnsupportedDelimiter(_)
            | BuildError::InvalidOption(_)
            | BuildError::UnknownColumn(_) => ErrorClass::Configuration,
            BuildError::NoColumns(_) | BuildError::NoDataRows(_) => ErrorClass::EmptyInput,
            BuildError::RaggedRow { .. }
            | BuildError::FieldTooWide { .. }
            | BuildError::RowCountMismatch { .. } => ErrorClass::MalformedInput,
        }
    }
}

/// Classify an error returned by a build.
///
/// Errors that carry no [`BuildError`] are resource failures.
pub fn classify(err: &anyhow::Error) -> ErrorClass {
    for cause in err.chain() {
        if let Some(build) = cause.downcast_ref::<BuildError>() {
            return build.class();
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return ErrorClass::Resource;
        }
    }
    ErrorClass::Resource
}
