//! Column type inference.
//!
//! Each field is classified on its own by [`infer_type`]; per-column estimates
//! are folded with [`ColumnType::join`]. The join is commutative and associative
//! with [`ColumnType::Absent`] as identity, so partial folds over any split of the
//! rows combine to the same result:
//!
//! ```text
//! Absent < Integer < Float < Categorical
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Inferred type of a column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// No non-missing value was observed.
    #[default]
    Absent,
    /// Every observed value is an integer literal.
    Integer,
    /// Every observed value is numeric and at least one is not an integer.
    Float,
    /// At least one observed value is non-numeric.
    Categorical,
}

impl ColumnType {
    /// Least upper bound of two estimates.
    #[inline]
    pub fn join(self, other: ColumnType) -> ColumnType {
        self.max(other)
    }

    /// Single-byte code stored in the `.ct` side file.
    pub fn code(self) -> u8 {
        match self {
            ColumnType::Absent => b'n',
            ColumnType::Integer => b'i',
            ColumnType::Float => b'f',
            ColumnType::Categorical => b'c',
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<ColumnType> {
        match code {
            b'n' => Some(ColumnType::Absent),
            b'i' => Some(ColumnType::Integer),
            b'f' => Some(ColumnType::Float),
            b'c' => Some(ColumnType::Categorical),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Absent => "absent",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Categorical => "categorical",
        };
        f.write_str(name)
    }
}

/// Set of tokens that denote a missing value.
#[derive(Clone, Debug, Default)]
pub struct MissingValues {
    tokens: HashSet<Vec<u8>>,
}

impl MissingValues {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self {
            tokens: tokens.into_iter().map(|t| t.as_ref().to_vec()).collect(),
        }
    }

    /// Empty fields are always missing.
    pub fn is_missing(&self, value: &[u8]) -> bool {
        value.is_empty() || self.tokens.contains(value)
    }
}

/// Optional sign followed by one or more ASCII digits.
fn is_integer(value: &[u8]) -> bool {
    let digits = match value.first() {
        Some(b'+' | b'-') => &value[1..],
        _ => value,
    };
    !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
}

/// Decimal or exponent literal. Spellings like `inf` and `NaN` do not count.
fn is_float(value: &[u8]) -> bool {
    if !value
        .iter()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return false;
    }
    std::str::from_utf8(value).is_ok_and(|s| s.parse::<f64>().is_ok())
}

/// Classify a single field.
pub fn infer_type(value: &[u8], missing: &MissingValues) -> ColumnType {
    if missing.is_missing(value) {
        ColumnType::Absent
    } else if is_integer(value) {
        ColumnType::Integer
    } else if is_float(value) {
        ColumnType::Float
    } else {
        ColumnType::Categorical
    }
}
