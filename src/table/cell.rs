//! Cell values as produced by extractors or read from ground truth.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One table cell.
///
/// Extractors disagree on what a cell holds: text, numbers, nulls for merged
/// or empty cells. Any JSON value deserializes; values that are not scalars
/// are kept verbatim in [`CellValue::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing cell
    #[default]
    Null,
    /// Boolean cell
    Bool(bool),
    /// Numeric cell, kept in its written form
    Number(serde_json::Number),
    /// Text cell
    Text(String),
    /// Any other JSON value (arrays, objects)
    Other(serde_json::Value),
}

impl CellValue {
    /// Create a text cell.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Whether the cell is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String form of the cell, `None` for null. Booleans read `True`/`False`,
    /// as Python's `str` writes them in ground-truth annotations.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(Cow::Borrowed(if *b { "True" } else { "False" })),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Other(value) => Some(Cow::Owned(value.to_string())),
        }
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for CellValue {
    /// Non-finite floats have no JSON form and become null.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Build a grid of cells from rows of anything convertible to [`CellValue`].
pub fn grid<R, C>(rows: R) -> Vec<Vec<CellValue>>
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = C>,
    C: Into<CellValue>,
{
    rows.into_iter()
        .map(|row| row.into_iter().map(Into::into).collect())
        .collect()
}
