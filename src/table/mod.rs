//! Common table record produced by every extraction method.
//!
//! A [`Table`] is an ordered grid of [`CellValue`]s plus where it came from
//! (page, index on the page) and whatever the method could say about it
//! (confidence, parser accuracy, model, token usage). Dimensions are always
//! derived from the grid.

mod cell;
mod output;

pub use cell::{grid, CellValue};
pub use output::ExtractionOutput;

use serde::{Deserialize, Serialize};

/// Page value written for tables whose page is unknown.
pub const UNKNOWN_PAGE: i64 = -1;

/// Token accounting for LLM-based methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens (text and image)
    pub input: u64,
    /// Completion tokens
    pub output: u64,
}

impl TokenUsage {
    /// Create usage from input and output counts.
    pub fn new(input: u64, output: u64) -> Self {
        Self { input, output }
    }

    /// Total tokens billed.
    pub fn total(&self) -> u64 {
        self.input + self.output
    }
}

/// Method-specific details attached to a table.
///
/// Every field is optional; extractors fill in what they know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Detection confidence (0.0 - 1.0) for model-based detectors.
    #[serde(default, alias = "detection_confidence", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Parsing accuracy reported by rule-based parsers (0 - 100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Whitespace ratio reported by rule-based parsers (0 - 100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whitespace: Option<f64>,
    /// Detection flavor, e.g. "lattice" or "stream".
    #[serde(default, alias = "method", skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    /// Model that produced the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Tokens spent producing the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenUsage>,
    /// Cost in USD attributed to the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Bounding box `[x0, y0, x1, y1]` in page coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[f64; 4]>,
}

/// A table extracted from (or annotated on) a document page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "TableRecord", from = "TableRecord")]
pub struct Table {
    page: Option<u32>,
    table_index: usize,
    data: Vec<Vec<CellValue>>,
    metadata: TableMetadata,
}

impl Table {
    /// Create a table from its grid.
    ///
    /// `page` is 1-indexed; `None` means the method could not tell.
    pub fn new(page: Option<u32>, table_index: usize, data: Vec<Vec<CellValue>>) -> Self {
        Self {
            page,
            table_index,
            data,
            metadata: TableMetadata::default(),
        }
    }

    /// Create a table with unknown page from a bare grid.
    pub fn from_grid(table_index: usize, data: Vec<Vec<CellValue>>) -> Self {
        Self::new(None, table_index, data)
    }

    /// Attach method metadata.
    pub fn with_metadata(mut self, metadata: TableMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Originating page (1-indexed), if known.
    pub fn page(&self) -> Option<u32> {
        self.page
    }

    /// Index of this table among the tables of its page.
    pub fn table_index(&self) -> usize {
        self.table_index
    }

    /// Cell grid.
    pub fn data(&self) -> &[Vec<CellValue>] {
        &self.data
    }

    /// Method metadata.
    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    /// Consume the table, keeping only its grid.
    pub fn into_data(self) -> Vec<Vec<CellValue>> {
        self.data
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.data.len()
    }

    /// Number of columns (length of the longest row).
    pub fn num_cols(&self) -> usize {
        self.data.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Whether the grid has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Dimensions formatted as `RxC`.
    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.num_rows(), self.num_cols())
    }
}

/// Persisted shape of a [`Table`].
///
/// `num_rows`/`num_cols` are written for readers of the JSON and ignored
/// when reading it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableRecord {
    #[serde(default = "unknown_page")]
    page: Option<i64>,
    #[serde(default)]
    table_index: usize,
    #[serde(default)]
    data: Vec<Vec<CellValue>>,
    #[serde(default, skip_deserializing)]
    num_rows: usize,
    #[serde(default, skip_deserializing)]
    num_cols: usize,
    #[serde(flatten)]
    metadata: TableMetadata,
}

fn unknown_page() -> Option<i64> {
    Some(UNKNOWN_PAGE)
}

impl From<Table> for TableRecord {
    fn from(table: Table) -> Self {
        let num_rows = table.num_rows();
        let num_cols = table.num_cols();
        Self {
            page: Some(table.page.map_or(UNKNOWN_PAGE, i64::from)),
            table_index: table.table_index,
            data: table.data,
            num_rows,
            num_cols,
            metadata: table.metadata,
        }
    }
}

impl From<TableRecord> for Table {
    fn from(record: TableRecord) -> Self {
        let page = record
            .page
            .filter(|&p| p >= 1)
            .and_then(|p| u32::try_from(p).ok());
        Self {
            page,
            table_index: record.table_index,
            data: record.data,
            metadata: record.metadata,
        }
    }
}
