//! Persisted output of one extractor run.

use super::{CellValue, Table};
use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Tables written by an extractor together with run totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Number of tables
    pub num_tables: usize,
    /// Wall-clock extraction time in seconds
    #[serde(deserialize_with = "null_as_zero")]
    pub extraction_time: f64,
    /// Method name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Model used by LLM-based methods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Total cost in USD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Extracted tables
    pub tables: Vec<Table>,
}

/// Every shape a saved extraction may take on disk.
#[derive(Deserialize)]
#[serde(untagged)]
enum SavedTables {
    Full(ExtractionOutput),
    Records(Vec<Table>),
    DataOnly { tables: Vec<Vec<Vec<CellValue>>> },
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Rewrite the bare `NaN`, `Infinity` and `-Infinity` tokens that Python's
/// `json.dumps` emits for non-finite floats (empty DataFrame cells) to `null`.
/// String contents are left alone.
fn null_non_finite(json: &str) -> Cow<'_, str> {
    if !json.contains("NaN") && !json.contains("Infinity") {
        return Cow::Borrowed(json);
    }

    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = json;
    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = ["-Infinity", "Infinity", "NaN"]
            .into_iter()
            .find(|token| rest.starts_with(*token))
        {
            out.push_str("null");
            rest = &rest[token.len()..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    Cow::Owned(out)
}

impl ExtractionOutput {
    /// Bundle tables from a run.
    pub fn new(tables: Vec<Table>, extraction_time: f64) -> Self {
        Self {
            num_tables: tables.len(),
            extraction_time,
            method: None,
            model: None,
            cost: None,
            tables,
        }
    }

    /// Set the method name.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the run cost; zero cost is omitted.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = (cost > 0.0).then_some(cost);
        self
    }

    /// Parse saved output.
    ///
    /// Accepts the full form, a bare array of table records, or the
    /// data-only form `{"tables": [grid, ...]}`. Grids without metadata get
    /// an unknown page and their position as `table_index`. Non-finite
    /// number tokens are read as null.
    pub fn from_json(json: &str) -> Result<Self> {
        let json = null_non_finite(json);
        let output = match serde_json::from_str::<SavedTables>(&json)? {
            SavedTables::Full(output) => output,
            SavedTables::Records(tables) => Self::new(tables, 0.0),
            SavedTables::DataOnly { tables } => Self::new(
                tables
                    .into_iter()
                    .enumerate()
                    .map(|(idx, data)| Table::from_grid(idx, data))
                    .collect(),
                0.0,
            ),
        };
        Ok(output)
    }

    /// Read saved output from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Grids only, in table order.
    pub fn grids(&self) -> Vec<Vec<Vec<CellValue>>> {
        self.tables.iter().map(|t| t.data().to_vec()).collect()
    }
}
