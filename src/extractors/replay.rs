//! Replays saved extraction output.
//!
//! Methods implemented outside Rust are run separately and write their
//! tables to `<replay_dir>/<pdf_stem>_<method>.json`. This extractor loads
//! those files so the methods can be compared and evaluated like live ones.

use super::{Method, TableExtractor};
use crate::error::{Error, Result};
use crate::table::{ExtractionOutput, Table};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Extractor backed by saved output files.
#[derive(Debug, Clone)]
pub struct ReplayExtractor {
    method: Method,
    replay_dir: PathBuf,
    extraction_time: Duration,
    total_cost: f64,
    model: Option<String>,
}

impl ReplayExtractor {
    /// Create a replay extractor for a method.
    pub fn new(method: Method, replay_dir: impl Into<PathBuf>) -> Self {
        Self {
            method,
            replay_dir: replay_dir.into(),
            extraction_time: Duration::ZERO,
            total_cost: 0.0,
            model: None,
        }
    }

    /// Where the saved output for a PDF is expected.
    pub fn output_path(&self, pdf_path: &Path) -> PathBuf {
        let stem = pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.replay_dir
            .join(format!("{}_{}.json", stem, self.method.name()))
    }
}

impl TableExtractor for ReplayExtractor {
    fn method(&self) -> Method {
        self.method
    }

    fn extract_tables(&mut self, pdf_path: &Path) -> Result<Vec<Table>> {
        let start = Instant::now();
        let path = self.output_path(pdf_path);
        if !path.is_file() {
            return Err(Error::MissingOutput(path));
        }

        let output = ExtractionOutput::load(&path)?;
        // Prefer the time the method itself reported, when it is representable.
        self.extraction_time = Duration::try_from_secs_f64(output.extraction_time)
            .ok()
            .filter(|time| !time.is_zero())
            .unwrap_or_else(|| start.elapsed());
        self.total_cost += output.cost.unwrap_or(0.0);
        if output.model.is_some() {
            self.model = output.model.clone();
        }

        log::info!(
            "Replayed {} tables for {} from {}",
            output.tables.len(),
            self.method,
            path.display()
        );
        for table in &output.tables {
            log::debug!(
                "  Page {}, Table {}: {}",
                table.page().map_or_else(|| "?".to_string(), |p| p.to_string()),
                table.table_index(),
                table.dimensions()
            );
        }
        Ok(output.tables)
    }

    fn extraction_time(&self) -> Duration {
        self.extraction_time
    }

    fn total_cost(&self) -> f64 {
        self.total_cost
    }

    fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}
