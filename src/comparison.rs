//! Side-by-side comparison of extraction methods on a single PDF.
//!
//! Every selected method is run on the same document. Methods that are not
//! available or that fail are recorded as failed runs; the comparison itself
//! never aborts.
//!
//! # Example
//!
//! ```no_run
//! use pdf_table_bench::comparison::{compare_methods, default_output_path};
//! use pdf_table_bench::config::VisionConfig;
//! use pdf_table_bench::extractors::{Capabilities, ExtractorRegistry};
//! use std::path::Path;
//!
//! let registry = ExtractorRegistry::new(Capabilities::detect(None), VisionConfig::default());
//! let pdf = Path::new("statement.pdf");
//! let report = compare_methods(&registry, pdf, &[]);
//! println!("{}", report.summary_table());
//! report.save(default_output_path(pdf))?;
//! # Ok::<(), pdf_table_bench::Error>(())
//! ```

use crate::error::Result;
use crate::extractors::{ExtractorRegistry, Method, TableExtractor};
use crate::table::Table;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of running one method on one PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRun {
    /// Whether extraction completed
    pub success: bool,
    /// Extracted tables
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Number of tables found
    #[serde(default)]
    pub count: usize,
    /// Extraction time in seconds
    #[serde(default)]
    pub time: f64,
    /// API cost in USD
    #[serde(default)]
    pub cost: f64,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MethodRun {
    /// Successful run.
    pub fn completed(tables: Vec<Table>, time: f64, cost: f64) -> Self {
        Self {
            success: true,
            count: tables.len(),
            tables,
            time,
            cost,
            error: None,
        }
    }

    /// Failed run.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            tables: Vec::new(),
            count: 0,
            time: 0.0,
            cost: 0.0,
            error: Some(error.into()),
        }
    }

    /// Whether the run cost nothing.
    pub fn is_free(&self) -> bool {
        self.cost <= 0.0
    }

    fn cost_per_table(&self) -> f64 {
        self.cost / self.count.max(1) as f64
    }
}

/// Run one extractor on a PDF, capturing failure as a failed run.
pub fn run_method(extractor: &mut dyn TableExtractor, pdf_path: &Path) -> MethodRun {
    match extractor.extract_tables(pdf_path) {
        Ok(tables) => MethodRun::completed(
            tables,
            extractor.extraction_time().as_secs_f64(),
            extractor.total_cost(),
        ),
        Err(e) => {
            log::warn!("{} failed on {}: {}", extractor.method(), pdf_path.display(), e);
            MethodRun::failed(e.to_string())
        },
    }
}

/// Results of all methods on one PDF, in run order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonReport {
    runs: IndexMap<String, MethodRun>,
}

/// Methods singled out by [`ComparisonReport::recommendations`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Recommendations<'a> {
    /// Fastest successful method with no API cost
    pub fastest_free: Option<(&'a str, &'a MethodRun)>,
    /// Successful method that found the most tables (ties: faster wins)
    pub most_tables: Option<(&'a str, &'a MethodRun)>,
    /// Paid method with the lowest cost per table
    pub best_value: Option<(&'a str, &'a MethodRun)>,
}

impl ComparisonReport {
    /// Empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a method's run, replacing an earlier one.
    pub fn insert(&mut self, method: impl Into<String>, run: MethodRun) {
        self.runs.insert(method.into(), run);
    }

    /// Run of a method.
    pub fn get(&self, method: &str) -> Option<&MethodRun> {
        self.runs.get(method)
    }

    /// Runs in order.
    pub fn runs(&self) -> impl Iterator<Item = (&str, &MethodRun)> {
        self.runs.iter().map(|(name, run)| (name.as_str(), run))
    }

    /// Number of methods recorded.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether no method was recorded.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Sum of API cost over successful runs.
    pub fn total_cost(&self) -> f64 {
        self.successful().map(|(_, run)| run.cost).sum()
    }

    fn successful(&self) -> impl Iterator<Item = (&str, &MethodRun)> {
        self.runs().filter(|(_, run)| run.success)
    }

    /// Pick the fastest free, most productive and best value methods.
    pub fn recommendations(&self) -> Recommendations<'_> {
        Recommendations {
            fastest_free: self
                .successful()
                .filter(|(_, run)| run.is_free())
                .min_by(|a, b| a.1.time.total_cmp(&b.1.time)),
            most_tables: self.successful().min_by(|a, b| {
                b.1.count
                    .cmp(&a.1.count)
                    .then_with(|| a.1.time.total_cmp(&b.1.time))
            }),
            best_value: self
                .successful()
                .filter(|(_, run)| !run.is_free())
                .min_by(|a, b| {
                    a.1.cost_per_table()
                        .partial_cmp(&b.1.cost_per_table())
                        .unwrap_or(Ordering::Equal)
                }),
        }
    }

    /// Fixed-width summary with one line per method.
    pub fn summary_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<20} {:<10} {:<12} {:<12} Status",
            "Method", "Tables", "Time (s)", "Cost ($)"
        );
        let _ = writeln!(out, "{}", "-".repeat(70));

        for (method, run) in self.runs() {
            if run.success {
                let cost = if run.is_free() {
                    "Free".to_string()
                } else {
                    format!("{:.4}", run.cost)
                };
                let _ = writeln!(
                    out,
                    "{:<20} {:<10} {:<12} {:<12} ✓ Success",
                    method,
                    run.count,
                    format!("{:.3}", run.time),
                    cost
                );
            } else {
                let reason: String = run
                    .error
                    .as_deref()
                    .unwrap_or("Failed")
                    .chars()
                    .take(20)
                    .collect();
                let _ = writeln!(out, "{:<20} {:<10} {:<12} {:<12} ✗ {}", method, "N/A", "N/A", "N/A", reason);
            }
        }
        out
    }

    /// Save the report as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Saved comparison of {} methods to {}", self.len(), path.display());
        Ok(())
    }

    /// Read a saved report.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

impl fmt::Display for Recommendations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.most_tables.is_none() {
            return writeln!(f, "⚠ No methods succeeded");
        }
        if let Some((method, run)) = self.fastest_free {
            writeln!(f, "Fastest free method: {}", method.to_uppercase())?;
            writeln!(f, "  Time: {:.3}s", run.time)?;
            writeln!(f, "  Tables: {}", run.count)?;
        }
        if let Some((method, run)) = self.most_tables {
            writeln!(f, "Most tables detected: {}", method.to_uppercase())?;
            writeln!(f, "  Tables: {}", run.count)?;
            writeln!(f, "  Time: {:.3}s", run.time)?;
        }
        if let Some((method, run)) = self.best_value {
            writeln!(f, "Best value (paid): {}", method.to_uppercase())?;
            writeln!(f, "  Cost: ${:.4}", run.cost)?;
            writeln!(f, "  Tables: {}", run.count)?;
            writeln!(f, "  Cost/table: ${:.4}", run.cost_per_table())?;
        }
        Ok(())
    }
}

/// Compare methods on a PDF.
///
/// `methods` selects which to run; empty means every known method. Runs
/// follow [`Method::ALL`] order.
pub fn compare_methods(
    registry: &ExtractorRegistry,
    pdf_path: &Path,
    methods: &[Method],
) -> ComparisonReport {
    let mut report = ComparisonReport::new();

    for method in Method::ALL
        .into_iter()
        .filter(|m| methods.is_empty() || methods.contains(m))
    {
        log::info!("Method: {}", method);
        let run = match registry.create(method) {
            Ok(mut extractor) => run_method(extractor.as_mut(), pdf_path),
            Err(e) => {
                log::warn!("Skipped {}: {}", method, e);
                MethodRun::failed(e.to_string())
            },
        };
        report.insert(method.name(), run);
    }

    report
}

/// `<pdf stem>_all_methods_comparison.json` in the working directory.
pub fn default_output_path(pdf_path: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    PathBuf::from(format!("{}_all_methods_comparison.json", stem))
}
