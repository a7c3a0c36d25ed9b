//! Dataset benchmark: run methods over annotated samples and score them.
//!
//! Samples come from a manifest file, either a JSON array or JSON lines:
//!
//! ```json
//! [
//!   {"pdf_path": "pdfs/10-K_2019_p45.pdf", "ground_truth": [[["Year", "Revenue"], ["2019", "1,204"]]]},
//!   {"pdf": "pdfs/annual_p3.pdf", "tables": [[["a", "b"]]]}
//! ]
//! ```
//!
//! Predicted and ground-truth tables are concatenated across all samples
//! before evaluation, so a method is scored over the whole dataset.

use crate::config::BenchmarkConfig;
use crate::error::{Error, Result};
use crate::evaluation::{print_results, save_results, EvaluationResult, Evaluator};
use crate::extractors::{ExtractorRegistry, Method, TableExtractor};
use crate::table::{CellValue, Table};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the combined results in the output directory.
pub const COMBINED_RESULTS_FILE: &str = "benchmark_results.json";

/// One annotated document.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSample {
    /// PDF to extract from; samples without one only contribute ground truth
    pub pdf_path: Option<PathBuf>,
    /// Annotated tables
    pub ground_truth: Vec<Vec<Vec<CellValue>>>,
}

#[derive(Debug, Deserialize)]
struct RawSample {
    #[serde(default, alias = "pdf")]
    pdf_path: Option<PathBuf>,
    #[serde(default, alias = "tables")]
    ground_truth: Vec<TruthTable>,
}

/// Ground truth given as a bare grid or as a table record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TruthTable {
    Grid(Vec<Vec<CellValue>>),
    Record(Table),
}

impl RawSample {
    fn resolve(self, base_dir: &Path) -> BenchmarkSample {
        BenchmarkSample {
            pdf_path: self.pdf_path.map(|p| {
                if p.is_relative() {
                    base_dir.join(p)
                } else {
                    p
                }
            }),
            ground_truth: self
                .ground_truth
                .into_iter()
                .map(|t| match t {
                    TruthTable::Grid(grid) => grid,
                    TruthTable::Record(table) => table.into_data(),
                })
                .collect(),
        }
    }
}

/// Parse manifest text. Relative PDF paths are joined onto `base_dir`.
pub fn parse_manifest(text: &str, base_dir: &Path) -> Result<Vec<BenchmarkSample>> {
    let raw: Vec<RawSample> = if text.trim_start().starts_with('[') {
        serde_json::from_str(text).map_err(|e| Error::InvalidManifest(e.to_string()))?
    } else {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line)
                    .map_err(|e| Error::InvalidManifest(format!("line {}: {}", idx + 1, e)))
            })
            .collect::<Result<_>>()?
    };
    Ok(raw.into_iter().map(|s| s.resolve(base_dir)).collect())
}

/// Load samples from a manifest, keeping at most `limit` (`None` = all).
pub fn load_samples(path: impl AsRef<Path>, limit: Option<usize>) -> Result<Vec<BenchmarkSample>> {
    let path = path.as_ref();
    log::info!("Loading dataset from {}...", path.display());
    let text = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut samples = parse_manifest(&text, base_dir)?;
    log::info!("Loaded {} samples", samples.len());

    if let Some(limit) = limit {
        if limit < samples.len() {
            samples.truncate(limit);
            log::info!("Limited to {} samples", samples.len());
        }
    }
    Ok(samples)
}

/// Run one extractor over every sample and evaluate the pooled tables.
///
/// A sample whose extraction fails contributes no predicted tables.
pub fn run_method(
    extractor: &mut dyn TableExtractor,
    samples: &[BenchmarkSample],
    config: &BenchmarkConfig,
) -> EvaluationResult {
    let method = extractor.method();
    log::info!("Running {} benchmark on {} samples", method, samples.len());

    let mut predicted: Vec<Table> = Vec::new();
    let mut ground_truth: Vec<Vec<Vec<CellValue>>> = Vec::new();

    for (i, sample) in samples.iter().enumerate() {
        log::debug!("Processing sample {}/{}", i + 1, samples.len());
        if let Some(pdf_path) = &sample.pdf_path {
            match extractor.extract_tables(pdf_path) {
                Ok(tables) => predicted.extend(tables),
                Err(e) => log::warn!("{} failed on {}: {}", method, pdf_path.display(), e),
            }
        }
        ground_truth.extend(sample.ground_truth.iter().cloned());
    }

    Evaluator::new(config.evaluation.clone()).evaluate(&predicted, &ground_truth, method.name())
}

/// Benchmark several methods and write their results.
///
/// Writes `<output>/<method>_results.json` per method and all results to
/// `<output>/benchmark_results.json`. Methods the registry cannot create are
/// skipped with a warning.
pub fn run_benchmark(
    registry: &ExtractorRegistry,
    samples: &[BenchmarkSample],
    methods: &[Method],
    config: &BenchmarkConfig,
) -> Result<IndexMap<String, EvaluationResult>> {
    fs::create_dir_all(&config.output_dir)?;
    let mut all_results = IndexMap::new();

    for &method in methods {
        let mut extractor = match registry.create(method) {
            Ok(extractor) => extractor,
            Err(e) => {
                log::warn!("Skipping {}: {}", method, e);
                continue;
            },
        };

        let results = run_method(extractor.as_mut(), samples, config);
        save_results(&results, config.output_dir.join(format!("{}_results.json", method)))?;
        if config.print_reports {
            print_results(&results);
        }
        all_results.insert(method.name().to_string(), results);
    }

    let combined = config.output_dir.join(COMBINED_RESULTS_FILE);
    fs::write(&combined, serde_json::to_string_pretty(&all_results)?)?;
    log::info!("All results saved to {}", config.output_dir.display());
    Ok(all_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::grid;

    #[test]
    fn test_array_manifest_with_aliases() {
        let text = r#"[
            {"pdf_path": "a.pdf", "ground_truth": [[["x", "y"]]]},
            {"pdf": "/abs/b.pdf", "tables": [{"page": 2, "table_index": 0, "data": [["z"]]}]},
            {"ground_truth": []}
        ]"#;
        let samples = parse_manifest(text, Path::new("data")).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].pdf_path, Some(PathBuf::from("data/a.pdf")));
        assert_eq!(samples[0].ground_truth, vec![grid([vec!["x", "y"]])]);
        assert_eq!(samples[1].pdf_path, Some(PathBuf::from("/abs/b.pdf")));
        assert_eq!(samples[1].ground_truth, vec![grid([vec!["z"]])]);
        assert_eq!(samples[2].pdf_path, None);
    }

    #[test]
    fn test_jsonl_manifest() {
        let text = "{\"pdf\": \"a.pdf\"}\n\n{\"pdf\": \"b.pdf\", \"tables\": [[[\"1\"]]]}\n";
        let samples = parse_manifest(text, Path::new("")).unwrap();
        assert_eq!(samples.len(), 2);
        assert!(samples[0].ground_truth.is_empty());
        assert_eq!(samples[1].pdf_path, Some(PathBuf::from("b.pdf")));
    }

    #[test]
    fn test_jsonl_error_names_line() {
        let text = "{\"pdf\": \"a.pdf\"}\nnot json\n";
        match parse_manifest(text, Path::new("")) {
            Err(Error::InvalidManifest(msg)) => assert!(msg.starts_with("line 2")),
            other => panic!("expected invalid manifest, got {:?}", other),
        }
    }

    #[test]
    fn test_load_with_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.jsonl");
        let lines: Vec<String> = (0..5).map(|i| format!("{{\"pdf\": \"{}.pdf\"}}", i)).collect();
        fs::write(&path, lines.join("\n")).unwrap();

        assert_eq!(load_samples(&path, Some(2)).unwrap().len(), 2);
        assert_eq!(load_samples(&path, Some(50)).unwrap().len(), 5);
        let all = load_samples(&path, None).unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[4].pdf_path, Some(dir.path().join("4.pdf")));
    }
}
