//! Printing and persisting evaluation results.

use super::evaluator::EvaluationResult;
use crate::error::Result;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const BANNER_WIDTH: usize = 60;

/// Render a result as the human-readable summary block.
pub fn format_results(results: &EvaluationResult) -> String {
    let banner = "=".repeat(BANNER_WIDTH);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", banner);
    let _ = writeln!(out, "Evaluation Results: {}", results.method);
    let _ = writeln!(out, "{}", banner);
    let _ = writeln!(
        out,
        "Tables Detected: {} / {}",
        results.num_predicted_tables, results.num_ground_truth_tables
    );
    let _ = writeln!(out, "Detection Recall: {:.2}%", results.table_detection_recall);
    let _ = writeln!(out, "Avg Cell Accuracy: {:.2}%", results.avg_cell_accuracy);
    let _ = writeln!(out, "Structure Match Rate: {:.2}%", results.structure_match_rate);
    let _ = writeln!(out, "Evaluation Time: {:.3}s", results.evaluation_time);
    let _ = writeln!(out, "{}", banner);
    out
}

/// Print the summary block to stdout.
pub fn print_results(results: &EvaluationResult) {
    println!("{}", format_results(results));
}

/// Save a result as pretty JSON, creating parent directories.
pub fn save_results(results: &EvaluationResult, output_path: impl AsRef<Path>) -> Result<()> {
    let path = output_path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(results)?)?;
    log::info!("Saved {} results to {}", results.method, path.display());
    Ok(())
}

/// Read a saved result.
pub fn load_results(path: impl AsRef<Path>) -> Result<EvaluationResult> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::evaluate_extraction;
    use crate::table::grid;

    #[test]
    fn test_format_contains_metrics() {
        let table = grid([vec!["a", "b"]]);
        let result = evaluate_extraction(&[table.clone()], &[table.clone(), table], "pdfplumber");
        let text = format_results(&result);
        assert!(text.contains("Evaluation Results: pdfplumber"));
        assert!(text.contains("Tables Detected: 1 / 2"));
        assert!(text.contains("Detection Recall: 50.00%"));
        assert!(text.contains("Avg Cell Accuracy: 100.00%"));
        assert!(text.contains(&"=".repeat(60)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pdfplumber_results.json");
        let table = grid([vec!["x"]]);
        let result = evaluate_extraction(&[table.clone()], &[table], "pdfplumber");

        save_results(&result, &path).unwrap();
        let loaded = load_results(&path).unwrap();
        assert_eq!(loaded, result);
    }
}
